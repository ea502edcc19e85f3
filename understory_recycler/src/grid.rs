// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grouping of a flat sequence of cells into tracks.
//!
//! A grid scrolls along one axis over *tracks* (rows of a vertical grid,
//! columns of a horizontal one) while its data is a flat sequence of
//! *cells*. The list engine only sees tracks: each track is one item of a
//! [`RecyclerList`](crate::RecyclerList) and its view lays out the cells
//! [`GridTracks::cells_in_track`] reports.
//!
//! ```rust
//! use core::num::NonZeroUsize;
//! use understory_recycler::GridTracks;
//!
//! let grid = GridTracks::new(NonZeroUsize::new(4).unwrap(), 10);
//! assert_eq!(grid.track_count(), 3);
//! assert_eq!(grid.track_of(9), Some(2));
//! assert_eq!(grid.cells_in_track(2), 8..10);
//! ```

use core::num::NonZeroUsize;
use core::ops::Range;

/// Maps cell indices onto track indices for a fixed number of cells per track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridTracks {
    cells_per_track: NonZeroUsize,
    cell_count: usize,
}

impl GridTracks {
    /// Creates a grouping of `cell_count` cells.
    #[must_use]
    pub const fn new(cells_per_track: NonZeroUsize, cell_count: usize) -> Self {
        Self {
            cells_per_track,
            cell_count,
        }
    }

    /// Number of cells in each full track.
    #[must_use]
    pub const fn cells_per_track(&self) -> usize {
        self.cells_per_track.get()
    }

    /// Total number of cells.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Changes the number of cells per track.
    pub fn set_cells_per_track(&mut self, cells_per_track: NonZeroUsize) {
        self.cells_per_track = cells_per_track;
    }

    /// Changes the number of cells.
    pub fn set_cell_count(&mut self, cell_count: usize) {
        self.cell_count = cell_count;
    }

    /// Number of tracks, counting a trailing partial track. This is the item
    /// count to hand to the list.
    #[must_use]
    pub fn track_count(&self) -> usize {
        self.cell_count.div_ceil(self.cells_per_track.get())
    }

    /// Track containing `cell`, or `None` past the last cell.
    #[must_use]
    pub fn track_of(&self, cell: usize) -> Option<usize> {
        (cell < self.cell_count).then_some(cell / self.cells_per_track.get())
    }

    /// Cells shown by `track`. Empty past the last track.
    #[must_use]
    pub fn cells_in_track(&self, track: usize) -> Range<usize> {
        let per = self.cells_per_track.get();
        let start = track.saturating_mul(per).min(self.cell_count);
        let end = start.saturating_add(per).min(self.cell_count);
        start..end
    }
}
