// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only snapshot of a list's internal counters.

use kurbo::Vec2;

/// Counters and state of a [`RecyclerList`](crate::RecyclerList) at one
/// point in time, see [`RecyclerList::diagnostics`](crate::RecyclerList::diagnostics).
///
/// Every view the list ever created is accounted for:
/// `created == active + pooled + buffered + destroyed`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Diagnostics {
    /// Number of items.
    pub item_count: usize,
    /// Views currently bound to visible items.
    pub active: usize,
    /// Views in the primary pool.
    pub pooled: usize,
    /// Views in the buffered (pre-warmed) tier.
    pub buffered: usize,
    /// Views created since the list was built.
    pub created: usize,
    /// Views destroyed since the list was built, including failed teardowns.
    pub destroyed: usize,
    /// Teardowns the host reported as failed.
    pub destroy_failures: usize,
    /// Largest number of visible items since the last viewport resize.
    pub max_visible_since_resize: usize,
    /// Views evicted from the pool since the last viewport resize.
    pub destroyed_since_resize: usize,
    /// Spares the primary pool may currently hold.
    pub pool_capacity: usize,
    /// Virtual inset from the viewport start.
    pub inset: f64,
    /// Scroll velocity.
    pub velocity: Vec2,
    /// Content size, paddings included.
    pub content_size: f64,
    /// Viewport size.
    pub viewport_size: f64,
    /// Item laid out at view index 0.
    pub real_index_of_first_item_in_view: usize,
    /// Loop rotations performed.
    pub rotations: usize,
    /// Twin passes run.
    pub twin_passes: usize,
    /// Visibility passes run.
    pub passes: usize,
}

impl Diagnostics {
    /// Whether every created view is accounted for.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.created == self.active + self.pooled + self.buffered + self.destroyed
    }
}
