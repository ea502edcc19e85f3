// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-tier store of views waiting to be reused.
//!
//! The primary pool receives every view that scrolls out of the viewport and
//! is trimmed by [`ViewPool::take_excess`]. The buffered tier holds views the
//! caller created ahead of time; those are handed out like pooled views but
//! never evicted.

use alloc::vec::Vec;

/// Recycle store with an eviction rule.
///
/// Without an explicit capacity, the pool keeps as many spares as the largest
/// number of simultaneously visible items seen since the last viewport
/// resize, plus one for every view it had to destroy in that time. Scrolling
/// back and forth therefore stops destroying and recreating views after the
/// first reversal.
#[derive(Clone, Debug)]
pub struct ViewPool<V> {
    primary: Vec<V>,
    buffered: Vec<V>,
    capacity: Option<usize>,
    max_visible_since_resize: usize,
    destroyed_since_resize: usize,
}

impl<V> Default for ViewPool<V> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<V> ViewPool<V> {
    /// Creates an empty pool. `capacity` overrides the heuristic.
    #[must_use]
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            primary: Vec::new(),
            buffered: Vec::new(),
            capacity,
            max_visible_since_resize: 0,
            destroyed_since_resize: 0,
        }
    }

    /// Removes and returns the first view accepted by `reusable`, looking at
    /// the primary pool before the buffered tier.
    pub fn extract(&mut self, mut reusable: impl FnMut(&V) -> bool) -> Option<V> {
        if let Some(pos) = self.primary.iter().position(&mut reusable) {
            return Some(self.primary.remove(pos));
        }
        let pos = self.buffered.iter().position(reusable)?;
        Some(self.buffered.remove(pos))
    }

    /// Adds a view to the primary pool.
    pub fn release(&mut self, view: V) {
        self.primary.push(view);
    }

    /// Adds a pre-warmed view to the buffered tier.
    pub fn buffer(&mut self, view: V) {
        self.buffered.push(view);
    }

    /// Number of views in the primary pool.
    #[must_use]
    pub fn pooled_len(&self) -> usize {
        self.primary.len()
    }

    /// Number of views in the buffered tier.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffered.len()
    }

    /// Number of spares the primary pool may hold.
    #[must_use]
    pub fn effective_capacity(&self) -> usize {
        self.capacity
            .unwrap_or(self.max_visible_since_resize + self.destroyed_since_resize + 1)
    }

    /// How many primary views are over capacity.
    #[must_use]
    pub fn excess_count(&self) -> usize {
        self.primary
            .len()
            .saturating_sub(self.effective_capacity())
    }

    /// Removes the views over capacity, oldest first, and counts them as
    /// destroyed. The caller tears them down.
    pub fn take_excess(&mut self) -> Vec<V> {
        let excess = self.excess_count();
        if excess == 0 {
            return Vec::new();
        }
        self.destroyed_since_resize += excess;
        self.primary.drain(..excess).collect()
    }

    /// Empties the primary pool, and the buffered tier too when
    /// `include_buffered` is set.
    pub fn drain(&mut self, include_buffered: bool) -> Vec<V> {
        let mut out: Vec<V> = self.primary.drain(..).collect();
        if include_buffered {
            out.append(&mut self.buffered);
        }
        out
    }

    /// Records how many items are visible after a pass.
    pub fn note_visible(&mut self, visible: usize) {
        self.max_visible_since_resize = self.max_visible_since_resize.max(visible);
    }

    /// Largest visible count recorded since the last resize.
    #[must_use]
    pub fn max_visible_since_resize(&self) -> usize {
        self.max_visible_since_resize
    }

    /// Views evicted since the last resize.
    #[must_use]
    pub fn destroyed_since_resize(&self) -> usize {
        self.destroyed_since_resize
    }

    /// Forgets the heuristic counters after the viewport changed size.
    pub fn reset_heuristics(&mut self) {
        self.max_visible_since_resize = 0;
        self.destroyed_since_resize = 0;
    }

    /// Replaces the explicit capacity.
    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
    }
}
