// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The recycling list controller.
//!
//! [`RecyclerList`] ties together a [`SizeIndex`], a [`ViewPool`], and a
//! [`ScrollModel`], and drives an [`ItemHost`] through them. Every entry
//! point that moves content ends with a *visibility pass*:
//!
//! 1. With looping content, rotate the size index while the head (or tail)
//!    has fully left the viewport and a gap would open at the other end.
//! 2. Recycle active views whose item no longer overlaps the viewport.
//! 3. Extend the active window forward and backward with reused or newly
//!    created views until the viewport is covered.
//! 4. Position every active view.
//!
//! Views bound with [`ItemSizing::AfterRender`] trigger a *twin pass*: the
//! active views are measured, the measurements are written back in one
//! batch, and the pass runs again with one edge of the active window held in
//! place.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Vec2};
use smallvec::SmallVec;
use tracing::{debug, error, trace, warn};

use crate::animation::{AnimationStatus, SmoothScroll};
use crate::error::{fraction, non_negative};
use crate::scroll::{BoundaryPolicy, ScrollBounds, ScrollModel};
use crate::{
    Diagnostics, Edge, ItemHost, ItemSizing, ItemView, RecyclerError, RecyclerParams, ReinitMode,
    SizeIndex, ViewHandle, ViewParent, ViewPool,
};

/// Sizes closer than this are treated as equal when checking whether a twin
/// pass has settled.
const SIZE_EPSILON: f64 = 1e-6;

/// Options of [`RecyclerList::reset`], [`RecyclerList::insert`], and
/// [`RecyclerList::remove`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountChange {
    /// Keep coasting instead of stopping.
    pub keep_velocity: bool,
    /// Keep the content's trailing edge where it is instead of its leading
    /// edge.
    pub anchor_trailing: bool,
}

impl CountChange {
    /// Sets [`CountChange::keep_velocity`].
    #[must_use]
    pub const fn with_keep_velocity(mut self, keep: bool) -> Self {
        self.keep_velocity = keep;
        self
    }

    /// Sets [`CountChange::anchor_trailing`].
    #[must_use]
    pub const fn with_anchor_trailing(mut self, anchor: bool) -> Self {
        self.anchor_trailing = anchor;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Counters {
    created: usize,
    destroyed: usize,
    destroy_failures: usize,
    rotations: usize,
    twin_passes: usize,
    passes: usize,
}

/// A virtualized list that realizes views only for visible items and
/// recycles them as content scrolls.
///
/// The list owns its host. Hosts that need to reach their own state between
/// calls use [`RecyclerList::host`] and [`RecyclerList::host_mut`].
pub struct RecyclerList<H: ItemHost> {
    host: H,
    params: RecyclerParams,
    sizes: SizeIndex,
    pool: ViewPool<ItemView<H::View>>,
    scroll: ScrollModel,
    /// Contiguous and ascending by `index_in_view`.
    active: VecDeque<ItemView<H::View>>,
    viewport_size: f64,
    content_size: f64,
    smooth: Option<SmoothScroll>,
    twin_pass_pending: bool,
    busy: bool,
    counters: Counters,
}

impl<H: ItemHost> fmt::Debug for RecyclerList<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecyclerList")
            .field("params", &self.params)
            .field("sizes", &self.sizes)
            .field("scroll", &self.scroll)
            .field("viewport_size", &self.viewport_size)
            .field("content_size", &self.content_size)
            .field("active", &self.active.len())
            .field("pooled", &self.pool.pooled_len())
            .field("smooth", &self.smooth)
            .finish_non_exhaustive()
    }
}

impl<H: ItemHost> RecyclerList<H> {
    /// Creates an empty list with a zero-sized viewport.
    ///
    /// Fails with a configuration error if `params` does not validate.
    pub fn new(host: H, params: RecyclerParams) -> Result<Self, RecyclerError> {
        params.validate()?;
        let sizes = SizeIndex::new(params.default_item_size, params.spacing)?;
        Ok(Self {
            host,
            sizes,
            pool: ViewPool::new(params.recycle_bin_capacity),
            scroll: ScrollModel::new(params.scroll, params.orientation),
            active: VecDeque::new(),
            viewport_size: 0.0,
            content_size: params.padding_start + params.padding_end,
            smooth: None,
            twin_pass_pending: false,
            busy: false,
            counters: Counters::default(),
            params,
        })
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The configuration the list was built with.
    #[must_use]
    pub fn params(&self) -> &RecyclerParams {
        &self.params
    }

    /// The size index.
    #[must_use]
    pub fn size_index(&self) -> &SizeIndex {
        &self.sizes
    }

    /// The scroll model.
    #[must_use]
    pub fn scroll_model(&self) -> &ScrollModel {
        &self.scroll
    }

    /// Number of items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.sizes.len()
    }

    /// Size of the viewport.
    #[must_use]
    pub fn viewport_size(&self) -> f64 {
        self.viewport_size
    }

    /// Size of all items, spacings, and paddings.
    #[must_use]
    pub fn content_size(&self) -> f64 {
        self.content_size
    }

    /// Distance of the content's leading edge from the viewport's leading edge.
    #[must_use]
    pub fn inset(&self) -> f64 {
        self.scroll.inset()
    }

    /// Distance of the viewport's trailing edge from the content's trailing edge.
    #[must_use]
    pub fn inset_from_viewport_end(&self) -> f64 {
        self.scroll.inset_from_viewport_end(&self.bounds())
    }

    /// Current scroll velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.scroll.velocity()
    }

    /// Returns `true` while a drag gesture is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.scroll.is_dragging()
    }

    /// Returns `true` while a smooth scroll is running.
    #[must_use]
    pub fn is_smooth_scrolling(&self) -> bool {
        self.smooth.is_some()
    }

    /// Returns `true` if looping is enabled and the content is larger than
    /// the viewport, so that the list currently wraps around.
    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.bounds().unbounded
    }

    /// Position as a fraction of the scrollable range. Content that fits the
    /// viewport reports `0.5`.
    #[must_use]
    pub fn normalized_position(&self) -> f64 {
        self.scroll.normalized_position(&self.bounds())
    }

    /// Returns `true` if a view is bound to `item_index`.
    #[must_use]
    pub fn is_item_visible(&self, item_index: usize) -> bool {
        self.active.iter().any(|v| v.item_index == item_index)
    }

    /// The item of the leading active view.
    #[must_use]
    pub fn first_visible_item(&self) -> Option<usize> {
        self.active.front().map(ItemView::item_index)
    }

    /// Active views in layout order.
    pub fn visible_items(&self) -> impl Iterator<Item = &ItemView<H::View>> + '_ {
        self.active.iter()
    }

    /// Offset of the start of `item_index` from the viewport's leading edge.
    pub fn item_offset(&self, item_index: usize) -> Result<f64, RecyclerError> {
        let view_index = self.sizes.view_index_of_real(item_index)?;
        self.item_start(view_index)
    }

    /// Snapshot of the internal counters.
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            item_count: self.sizes.len(),
            active: self.active.len(),
            pooled: self.pool.pooled_len(),
            buffered: self.pool.buffered_len(),
            created: self.counters.created,
            destroyed: self.counters.destroyed,
            destroy_failures: self.counters.destroy_failures,
            max_visible_since_resize: self.pool.max_visible_since_resize(),
            destroyed_since_resize: self.pool.destroyed_since_resize(),
            pool_capacity: self.pool.effective_capacity(),
            inset: self.scroll.inset(),
            velocity: self.scroll.velocity(),
            content_size: self.content_size,
            viewport_size: self.viewport_size,
            real_index_of_first_item_in_view: self.sizes.real_index_of_first_item_in_view(),
            rotations: self.counters.rotations,
            twin_passes: self.counters.twin_passes,
            passes: self.counters.passes,
        }
    }

    // --- Entry points -----------------------------------------------------

    /// Changes the viewport size and recomputes visibility.
    ///
    /// Also restarts the pool's capacity heuristic.
    pub fn set_viewport_size(&mut self, size: f64) -> Result<(), RecyclerError> {
        self.guarded("set_viewport_size", |this| {
            this.viewport_size = non_negative("viewport size", size)?;
            this.pool.reset_heuristics();
            debug!(size, "viewport resized");
            this.refresh(0.0)
        })
    }

    /// Replaces every item with `count` default-sized items.
    pub fn reset(&mut self, count: usize, change: CountChange) -> Result<(), RecyclerError> {
        self.guarded("reset", |this| {
            this.begin_count_change(change);
            let inset_from_end = this.inset_from_viewport_end();
            this.recycle_all();
            this.sizes.reset(count)?;
            debug!(count, "items reset");
            this.finish_count_change(change, inset_from_end)
        })
    }

    /// Inserts `count` default-sized items before `at`.
    ///
    /// Active views after the insertion point are relabelled in place or,
    /// when the insertion point falls inside the visible window, recycled.
    pub fn insert(&mut self, at: usize, count: usize, change: CountChange) -> Result<(), RecyclerError> {
        self.guarded("insert", |this| {
            let len = this.sizes.len();
            if at > len {
                return Err(RecyclerError::RangeOutOfBounds {
                    start: at,
                    end: at,
                    count: len,
                });
            }
            this.begin_count_change(change);
            let inset_from_end = this.inset_from_viewport_end();
            this.undo_rotation()?;
            match this.active.front().map(|v| v.index_in_view) {
                Some(first) if first >= at => {
                    for view in &mut this.active {
                        view.index_in_view += count;
                        view.item_index += count;
                    }
                }
                Some(_) => {
                    while this.active.back().is_some_and(|v| v.index_in_view >= at) {
                        if let Some(view) = this.active.pop_back() {
                            this.recycle(view);
                        }
                    }
                }
                None => {}
            }
            this.sizes.reinitialize(ReinitMode::Insert, count, at, None)?;
            debug!(at, count, "items inserted");
            this.finish_count_change(change, inset_from_end)
        })
    }

    /// Removes items `at..at + count`.
    pub fn remove(&mut self, at: usize, count: usize, change: CountChange) -> Result<(), RecyclerError> {
        self.guarded("remove", |this| {
            let len = this.sizes.len();
            let Some(end) = at.checked_add(count).filter(|&end| end <= len) else {
                return Err(RecyclerError::RangeOutOfBounds {
                    start: at,
                    end: at.saturating_add(count),
                    count: len,
                });
            };
            this.begin_count_change(change);
            let inset_from_end = this.inset_from_viewport_end();
            this.undo_rotation()?;
            let views: Vec<_> = this.active.drain(..).collect();
            for mut view in views {
                if view.index_in_view >= end {
                    view.index_in_view -= count;
                    view.item_index -= count;
                    this.active.push_back(view);
                } else if view.index_in_view >= at {
                    this.recycle(view);
                } else {
                    this.active.push_back(view);
                }
            }
            this.sizes.reinitialize(ReinitMode::Remove, count, at, None)?;
            debug!(at, count, "items removed");
            this.finish_count_change(change, inset_from_end)
        })
    }

    /// Changes the size of one item and returns the size that was recorded.
    ///
    /// Items entirely before the viewport grow backwards, so nothing visible
    /// moves. Visible items grow toward the end, or toward the start when
    /// `anchor_trailing` is set. Items after the viewport never move visible
    /// content.
    pub fn request_resize(
        &mut self,
        item_index: usize,
        size: f64,
        anchor_trailing: bool,
    ) -> Result<f64, RecyclerError> {
        self.guarded("request_resize", |this| {
            let size = non_negative("size", size)?;
            let view_index = this.sizes.view_index_of_real(item_index)?;
            let old = this.sizes.item_at(view_index)?;
            let start = this.item_start(view_index)?;
            let end = start + old;

            this.sizes.set_item_size(view_index, size)?;
            this.sync_content_size()?;
            let resolved = this.sizes.item_at(view_index)?;
            let grown = resolved - old;

            let before_viewport = end <= 0.0;
            let in_viewport = !before_viewport && start < this.viewport_size;
            if before_viewport || (in_viewport && anchor_trailing) {
                this.shift_inset(-grown);
            }
            debug!(item_index, size = resolved, grown, "item resized");
            this.refresh(0.0)?;
            Ok(resolved)
        })
    }

    /// Jumps so that the point `item_pivot_frac` of the item's size lands at
    /// `viewport_offset_frac` of the viewport.
    ///
    /// Without looping the resulting position is clamped to the content.
    pub fn scroll_to_item(
        &mut self,
        item_index: usize,
        viewport_offset_frac: f64,
        item_pivot_frac: f64,
    ) -> Result<(), RecyclerError> {
        self.guarded("scroll_to_item", |this| {
            let target = this.target_inset(item_index, viewport_offset_frac, item_pivot_frac)?;
            this.cancel_smooth_scroll();
            this.scroll.stop();
            this.jump_to(target)
        })
    }

    /// Starts animating toward an item. Any running smooth scroll is
    /// cancelled first.
    ///
    /// The animation advances in [`RecyclerList::tick`].
    pub fn smooth_scroll_to_item(&mut self, mut animation: SmoothScroll) -> Result<(), RecyclerError> {
        self.guarded("smooth_scroll_to_item", |this| {
            let request = *animation.request();
            non_negative("duration", request.duration)?;
            this.target_inset(
                request.item_index,
                request.viewport_offset_frac,
                request.item_pivot_frac,
            )?;
            this.cancel_smooth_scroll();
            this.scroll.stop();
            animation.start(this.scroll.inset());
            this.smooth = Some(animation);
            Ok(())
        })
    }

    /// Cancels the running smooth scroll, if any.
    pub fn cancel_smooth_scroll(&mut self) {
        if let Some(animation) = self.smooth.take() {
            animation.cancel();
        }
    }

    /// Moves content by `delta` under `policy` and returns the delta that
    /// was applied.
    pub fn drag_by(&mut self, delta: f64, policy: BoundaryPolicy) -> Result<f64, RecyclerError> {
        self.guarded("drag_by", |this| {
            if !delta.is_finite() {
                return Err(RecyclerError::InvalidArgument {
                    what: "delta",
                    value: delta,
                });
            }
            this.cancel_smooth_scroll();
            let bounds = this.bounds();
            let applied = this.scroll.apply_delta(delta, policy, &bounds);
            this.refresh(applied)?;
            Ok(applied)
        })
    }

    /// Starts a pointer drag at `pos`; `time` is in seconds.
    pub fn begin_drag(&mut self, pos: Point, time: f64) -> Result<(), RecyclerError> {
        self.guarded("begin_drag", |this| {
            let time = non_negative("time", time)?;
            this.cancel_smooth_scroll();
            this.scroll.begin_drag(pos, time);
            Ok(())
        })
    }

    /// Moves the pointer drag to `pos` and returns the applied delta.
    pub fn drag_to(&mut self, pos: Point, time: f64) -> Result<f64, RecyclerError> {
        self.guarded("drag_to", |this| {
            let time = non_negative("time", time)?;
            let bounds = this.bounds();
            let applied = this.scroll.drag_to(pos, time, &bounds);
            this.refresh(applied)?;
            Ok(applied)
        })
    }

    /// Releases the pointer drag. Content keeps coasting on later ticks.
    pub fn end_drag(&mut self, time: f64) -> Result<(), RecyclerError> {
        self.guarded("end_drag", |this| {
            let time = non_negative("time", time)?;
            this.scroll.end_drag(time);
            Ok(())
        })
    }

    /// Advances animations, inertia, and elastic release by `dt` seconds and
    /// returns the applied delta.
    pub fn tick(&mut self, dt: f64) -> Result<f64, RecyclerError> {
        self.guarded("tick", |this| {
            let dt = non_negative("dt", dt)?;
            let delta = match this.smooth.take() {
                Some(mut animation) => {
                    let request = *animation.request();
                    let target = match this.target_inset(
                        request.item_index,
                        request.viewport_offset_frac,
                        request.item_pivot_frac,
                    ) {
                        Ok(target) => target,
                        Err(err) => {
                            animation.cancel();
                            return Err(err);
                        }
                    };
                    let (inset, status) = animation.tick(dt, target);
                    if status == AnimationStatus::Continue {
                        this.smooth = Some(animation);
                    }
                    let delta = inset - this.scroll.inset();
                    this.scroll.set_inset(inset);
                    delta
                }
                None => {
                    let bounds = this.bounds();
                    this.scroll.tick(dt, &bounds)
                }
            };
            if delta != 0.0 {
                this.refresh(delta)?;
            }
            Ok(delta)
        })
    }

    /// Jumps to a normalized position, `0` being the start and `1` the end.
    ///
    /// Does nothing when the content fits the viewport.
    pub fn set_normalized_position(&mut self, position: f64) -> Result<(), RecyclerError> {
        self.guarded("set_normalized_position", |this| {
            let position = fraction("position", position)?;
            let bounds = this.bounds();
            if bounds.slack() <= 0.0 {
                return Ok(());
            }
            this.cancel_smooth_scroll();
            this.scroll.stop();
            this.jump_to(ScrollModel::inset_for_normalized(position, &bounds))
        })
    }

    /// Creates `count` views for `template_item_index` straight into the
    /// buffered pool tier, where they are never evicted.
    pub fn prewarm(&mut self, count: usize, template_item_index: usize) -> Result<(), RecyclerError> {
        self.guarded("prewarm", |this| {
            let view_index = this.sizes.view_index_of_real(template_item_index)?;
            for _ in 0..count {
                let handle = this.host.create_item(template_item_index);
                let mut view = ItemView::new(handle, template_item_index, view_index);
                view.view.set_enabled(false);
                view.view.set_parent(ViewParent::Pool);
                this.pool.buffer(view);
                this.counters.created += 1;
            }
            debug!(count, template_item_index, "pool prewarmed");
            Ok(())
        })
    }

    /// Destroys every pooled view, including the buffered tier when
    /// `include_buffered` is set.
    pub fn clear_pools(&mut self, include_buffered: bool) -> Result<(), RecyclerError> {
        self.guarded("clear_pools", |this| {
            for view in this.pool.drain(include_buffered) {
                this.destroy(view);
            }
            Ok(())
        })
    }

    // --- Internals --------------------------------------------------------

    fn guarded<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, RecyclerError>,
    ) -> Result<T, RecyclerError> {
        // A host callback that unwinds leaves `busy` set, so a list that
        // survived a panic refuses further mutation.
        if self.busy {
            return Err(RecyclerError::Reentrant { operation });
        }
        self.busy = true;
        let result = f(self);
        self.busy = false;
        result
    }

    fn bounds(&self) -> ScrollBounds {
        ScrollBounds {
            content_size: self.content_size,
            viewport_size: self.viewport_size,
            unbounded: self.params.looping && self.content_size > self.viewport_size,
        }
    }

    fn sync_content_size(&mut self) -> Result<(), RecyclerError> {
        self.content_size =
            self.params.padding_start + self.sizes.total_size()? + self.params.padding_end;
        Ok(())
    }

    fn item_start(&self, view_index: usize) -> Result<f64, RecyclerError> {
        Ok(self.scroll.inset() + self.params.padding_start + self.sizes.start_of(view_index)?)
    }

    fn item_extent(&self, view_index: usize) -> Result<(f64, f64), RecyclerError> {
        let start = self.item_start(view_index)?;
        Ok((start, start + self.sizes.item_at(view_index)?))
    }

    /// Moves the inset together with anything that tracks it.
    fn shift_inset(&mut self, by: f64) {
        self.scroll.shift_inset(by);
        if let Some(animation) = self.smooth.as_mut() {
            animation.shift(by);
        }
    }

    fn jump_to(&mut self, inset: f64) -> Result<(), RecyclerError> {
        let delta = inset - self.scroll.inset();
        self.scroll.set_inset(inset);
        self.refresh(delta)
    }

    fn target_inset(
        &self,
        item_index: usize,
        viewport_offset_frac: f64,
        item_pivot_frac: f64,
    ) -> Result<f64, RecyclerError> {
        let viewport_offset_frac = fraction("viewport_offset_frac", viewport_offset_frac)?;
        let item_pivot_frac = fraction("item_pivot_frac", item_pivot_frac)?;
        let view_index = self.sizes.view_index_of_real(item_index)?;
        let target = viewport_offset_frac * self.viewport_size
            - self.params.padding_start
            - self.sizes.start_of(view_index)?
            - item_pivot_frac * self.sizes.item_at(view_index)?;
        let bounds = self.bounds();
        Ok(if bounds.unbounded {
            target
        } else {
            bounds.clamp(target)
        })
    }

    fn begin_count_change(&mut self, change: CountChange) {
        self.cancel_smooth_scroll();
        if !change.keep_velocity {
            self.scroll.stop();
        }
    }

    fn finish_count_change(
        &mut self,
        change: CountChange,
        inset_from_end: f64,
    ) -> Result<(), RecyclerError> {
        self.sync_content_size()?;
        if change.anchor_trailing {
            self.scroll
                .set_inset(self.viewport_size - self.content_size - inset_from_end);
        }
        let bounds = self.bounds();
        if !bounds.unbounded {
            self.scroll.set_inset(bounds.clamp(self.scroll.inset()));
        }
        self.refresh(0.0)
    }

    /// Brings the size index back to unrotated order. Active views are
    /// recycled because their view indices no longer apply.
    fn undo_rotation(&mut self) -> Result<(), RecyclerError> {
        if self.sizes.real_index_of_first_item_in_view() == 0 {
            return Ok(());
        }
        self.recycle_all();
        self.sizes.rotate(0)?;
        debug!("loop rotation undone");
        Ok(())
    }

    fn refresh(&mut self, delta: f64) -> Result<(), RecyclerError> {
        self.visibility_pass(delta)?;
        if self.twin_pass_pending {
            self.twin_pass()?;
        }
        Ok(())
    }

    fn visibility_pass(&mut self, delta: f64) -> Result<(), RecyclerError> {
        self.counters.passes += 1;
        self.rotate_for_loop()?;
        self.recycle_outside()?;
        self.fill()?;
        self.layout()?;
        self.pool.note_visible(self.active.len());
        self.evict_excess();
        trace!(
            delta,
            inset = self.scroll.inset(),
            active = self.active.len(),
            pooled = self.pool.pooled_len(),
            "visibility pass"
        );
        Ok(())
    }

    fn rotate_for_loop(&mut self) -> Result<(), RecyclerError> {
        let count = self.sizes.len();
        if count == 0 {
            return Ok(());
        }
        if !self.bounds().unbounded {
            return self.leave_loop();
        }
        // Whole cycles look identical, so large jumps only need to rotate
        // through one of them.
        let cycle = self.sizes.total_size()? + self.sizes.spacing();
        let inset = self.scroll.inset();
        if inset.abs() > cycle {
            self.shift_inset(inset % cycle - inset);
        }
        for _ in 0..2 * count {
            let (head_start, head_end) = self.item_extent(0)?;
            let (tail_start, tail_end) = self.item_extent(count - 1)?;
            if tail_end < self.viewport_size && head_end <= 0.0 {
                self.rotate_head_to_tail()?;
            } else if head_start > 0.0 && tail_start >= self.viewport_size {
                self.rotate_tail_to_head()?;
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Restores natural item order once content stops wrapping, keeping the
    /// item that led the rotated order where it was on screen.
    fn leave_loop(&mut self) -> Result<(), RecyclerError> {
        let first = self.sizes.real_index_of_first_item_in_view();
        if first == 0 {
            return Ok(());
        }
        self.undo_rotation()?;
        let moved = self.sizes.start_of(first)?;
        self.shift_inset(-moved);
        Ok(())
    }

    fn rotate_head_to_tail(&mut self) -> Result<(), RecyclerError> {
        let moved = self.sizes.item_at(0)? + self.sizes.spacing();
        if self.active.front().is_some_and(|v| v.index_in_view == 0) {
            if let Some(view) = self.active.pop_front() {
                self.recycle(view);
            }
        }
        self.sizes.rotate_by(1)?;
        for view in &mut self.active {
            view.index_in_view -= 1;
        }
        self.shift_inset(moved);
        self.counters.rotations += 1;
        debug!(
            first = self.sizes.real_index_of_first_item_in_view(),
            inset = self.scroll.inset(),
            "rotated head to tail"
        );
        Ok(())
    }

    fn rotate_tail_to_head(&mut self) -> Result<(), RecyclerError> {
        let last = self.sizes.len() - 1;
        let moved = self.sizes.item_at(last)? + self.sizes.spacing();
        if self.active.back().is_some_and(|v| v.index_in_view == last) {
            if let Some(view) = self.active.pop_back() {
                self.recycle(view);
            }
        }
        self.sizes.rotate_by(-1)?;
        for view in &mut self.active {
            view.index_in_view += 1;
        }
        self.shift_inset(-moved);
        self.counters.rotations += 1;
        debug!(
            first = self.sizes.real_index_of_first_item_in_view(),
            inset = self.scroll.inset(),
            "rotated tail to head"
        );
        Ok(())
    }

    fn recycle_outside(&mut self) -> Result<(), RecyclerError> {
        while let Some(index) = self.active.front().map(|v| v.index_in_view) {
            if self.overlaps_viewport(index)? {
                break;
            }
            if let Some(view) = self.active.pop_front() {
                self.recycle(view);
            }
        }
        while let Some(index) = self.active.back().map(|v| v.index_in_view) {
            if self.overlaps_viewport(index)? {
                break;
            }
            if let Some(view) = self.active.pop_back() {
                self.recycle(view);
            }
        }
        Ok(())
    }

    fn overlaps_viewport(&self, view_index: usize) -> Result<bool, RecyclerError> {
        let (start, end) = self.item_extent(view_index)?;
        Ok(end > 0.0 && start < self.viewport_size)
    }

    fn fill(&mut self) -> Result<(), RecyclerError> {
        let count = self.sizes.len();
        if count == 0 || self.viewport_size <= 0.0 {
            return Ok(());
        }
        if self.active.is_empty() {
            let Some(first) = self.first_overlapping()? else {
                return Ok(());
            };
            let view = self.obtain(first)?;
            self.active.push_back(view);
        }
        while let Some(next) = self.active.back().map(|v| v.index_in_view + 1) {
            if next >= count || self.item_start(next)? >= self.viewport_size {
                break;
            }
            let view = self.obtain(next)?;
            self.active.push_back(view);
        }
        while let Some(front) = self.active.front().map(|v| v.index_in_view) {
            if front == 0 {
                break;
            }
            let (_, end) = self.item_extent(front - 1)?;
            if end <= 0.0 {
                break;
            }
            let view = self.obtain(front - 1)?;
            self.active.push_front(view);
        }
        Ok(())
    }

    /// First view index overlapping the viewport, if any.
    fn first_overlapping(&self) -> Result<Option<usize>, RecyclerError> {
        let offset = -(self.scroll.inset() + self.params.padding_start);
        let Some(mut view_index) = self.sizes.index_at_offset(offset.max(0.0))? else {
            return Ok(None);
        };
        while view_index < self.sizes.len() {
            let (start, end) = self.item_extent(view_index)?;
            if start >= self.viewport_size {
                return Ok(None);
            }
            if end > 0.0 {
                return Ok(Some(view_index));
            }
            view_index += 1;
        }
        Ok(None)
    }

    /// Pulls a reusable view from the pool, or creates one, and binds it.
    fn obtain(&mut self, view_index: usize) -> Result<ItemView<H::View>, RecyclerError> {
        let item_index = self.sizes.real_index_of_view(view_index)?;
        let size = self.sizes.item_at(view_index)?;
        let host = &self.host;
        let reused = self
            .pool
            .extract(|view| host.is_reusable(view, item_index, size));
        let mut view = match reused {
            Some(mut view) => {
                self.host.before_recycle(&mut view, Some(item_index));
                view.item_index = item_index;
                view.index_in_view = view_index;
                view
            }
            None => {
                self.counters.created += 1;
                ItemView::new(self.host.create_item(item_index), item_index, view_index)
            }
        };
        view.view.set_parent(ViewParent::Content);
        view.view.set_enabled(true);
        if self.host.bind_item(&mut view) == ItemSizing::AfterRender {
            self.twin_pass_pending = true;
        }
        Ok(view)
    }

    fn recycle(&mut self, mut view: ItemView<H::View>) {
        self.host.before_recycle(&mut view, None);
        view.view.set_enabled(false);
        view.view.set_parent(ViewParent::Pool);
        self.pool.release(view);
    }

    fn recycle_all(&mut self) {
        while let Some(view) = self.active.pop_front() {
            self.recycle(view);
        }
    }

    fn evict_excess(&mut self) {
        for view in self.pool.take_excess() {
            self.destroy(view);
        }
    }

    fn destroy(&mut self, mut view: ItemView<H::View>) {
        self.host.before_destroy(&mut view);
        let item_index = view.item_index;
        if let Err(err) = self.host.destroy_item(view.view) {
            self.counters.destroy_failures += 1;
            warn!(item_index, %err, "failed to destroy item view");
        }
        self.counters.destroyed += 1;
    }

    fn layout(&mut self) -> Result<(), RecyclerError> {
        let Some(first) = self.active.front().map(|v| v.index_in_view) else {
            return Ok(());
        };
        let mut offset = self.item_start(first)?;
        let spacing = self.sizes.spacing();
        for view in &mut self.active {
            let size = self.sizes.item_at(view.index_in_view)?;
            view.view.set_offset_and_size(offset, size);
            offset += size + spacing;
        }
        Ok(())
    }

    fn twin_pass(&mut self) -> Result<(), RecyclerError> {
        self.counters.twin_passes += 1;
        let limit = self.params.max_twin_pass_iterations;
        for iteration in 1..=limit {
            self.twin_pass_pending = false;
            let before = self.content_size;
            self.remeasure_active()?;
            let after = self.content_size;
            debug!(iteration, before, after, "twin pass");
            self.visibility_pass(0.0)?;
            if !self.twin_pass_pending && (after - before).abs() <= SIZE_EPSILON {
                return Ok(());
            }
        }
        error!(
            iterations = limit,
            default_item_size = self.sizes.default_size(),
            "twin pass did not converge"
        );
        Err(RecyclerError::TwinPassDidNotConverge { iterations: limit })
    }

    /// Writes the rendered size of every active view back into the size
    /// index, keeping the configured edge of the active window in place.
    fn remeasure_active(&mut self) -> Result<(), RecyclerError> {
        let Some(first) = self.active.front().map(|v| v.index_in_view) else {
            return Ok(());
        };
        let anchor = match self.params.twin_pass_anchor {
            Edge::Start => first,
            Edge::End => first + self.active.len() - 1,
        };
        let anchored_before = self.anchor_position(anchor)?;

        let mut measured: SmallVec<[f64; 16]> = SmallVec::with_capacity(self.active.len());
        for view in &self.active {
            measured.push(non_negative("measured size", self.host.measure_item(view))?);
        }
        self.sizes.begin_batch_resize(first)?;
        let written = measured
            .iter()
            .enumerate()
            .try_for_each(|(i, &size)| self.sizes.set_batch_size(first + i, size));
        let ended = self.sizes.end_batch_resize();
        written.and(ended)?;
        self.sync_content_size()?;

        let anchored_after = self.anchor_position(anchor)?;
        self.shift_inset(anchored_before - anchored_after);
        Ok(())
    }

    fn anchor_position(&self, view_index: usize) -> Result<f64, RecyclerError> {
        let (start, end) = self.item_extent(view_index)?;
        Ok(match self.params.twin_pass_anchor {
            Edge::Start => start,
            Edge::End => end,
        })
    }
}
