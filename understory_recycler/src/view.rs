// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-facing capability traits.
//!
//! The engine never renders anything. It talks to the host UI toolkit through
//! two small seams:
//!
//! - [`ViewHandle`]: what the engine needs from one realized view (read its
//!   rendered size, place it, show/hide it, reparent it).
//! - [`ItemHost`]: what the engine needs from the host as a whole (create,
//!   bind, recycle, and destroy views).

use core::fmt::Display;

/// Where a view is attached in the host's tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewParent {
    /// Inside the scrolling content, where it is visible.
    Content,
    /// Parked outside the content while it sits in a pool.
    Pool,
}

/// Minimal adapter over one host view instance.
///
/// Offsets are measured from the viewport's leading edge along the list axis.
pub trait ViewHandle {
    /// Rendered size along the list axis.
    fn size(&self) -> f64;

    /// Places the view `offset` units after the viewport's leading edge and
    /// sizes it to `size` along the list axis.
    fn set_offset_and_size(&mut self, offset: f64, size: f64);

    /// Shows or hides the view.
    fn set_enabled(&mut self, enabled: bool);

    /// Moves the view between the content and the pool container.
    fn set_parent(&mut self, parent: ViewParent);
}

/// A host view plus the item it is currently bound to.
#[derive(Clone, Debug)]
pub struct ItemView<V> {
    /// The host view.
    pub view: V,
    pub(crate) item_index: usize,
    pub(crate) index_in_view: usize,
}

impl<V> ItemView<V> {
    pub(crate) fn new(view: V, item_index: usize, index_in_view: usize) -> Self {
        Self {
            view,
            item_index,
            index_in_view,
        }
    }

    /// Index of the item in the data set.
    #[must_use]
    pub fn item_index(&self) -> usize {
        self.item_index
    }

    /// Position of the item in the (possibly rotated) layout order.
    ///
    /// Equal to [`ItemView::item_index`] unless the list loops.
    #[must_use]
    pub fn index_in_view(&self) -> usize {
        self.index_in_view
    }
}

/// Returned by [`ItemHost::bind_item`] to describe how the item is sized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ItemSizing {
    /// The size recorded in the size index is authoritative.
    #[default]
    Known,
    /// The item sizes itself during rendering. The engine measures it with
    /// [`ItemHost::measure_item`] and lays everything out again.
    AfterRender,
}

/// The host side of a [`RecyclerList`](crate::RecyclerList).
///
/// Only [`ItemHost::create_item`] and [`ItemHost::bind_item`] are required;
/// every other hook has a permissive default.
pub trait ItemHost {
    /// The host's view type.
    type View: ViewHandle;
    /// Error reported when a view fails to tear down.
    type Error: Display;

    /// Creates a fresh view, the first time a view is needed for
    /// `item_index` and none can be reused.
    fn create_item(&mut self, item_index: usize) -> Self::View;

    /// Fills `view` with the data of `view.item_index()`.
    fn bind_item(&mut self, view: &mut ItemView<Self::View>) -> ItemSizing;

    /// Called when `view` leaves its item. `new_item_index` is `None` when
    /// the view goes to a pool and `Some` when it is about to be rebound.
    fn before_recycle(
        &mut self,
        view: &mut ItemView<Self::View>,
        new_item_index: Option<usize>,
    ) {
        let _ = (view, new_item_index);
    }

    /// Called right before `view` is destroyed.
    fn before_destroy(&mut self, view: &mut ItemView<Self::View>) {
        let _ = view;
    }

    /// Whether a pooled `view` may show `candidate_item_index`.
    ///
    /// Hosts with heterogeneous item templates return `false` for views of
    /// the wrong kind.
    fn is_reusable(
        &self,
        view: &ItemView<Self::View>,
        candidate_item_index: usize,
        candidate_size: f64,
    ) -> bool {
        let _ = (view, candidate_item_index, candidate_size);
        true
    }

    /// Tears the view down. Failures are logged and do not stop the
    /// recycling pass.
    fn destroy_item(&mut self, view: Self::View) -> Result<(), Self::Error> {
        drop(view);
        Ok(())
    }

    /// Rendered size of an item whose binding returned
    /// [`ItemSizing::AfterRender`].
    fn measure_item(&mut self, view: &ItemView<Self::View>) -> f64 {
        view.view.size()
    }
}
