// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Recycler: a virtualized list engine that recycles its views.
//!
//! The engine realizes views only for the items that overlap the viewport
//! and hands views that scroll out to a pool, from which they are rebound to
//! items that scroll in. It is renderer-agnostic: the host UI toolkit plugs
//! in through two small traits.
//!
//! The main pieces are:
//!
//! - [`SizeIndex`]: sparse per-item sizes. Only sizes that differ from a
//!   shared default are stored; cumulative offsets of any item are inferred
//!   from the nearest stored neighbor. Supports batched resizing,
//!   insert/remove renumbering, and index rotation for looping lists.
//! - [`ViewPool`]: a two-tier recycle store. The primary tier is trimmed by a
//!   capacity heuristic that remembers the largest viewport-full seen since
//!   the last resize; the buffered tier holds pre-warmed views and is never
//!   trimmed.
//! - [`ScrollModel`]: the virtual inset (signed distance of the content's
//!   leading edge from the viewport's leading edge), drag tracking, elastic
//!   boundaries, and inertia.
//! - [`RecyclerList`]: the controller. Each scroll, count change, or resize
//!   ends with a visibility pass that rotates looping content, recycles views
//!   that left the viewport, fills newly exposed space, and positions every
//!   view. Items that only know their size after rendering trigger a *twin
//!   pass* that measures them and lays out again.
//!
//! Hosts implement [`ViewHandle`] for their view type and [`ItemHost`] for
//! the object that creates and binds views.
//!
//! ## Minimal example
//!
//! ```rust
//! use core::convert::Infallible;
//! use understory_recycler::{
//!     CountChange, ItemHost, ItemSizing, ItemView, RecyclerList, RecyclerParams, ViewHandle,
//!     ViewParent,
//! };
//!
//! #[derive(Debug, Default)]
//! struct Row {
//!     offset: f64,
//!     size: f64,
//! }
//!
//! impl ViewHandle for Row {
//!     fn size(&self) -> f64 {
//!         self.size
//!     }
//!     fn set_offset_and_size(&mut self, offset: f64, size: f64) {
//!         self.offset = offset;
//!         self.size = size;
//!     }
//!     fn set_enabled(&mut self, _enabled: bool) {}
//!     fn set_parent(&mut self, _parent: ViewParent) {}
//! }
//!
//! struct Rows;
//!
//! impl ItemHost for Rows {
//!     type View = Row;
//!     type Error = Infallible;
//!
//!     fn create_item(&mut self, _item_index: usize) -> Row {
//!         Row::default()
//!     }
//!     fn bind_item(&mut self, _view: &mut ItemView<Row>) -> ItemSizing {
//!         ItemSizing::Known
//!     }
//! }
//!
//! let params = RecyclerParams::default().with_default_item_size(20.0);
//! let mut list = RecyclerList::new(Rows, params).unwrap();
//! list.reset(1_000, CountChange::default()).unwrap();
//! list.set_viewport_size(100.0).unwrap();
//! assert_eq!(list.visible_items().count(), 5);
//!
//! list.scroll_to_item(500, 0.0, 0.0).unwrap();
//! assert_eq!(list.first_visible_item(), Some(500));
//! // Five views were created; scrolling only rebound them.
//! assert_eq!(list.diagnostics().created, 5);
//! ```
//!
//! All sizes and offsets live in one caller-chosen 1D coordinate space
//! (typically logical pixels). Arguments outside their domain are reported
//! as [`RecyclerError`]s and never clamped silently.
//!
//! This crate is `no_std` and uses `alloc`. Float math needs either the
//! `std` (default) or the `libm` feature.

#![no_std]

extern crate alloc;

mod animation;
mod controller;
mod diagnostics;
mod error;
mod grid;
mod params;
mod pool;
mod scroll;
mod size_index;
mod view;

pub use animation::{AnimationStatus, DoneCallback, ProgressCallback, SmoothScroll, SmoothScrollRequest};
pub use controller::{CountChange, RecyclerList};
pub use diagnostics::Diagnostics;
pub use error::{ErrorKind, RecyclerError};
pub use grid::GridTracks;
pub use params::{Edge, Orientation, RecyclerParams, ScrollParams};
pub use pool::ViewPool;
pub use scroll::{BoundaryPolicy, ScrollBounds, ScrollModel};
pub use size_index::{ReinitMode, SizeEntry, SizeIndex};
pub use view::{ItemHost, ItemSizing, ItemView, ViewHandle, ViewParent};
