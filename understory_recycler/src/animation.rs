// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-driven smooth scrolling.
//!
//! A [`SmoothScroll`] is a small state machine. The list calls
//! [`SmoothScroll::tick`] once per frame with the elapsed time and the
//! current target inset; the target is recomputed every frame so that size
//! changes (or loop rotations) during the animation do not make it land in
//! the wrong place.

use alloc::boxed::Box;
use core::fmt;

/// Outcome of one animation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationStatus {
    /// More frames are needed.
    Continue,
    /// The target was reached.
    Done,
    /// The animation was cancelled before reaching its target.
    Cancelled,
}

/// Where a smooth scroll should end up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothScrollRequest {
    /// Item to bring into view.
    pub item_index: usize,
    /// Where in the viewport the item's pivot lands, as a fraction of the
    /// viewport size. `0` is the leading edge.
    pub viewport_offset_frac: f64,
    /// Which point of the item is aligned, as a fraction of its size.
    pub item_pivot_frac: f64,
    /// Length of the animation in seconds.
    pub duration: f64,
}

impl SmoothScrollRequest {
    /// Aligns the start of `item_index` with the start of the viewport.
    #[must_use]
    pub fn new(item_index: usize, duration: f64) -> Self {
        Self {
            item_index,
            viewport_offset_frac: 0.0,
            item_pivot_frac: 0.0,
            duration,
        }
    }

    /// Sets both alignment fractions.
    #[must_use]
    pub fn with_alignment(mut self, viewport_offset_frac: f64, item_pivot_frac: f64) -> Self {
        self.viewport_offset_frac = viewport_offset_frac;
        self.item_pivot_frac = item_pivot_frac;
        self
    }
}

/// Called each frame with the linear progress in `0..=1`. Returning `false`
/// cancels the animation.
pub type ProgressCallback = Box<dyn FnMut(f64) -> bool>;

/// Called once when the animation completes.
pub type DoneCallback = Box<dyn FnOnce()>;

/// A smooth scroll in flight.
pub struct SmoothScroll {
    request: SmoothScrollRequest,
    elapsed: f64,
    start_inset: f64,
    on_progress: Option<ProgressCallback>,
    on_done: Option<DoneCallback>,
    fire_done_on_cancel: bool,
}

impl fmt::Debug for SmoothScroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmoothScroll")
            .field("request", &self.request)
            .field("elapsed", &self.elapsed)
            .field("start_inset", &self.start_inset)
            .field("fire_done_on_cancel", &self.fire_done_on_cancel)
            .finish_non_exhaustive()
    }
}

impl SmoothScroll {
    /// Creates an animation without callbacks.
    #[must_use]
    pub fn new(request: SmoothScrollRequest) -> Self {
        Self {
            request,
            elapsed: 0.0,
            start_inset: 0.0,
            on_progress: None,
            on_done: None,
            fire_done_on_cancel: false,
        }
    }

    /// Sets the per-frame progress callback.
    #[must_use]
    pub fn on_progress(mut self, callback: impl FnMut(f64) -> bool + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn on_done(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_done = Some(Box::new(callback));
        self
    }

    /// Whether a cancelled animation still runs its completion callback.
    #[must_use]
    pub fn fire_done_on_cancel(mut self, fire: bool) -> Self {
        self.fire_done_on_cancel = fire;
        self
    }

    /// The requested destination.
    #[must_use]
    pub fn request(&self) -> &SmoothScrollRequest {
        &self.request
    }

    /// Seconds elapsed since the animation started.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub(crate) fn start(&mut self, inset: f64) {
        self.start_inset = inset;
        self.elapsed = 0.0;
    }

    /// Moves the start point along with the content, e.g. after a loop
    /// rotation changed the inset without moving anything on screen.
    pub(crate) fn shift(&mut self, by: f64) {
        self.start_inset += by;
    }

    /// Cancels the animation, running the completion callback if it was
    /// configured to fire on cancel.
    pub fn cancel(mut self) {
        self.finish(AnimationStatus::Cancelled);
    }

    /// Advances by `dt` seconds toward `target_inset` and returns the inset
    /// for this frame together with the resulting status.
    pub fn tick(&mut self, dt: f64, target_inset: f64) -> (f64, AnimationStatus) {
        self.elapsed += dt.max(0.0);
        let t = if self.request.duration > 0.0 {
            (self.elapsed / self.request.duration).min(1.0)
        } else {
            1.0
        };
        let inset = self.start_inset + (target_inset - self.start_inset) * smoothstep(t);

        if let Some(progress) = self.on_progress.as_mut() {
            if !progress(t) {
                self.finish(AnimationStatus::Cancelled);
                return (inset, AnimationStatus::Cancelled);
            }
        }
        if t >= 1.0 {
            self.finish(AnimationStatus::Done);
            return (target_inset, AnimationStatus::Done);
        }
        (inset, AnimationStatus::Continue)
    }

    fn finish(&mut self, status: AnimationStatus) {
        let fire = match status {
            AnimationStatus::Done => true,
            AnimationStatus::Cancelled => self.fire_done_on_cancel,
            AnimationStatus::Continue => false,
        };
        if fire {
            if let Some(done) = self.on_done.take() {
                done();
            }
        }
    }
}

fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
