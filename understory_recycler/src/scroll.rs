// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtual content position, drag gestures, elasticity, and inertia.
//!
//! ## Coordinates
//!
//! The position is the *virtual inset*: the signed distance of the content's
//! leading edge from the viewport's leading edge. At rest at the start the
//! inset is `0`; scrolling toward the end makes it negative, down to
//! `viewport - content`. A positive delta moves content toward the end of the
//! viewport (revealing earlier items).
//!
//! ## Usage
//!
//! 1) Call [`ScrollModel::begin_drag`] with the pointer position.
//! 2) Feed moves to [`ScrollModel::drag_to`]; it returns the delta that was
//!    applied after boundary rules.
//! 3) Call [`ScrollModel::end_drag`]; the release velocity now coasts.
//! 4) Call [`ScrollModel::tick`] every frame to integrate inertia and pull
//!    content back inside its bounds.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Vec2};

use crate::{Orientation, ScrollParams};

/// What happens when a delta pushes content past one of its bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Content stops at the boundary; deltas that push further are dropped.
    Disallow,
    /// Content may leave its bounds, with elastic damping when enabled.
    #[default]
    Allow,
    /// Content may only move if that does not increase how far it is out of
    /// bounds.
    AllowIfShrinking,
}

/// Extents the scroll model needs from its owner for one operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollBounds {
    /// Total content size, paddings included.
    pub content_size: f64,
    /// Size of the viewport.
    pub viewport_size: f64,
    /// Disables every boundary rule (looping content has no ends).
    pub unbounded: bool,
}

impl ScrollBounds {
    /// How much larger the content is than the viewport. May be negative.
    #[must_use]
    pub fn slack(&self) -> f64 {
        self.content_size - self.viewport_size
    }

    /// Smallest in-bounds inset (content end aligned with the viewport end).
    #[must_use]
    pub fn min_inset(&self) -> f64 {
        -self.slack().max(0.0)
    }

    /// Largest in-bounds inset (content start aligned with the viewport start).
    #[must_use]
    pub fn max_inset(&self) -> f64 {
        0.0
    }

    /// How far `inset` lies outside `min_inset()..=max_inset()`.
    #[must_use]
    pub fn outside_amount(&self, inset: f64) -> f64 {
        (inset - self.max_inset())
            .max(self.min_inset() - inset)
            .max(0.0)
    }

    /// Clamps `inset` into bounds.
    #[must_use]
    pub fn clamp(&self, inset: f64) -> f64 {
        inset.clamp(self.min_inset(), self.max_inset())
    }
}

#[derive(Clone, Copy, Debug)]
struct DragTrack {
    last_pos: Point,
    last_time: f64,
}

/// Owns the virtual inset and the gesture/inertia state driving it.
#[derive(Clone, Debug)]
pub struct ScrollModel {
    params: ScrollParams,
    orientation: Orientation,
    inset: f64,
    velocity: Vec2,
    drag: Option<DragTrack>,
    carried_velocity: f64,
    last_drag_end: Option<f64>,
}

impl ScrollModel {
    /// Creates a model at rest at the start.
    #[must_use]
    pub fn new(params: ScrollParams, orientation: Orientation) -> Self {
        Self {
            params,
            orientation,
            inset: 0.0,
            velocity: Vec2::ZERO,
            drag: None,
            carried_velocity: 0.0,
            last_drag_end: None,
        }
    }

    /// Current tuning.
    #[must_use]
    pub fn params(&self) -> &ScrollParams {
        &self.params
    }

    /// Distance of the content's leading edge from the viewport's leading edge.
    #[must_use]
    pub fn inset(&self) -> f64 {
        self.inset
    }

    /// Distance of the viewport's trailing edge from the content's trailing edge.
    #[must_use]
    pub fn inset_from_viewport_end(&self, bounds: &ScrollBounds) -> f64 {
        bounds.viewport_size - bounds.content_size - self.inset
    }

    /// Overwrites the inset without any boundary rule.
    pub fn set_inset(&mut self, inset: f64) {
        self.inset = inset;
    }

    /// Moves the inset without any boundary rule, returning the new inset.
    pub fn shift_inset(&mut self, delta: f64) -> f64 {
        self.inset += delta;
        self.inset
    }

    /// Current velocity in units per second.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Velocity along the list axis.
    #[must_use]
    pub fn axis_velocity(&self) -> f64 {
        self.orientation.along(self.velocity)
    }

    /// Replaces the velocity along the list axis.
    pub fn set_axis_velocity(&mut self, velocity: f64) {
        self.velocity = self.orientation.to_vec2(velocity);
    }

    /// Stops any coasting.
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// Returns `true` between [`ScrollModel::begin_drag`] and
    /// [`ScrollModel::end_drag`].
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Moves content by `delta` under `policy` and returns the delta that was
    /// actually applied.
    pub fn apply_delta(&mut self, delta: f64, policy: BoundaryPolicy, bounds: &ScrollBounds) -> f64 {
        if delta == 0.0 || !delta.is_finite() {
            return 0.0;
        }
        if bounds.unbounded {
            self.inset += delta;
            return delta;
        }
        let pull = self.pull_towards(delta > 0.0, bounds);
        let effective = match policy {
            BoundaryPolicy::Disallow => clip_at_boundary(delta, pull),
            BoundaryPolicy::AllowIfShrinking => {
                let before = bounds.outside_amount(self.inset);
                let after = bounds.outside_amount(self.inset + delta);
                if after <= before {
                    delta
                } else {
                    clip_at_boundary(delta, pull)
                }
            }
            BoundaryPolicy::Allow => self.elastic_delta(delta, pull, bounds),
        };
        self.inset += effective;
        effective
    }

    /// Signed distance past the boundary being approached. Negative values
    /// are the room left before reaching it.
    fn pull_towards(&self, towards_start: bool, bounds: &ScrollBounds) -> f64 {
        if towards_start {
            self.inset - bounds.max_inset()
        } else {
            bounds.min_inset() - self.inset
        }
    }

    fn elastic_delta(&self, delta: f64, pull: f64, bounds: &ScrollBounds) -> f64 {
        if !self.params.elastic {
            return delta;
        }
        if pull >= 0.0 {
            return self.damp(delta, pull, bounds);
        }
        // Up to the boundary the delta applies in full; past it, damped.
        let room = -pull;
        if delta.abs() <= room {
            return delta;
        }
        let inside = room.copysign(delta);
        inside + self.damp(delta - inside, 0.0, bounds)
    }

    fn damp(&self, delta: f64, pull: f64, bounds: &ScrollBounds) -> f64 {
        let normalized = if bounds.viewport_size > 0.0 {
            (pull / bounds.viewport_size).clamp(0.0, 1.0)
        } else {
            1.0
        };
        delta * self.params.pull_elasticity * (1.0 - normalized)
    }

    /// Integrates one frame of `dt` seconds and returns the applied delta.
    ///
    /// Out of bounds, content returns along a critically damped curve with
    /// time constant `release_time` (or snaps back when elasticity is off).
    /// In bounds, the velocity decays by `(1 - deceleration_rate)^dt`.
    pub fn tick(&mut self, dt: f64, bounds: &ScrollBounds) -> f64 {
        if dt.is_nan() || dt <= 0.0 || self.is_dragging() {
            return 0.0;
        }
        if !bounds.unbounded && bounds.outside_amount(self.inset) > 0.0 {
            let target = bounds.clamp(self.inset);
            let new_inset = if self.params.elastic {
                let mut velocity = self.axis_velocity();
                let out = smooth_damp(
                    self.inset,
                    target,
                    &mut velocity,
                    self.params.release_time,
                    dt,
                );
                self.set_axis_velocity(velocity);
                if (out - target).abs() < SETTLE_EPSILON {
                    self.stop();
                    target
                } else {
                    out
                }
            } else {
                self.stop();
                target
            };
            let delta = new_inset - self.inset;
            self.inset = new_inset;
            return delta;
        }

        let mut velocity = self.axis_velocity();
        if !self.params.inertia || velocity.abs() <= self.params.stop_velocity {
            self.stop();
            return 0.0;
        }
        velocity *= (1.0 - self.params.deceleration_rate).powf(dt);
        let delta = velocity * dt;
        if velocity.abs() <= self.params.stop_velocity {
            velocity = 0.0;
        }
        self.set_axis_velocity(velocity);
        self.apply_delta(delta, BoundaryPolicy::Allow, bounds)
    }

    /// Starts a drag at `pos` at time `time` (seconds).
    ///
    /// If the previous drag ended less than `drag_stack_window` ago and
    /// content is still coasting, that velocity is remembered so a release in
    /// the same direction can build on it.
    pub fn begin_drag(&mut self, pos: Point, time: f64) {
        let velocity = self.axis_velocity();
        self.carried_velocity = match self.last_drag_end {
            Some(end) if time - end <= self.params.drag_stack_window && velocity != 0.0 => velocity,
            _ => 0.0,
        };
        self.stop();
        self.drag = Some(DragTrack {
            last_pos: pos,
            last_time: time,
        });
    }

    /// Moves the drag to `pos` and returns the applied delta along the list
    /// axis. Returns `0.0` when no drag is active.
    pub fn drag_to(&mut self, pos: Point, time: f64, bounds: &ScrollBounds) -> f64 {
        let Some(track) = self.drag else {
            return 0.0;
        };
        let raw = self.orientation.along(pos - track.last_pos);
        let applied = self.apply_delta(raw, BoundaryPolicy::Allow, bounds);
        let dt = time - track.last_time;
        if dt > 0.0 {
            let instant = applied / dt;
            let velocity = self.axis_velocity();
            let blend = (dt * VELOCITY_SMOOTHING).min(1.0);
            self.set_axis_velocity(velocity + (instant - velocity) * blend);
        }
        self.drag = Some(DragTrack {
            last_pos: pos,
            last_time: time,
        });
        applied
    }

    /// Ends the drag. The release velocity coasts on subsequent ticks.
    ///
    /// Holding the pointer still before releasing counts as samples of zero
    /// motion, so a pause drains the velocity.
    pub fn end_drag(&mut self, time: f64) {
        let Some(track) = self.drag.take() else {
            return;
        };
        let held = time - track.last_time;
        if held > 0.0 {
            let velocity = self.axis_velocity();
            let blend = (held * VELOCITY_SMOOTHING).min(1.0);
            self.set_axis_velocity(velocity * (1.0 - blend));
        }
        let velocity = self.axis_velocity();
        let carried = core::mem::take(&mut self.carried_velocity);
        if self.params.inertia
            && velocity != 0.0
            && carried != 0.0
            && velocity.signum() == carried.signum()
        {
            let cap = velocity.abs() * self.params.max_stack_multiplier;
            self.set_axis_velocity((velocity + carried).clamp(-cap, cap));
        }
        if !self.params.inertia {
            self.stop();
        }
        self.last_drag_end = Some(time);
    }

    /// Position as a fraction of the scrollable slack; `0` at the start,
    /// `1` at the end. Content that fits the viewport reports `0.5`.
    #[must_use]
    pub fn normalized_position(&self, bounds: &ScrollBounds) -> f64 {
        let slack = bounds.slack();
        if slack <= 0.0 {
            return 0.5;
        }
        -self.inset / slack
    }

    /// Inset that corresponds to a normalized position.
    #[must_use]
    pub fn inset_for_normalized(position: f64, bounds: &ScrollBounds) -> f64 {
        -position * bounds.slack().max(0.0)
    }
}

const SETTLE_EPSILON: f64 = 1e-3;

/// Weight per second given to the newest sample when smoothing drag velocity.
const VELOCITY_SMOOTHING: f64 = 10.0;

fn clip_at_boundary(delta: f64, pull: f64) -> f64 {
    if pull >= 0.0 {
        0.0
    } else if delta > 0.0 {
        delta.min(-pull)
    } else {
        delta.max(pull)
    }
}

/// Critically damped spring step toward `target`.
fn smooth_damp(current: f64, target: f64, velocity: &mut f64, smooth_time: f64, dt: f64) -> f64 {
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let output = target + (change + temp) * decay;
    // No overshoot past the target.
    if (target > current) == (output > target) {
        *velocity = 0.0;
        return target;
    }
    output
}
