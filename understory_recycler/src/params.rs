// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration for [`RecyclerList`](crate::RecyclerList) and its scroll model.

use kurbo::Vec2;

use crate::RecyclerError;

/// Axis along which items are laid out.
///
/// The engine itself is one-dimensional; the orientation only selects which
/// component of 2D gesture input (pointer positions, velocities) drives it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Items stack top to bottom; the Y component drives scrolling.
    #[default]
    Vertical,
    /// Items stack left to right; the X component drives scrolling.
    Horizontal,
}

impl Orientation {
    /// Projects a 2D vector onto the list axis.
    #[must_use]
    pub fn along(self, v: Vec2) -> f64 {
        match self {
            Self::Vertical => v.y,
            Self::Horizontal => v.x,
        }
    }

    /// Builds a 2D vector whose list-axis component is `value`.
    #[must_use]
    pub fn to_vec2(self, value: f64) -> Vec2 {
        match self {
            Self::Vertical => Vec2::new(0.0, value),
            Self::Horizontal => Vec2::new(value, 0.0),
        }
    }
}

/// One of the two edges of the viewport or of a run of items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Edge {
    /// The leading edge (top or left).
    #[default]
    Start,
    /// The trailing edge (bottom or right).
    End,
}

/// Gesture and inertia tuning for [`ScrollModel`](crate::ScrollModel).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollParams {
    /// Whether content may be pulled past its bounds with diminishing motion.
    ///
    /// When disabled, content released outside its bounds snaps back at once.
    pub elastic: bool,
    /// Scale applied to deltas that move content further past a boundary.
    pub pull_elasticity: f64,
    /// Time constant (seconds) of the critically damped return from outside
    /// the bounds.
    pub release_time: f64,
    /// Whether content keeps moving after a drag is released.
    pub inertia: bool,
    /// Fraction of the velocity lost per second while coasting.
    pub deceleration_rate: f64,
    /// Maximum pause (seconds) between two drags for the previous velocity to
    /// be carried into the next release.
    pub drag_stack_window: f64,
    /// Upper bound of the carried velocity, as a multiple of the release
    /// velocity of the latest drag.
    pub max_stack_multiplier: f64,
    /// Speed (units per second) below which coasting stops.
    pub stop_velocity: f64,
}

impl Default for ScrollParams {
    fn default() -> Self {
        Self {
            elastic: true,
            pull_elasticity: 0.3,
            release_time: 0.1,
            inertia: true,
            deceleration_rate: 0.865,
            drag_stack_window: 0.4,
            max_stack_multiplier: 3.0,
            stop_velocity: 1.0,
        }
    }
}

impl ScrollParams {
    /// Checks that every value is inside its domain.
    pub fn validate(&self) -> Result<(), RecyclerError> {
        check("pull_elasticity", self.pull_elasticity, |v| {
            (0.0..=1.0).contains(&v)
        })?;
        check("release_time", self.release_time, |v| v > 0.0)?;
        check("deceleration_rate", self.deceleration_rate, |v| {
            (0.0..1.0).contains(&v)
        })?;
        check("drag_stack_window", self.drag_stack_window, |v| v >= 0.0)?;
        check("max_stack_multiplier", self.max_stack_multiplier, |v| {
            v >= 1.0
        })?;
        check("stop_velocity", self.stop_velocity, |v| v >= 0.0)?;
        Ok(())
    }
}

/// Configuration of a [`RecyclerList`](crate::RecyclerList).
///
/// Construct with [`RecyclerParams::default`] and adjust with the `with_*`
/// methods:
///
/// ```rust
/// use understory_recycler::RecyclerParams;
///
/// let params = RecyclerParams::default()
///     .with_default_item_size(48.0)
///     .with_spacing(4.0)
///     .with_looping(true);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecyclerParams {
    /// Size assumed for every item until a custom size is recorded.
    pub default_item_size: f64,
    /// Gap between consecutive items.
    pub spacing: f64,
    /// Space before the first item.
    pub padding_start: f64,
    /// Space after the last item.
    pub padding_end: f64,
    /// Joins the tail of the list to its head.
    pub looping: bool,
    /// Explicit number of spare views kept in the primary pool.
    ///
    /// `None` keeps as many spares as the largest viewport-full observed
    /// since the last viewport resize.
    pub recycle_bin_capacity: Option<usize>,
    /// Which edge of the realized items stays put while a twin pass
    /// re-measures them.
    pub twin_pass_anchor: Edge,
    /// Upper bound of re-measure iterations in one twin pass.
    pub max_twin_pass_iterations: usize,
    /// Axis used to interpret 2D gesture input.
    pub orientation: Orientation,
    /// Gesture and inertia tuning.
    pub scroll: ScrollParams,
}

impl Default for RecyclerParams {
    fn default() -> Self {
        Self {
            default_item_size: 100.0,
            spacing: 0.0,
            padding_start: 0.0,
            padding_end: 0.0,
            looping: false,
            recycle_bin_capacity: None,
            twin_pass_anchor: Edge::Start,
            max_twin_pass_iterations: 20,
            orientation: Orientation::Vertical,
            scroll: ScrollParams::default(),
        }
    }
}

impl RecyclerParams {
    /// Sets [`RecyclerParams::default_item_size`].
    #[must_use]
    pub fn with_default_item_size(mut self, size: f64) -> Self {
        self.default_item_size = size;
        self
    }

    /// Sets [`RecyclerParams::spacing`].
    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Sets both paddings.
    #[must_use]
    pub fn with_padding(mut self, start: f64, end: f64) -> Self {
        self.padding_start = start;
        self.padding_end = end;
        self
    }

    /// Sets [`RecyclerParams::looping`].
    #[must_use]
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Sets [`RecyclerParams::recycle_bin_capacity`].
    #[must_use]
    pub fn with_recycle_bin_capacity(mut self, capacity: Option<usize>) -> Self {
        self.recycle_bin_capacity = capacity;
        self
    }

    /// Sets [`RecyclerParams::twin_pass_anchor`].
    #[must_use]
    pub fn with_twin_pass_anchor(mut self, anchor: Edge) -> Self {
        self.twin_pass_anchor = anchor;
        self
    }

    /// Sets [`RecyclerParams::orientation`].
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Sets [`RecyclerParams::scroll`].
    #[must_use]
    pub fn with_scroll(mut self, scroll: ScrollParams) -> Self {
        self.scroll = scroll;
        self
    }

    /// Checks that every value is inside its domain.
    pub fn validate(&self) -> Result<(), RecyclerError> {
        if !(self.default_item_size.is_finite() && self.default_item_size > 0.0) {
            return Err(RecyclerError::InvalidDefaultSize(self.default_item_size));
        }
        check("spacing", self.spacing, |v| v >= 0.0)?;
        check("padding_start", self.padding_start, |v| v >= 0.0)?;
        check("padding_end", self.padding_end, |v| v >= 0.0)?;
        if self.max_twin_pass_iterations == 0 {
            return Err(RecyclerError::InvalidConfig {
                what: "max_twin_pass_iterations",
                value: 0.0,
            });
        }
        self.scroll.validate()
    }
}

fn check(what: &'static str, value: f64, ok: impl Fn(f64) -> bool) -> Result<(), RecyclerError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(RecyclerError::InvalidConfig { what, value })
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;

    use super::{Orientation, RecyclerParams, ScrollParams};
    use crate::{ErrorKind, RecyclerError};

    #[test]
    fn defaults_are_valid() {
        assert!(RecyclerParams::default().validate().is_ok());
    }

    #[test]
    fn non_positive_default_size_is_a_configuration_error() {
        let err = RecyclerParams::default()
            .with_default_item_size(0.0)
            .validate()
            .unwrap_err();
        assert_eq!(err, RecyclerError::InvalidDefaultSize(0.0));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn scroll_params_reject_out_of_domain_values() {
        let scroll = ScrollParams {
            deceleration_rate: 1.0,
            ..ScrollParams::default()
        };
        assert!(scroll.validate().is_err());
        let scroll = ScrollParams {
            release_time: f64::NAN,
            ..ScrollParams::default()
        };
        assert!(scroll.validate().is_err());
    }

    #[test]
    fn orientation_projects_axis() {
        let v = Vec2::new(3.0, 7.0);
        assert_eq!(Orientation::Vertical.along(v), 7.0);
        assert_eq!(Orientation::Horizontal.along(v), 3.0);
        assert_eq!(Orientation::Horizontal.to_vec2(2.0), Vec2::new(2.0, 0.0));
    }
}
