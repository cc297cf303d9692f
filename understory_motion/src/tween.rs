// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation descriptors and scheduled tweens.
//!
//! An [`AnimationDescriptor`] is the caller's declarative recipe: from-state,
//! to-state, duration, delay, easing. When a trigger fires it turns the recipe
//! into a [`Tween`] anchored at the firing time; the tween is then sampled once
//! per frame with the host clock.
//!
//! ```
//! use understory_motion::tween::{AnimationDescriptor, Tween, TweenPhase};
//!
//! let d = AnimationDescriptor::fade_up().delay(0.5);
//! let tw = Tween::schedule(10.0, &d);
//! assert_eq!(tw.phase(10.2), TweenPhase::Waiting);
//! assert!(matches!(tw.phase(10.9), TweenPhase::Running(_)));
//! assert_eq!(tw.phase(11.4), TweenPhase::Done);
//! ```

use crate::easing::Easing;
use crate::style::{Property, Style};

/// Declarative animation recipe. Immutable once an animation starts.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnimationDescriptor {
    /// Properties applied the moment the animation arms.
    pub from: Style,
    /// Properties reached when the animation settles.
    pub to: Style,
    /// Seconds from start to settle.
    pub duration: f64,
    /// Seconds to wait after arming before moving.
    pub delay: f64,
    /// Timing curve.
    pub easing: Easing,
}

impl Default for AnimationDescriptor {
    fn default() -> Self {
        Self::fade_up()
    }
}

impl AnimationDescriptor {
    /// Build a descriptor with the default timing (0.8 s, no delay, `power2.out`).
    pub fn new(from: Style, to: Style) -> Self {
        Self {
            from,
            to,
            duration: 0.8,
            delay: 0.0,
            easing: Easing::default(),
        }
    }

    /// Fade in while rising 50 px into place.
    pub fn fade_up() -> Self {
        Self::new(
            Style::new()
                .with(Property::Opacity, 0.0)
                .with(Property::Y, 50.0),
            Style::new()
                .with(Property::Opacity, 1.0)
                .with(Property::Y, 0.0),
        )
    }

    /// The shorter rise used for staggered siblings: 30 px over 0.6 s.
    pub fn rise() -> Self {
        Self::new(
            Style::new()
                .with(Property::Opacity, 0.0)
                .with(Property::Y, 30.0),
            Style::new()
                .with(Property::Opacity, 1.0)
                .with(Property::Y, 0.0),
        )
        .duration(0.6)
    }

    /// Set the duration in seconds.
    #[must_use]
    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    /// Set the delay in seconds.
    #[must_use]
    pub fn delay(mut self, seconds: f64) -> Self {
        self.delay = seconds;
        self
    }

    /// Set the easing curve.
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Style at eased progress `t`.
    pub fn sample(&self, t: f64) -> Style {
        Style::lerp(&self.from, &self.to, t)
    }
}

/// Where a tween is relative to the clock.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TweenPhase {
    /// The delay has not elapsed yet.
    Waiting,
    /// In flight, carrying eased progress in `[0, 1)`.
    Running(f64),
    /// Reached the end.
    Done,
}

/// A scheduled span of time with a timing curve.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tween {
    /// Host time at which movement starts (arm time plus delay).
    pub start: f64,
    /// Length of the movement in seconds.
    pub duration: f64,
    /// Timing curve.
    pub easing: Easing,
}

impl Tween {
    /// Anchor a descriptor's timing at `armed_at`, with `extra_delay` added on top
    /// of the descriptor's own delay. A NaN duration is treated as `0`.
    pub fn schedule_with_offset(armed_at: f64, d: &AnimationDescriptor, extra_delay: f64) -> Self {
        let duration = if d.duration.is_nan() { 0.0 } else { d.duration };
        Self {
            start: armed_at + d.delay.max(0.0) + extra_delay.max(0.0),
            duration,
            easing: d.easing,
        }
    }

    /// Anchor a descriptor's timing at `armed_at`.
    pub fn schedule(armed_at: f64, d: &AnimationDescriptor) -> Self {
        Self::schedule_with_offset(armed_at, d, 0.0)
    }

    /// Sample the tween at host time `now`.
    ///
    /// Zero or negative durations jump straight to [`TweenPhase::Done`] once
    /// `now` reaches `start`.
    pub fn phase(&self, now: f64) -> TweenPhase {
        if now < self.start {
            return TweenPhase::Waiting;
        }
        if self.duration <= 0.0 {
            return TweenPhase::Done;
        }
        let raw = (now - self.start) / self.duration;
        if raw >= 1.0 {
            TweenPhase::Done
        } else {
            TweenPhase::Running(self.easing.evaluate(raw))
        }
    }
}
