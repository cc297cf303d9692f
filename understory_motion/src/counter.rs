// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Counter interpolator: count a number up from zero once it scrolls into view.

use crate::easing::Easing;
use crate::gate::{GateOptions, VisibilityGate, VisibilityObservation};
use crate::host::Host;
use crate::trigger::TargetState;
use crate::tween::{Tween, TweenPhase};

/// Timing and gating for a [`CounterInterpolator`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CounterOptions {
    /// Seconds to count from zero to the end value.
    pub duration: f64,
    /// Seconds to wait after the gate fires.
    pub delay: f64,
    /// Timing curve.
    pub easing: Easing,
    /// Visibility threshold. Counters always fire once.
    pub threshold: f64,
}

impl Default for CounterOptions {
    fn default() -> Self {
        Self {
            duration: 2.0,
            delay: 0.0,
            easing: Easing::default(),
            threshold: 0.3,
        }
    }
}

/// Writes a rounded, eased count from `0` to `end` into a target.
#[derive(Clone, Debug)]
pub struct CounterInterpolator<T> {
    target: T,
    end: i64,
    options: CounterOptions,
    gate: VisibilityGate,
    tween: Option<Tween>,
    state: TargetState,
    last: Option<i64>,
}

impl<T: Clone + PartialEq + core::fmt::Debug + 'static> CounterInterpolator<T> {
    /// Create an idle counter.
    pub fn new(target: T, end: i64, options: CounterOptions) -> Self {
        Self {
            target,
            end,
            options,
            gate: VisibilityGate::new(GateOptions::new(options.threshold, true)),
            tween: None,
            state: TargetState::Idle,
            last: None,
        }
    }

    /// The target receiving counts.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// The value the count ends on.
    pub fn end(&self) -> i64 {
        self.end
    }

    /// The counter's gate.
    pub fn gate(&self) -> &VisibilityGate {
        &self.gate
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TargetState {
        self.state
    }

    /// The last value written, if any.
    pub fn value(&self) -> Option<i64> {
        self.last
    }

    /// Feed the target's intersection ratio observed at host time `now`.
    pub fn observe<H>(&mut self, ratio: f64, now: f64, _host: &H) -> Option<VisibilityObservation>
    where
        H: Host<Target = T> + ?Sized,
    {
        let obs = self.gate.sample(ratio)?;
        if obs.is_visible && self.state == TargetState::Idle {
            self.tween = Some(Tween {
                start: now + self.options.delay.max(0.0),
                duration: if self.options.duration.is_nan() {
                    0.0
                } else {
                    self.options.duration
                },
                easing: self.options.easing,
            });
            self.state = TargetState::Armed;
            tracing::debug!(element = ?self.target, end = self.end, "counter armed");
        }
        Some(obs)
    }

    /// Step to host time `now`; returns whether the counter still needs frames.
    pub fn advance<H>(&mut self, now: f64, host: &H) -> bool
    where
        H: Host<Target = T> + ?Sized,
    {
        let Some(tween) = self.tween else {
            return false;
        };
        match tween.phase(now) {
            TweenPhase::Waiting => true,
            TweenPhase::Running(t) => {
                self.state = TargetState::Playing;
                let value = round_half_up(self.end as f64 * t);
                self.write(value, host);
                true
            }
            TweenPhase::Done => {
                self.write(self.end, host);
                self.state = TargetState::Settled;
                self.tween = None;
                false
            }
        }
    }

    fn write<H>(&mut self, value: i64, host: &H)
    where
        H: Host<Target = T> + ?Sized,
    {
        host.write_count(&self.target, value);
        self.last = Some(value);
    }
}

/// Round to the nearest integer, with halves going toward positive infinity.
///
/// ```
/// use understory_motion::counter::round_half_up;
///
/// assert_eq!(round_half_up(2.5), 3);
/// assert_eq!(round_half_up(-2.5), -2);
/// assert_eq!(round_half_up(124.49), 124);
/// ```
pub fn round_half_up(x: f64) -> i64 {
    let shifted = x + 0.5;
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Float-to-int casts saturate, which is the clamp we want."
    )]
    let truncated = shifted as i64;
    // Truncation rounds toward zero; step down for negative non-integers.
    if (truncated as f64) > shifted {
        truncated - 1
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{ElementId, ElementSpec, Stage};
    use kurbo::{Rect, Size};

    fn stage_with_counter() -> (Stage, ElementId) {
        let stage = Stage::new(Size::new(100.0, 100.0));
        let id = stage.insert(
            None,
            ElementSpec::new("span").bounds(Rect::new(0.0, 0.0, 20.0, 10.0)),
        );
        (stage, id)
    }

    #[test]
    fn counts_up_monotonically_and_lands_on_end() {
        let (stage, id) = stage_with_counter();
        let mut c = CounterInterpolator::new(id, 250, CounterOptions::default());
        c.observe(1.0, 0.0, &stage);
        let mut now = 0.0;
        let mut seen = alloc::vec::Vec::new();
        while c.advance(now, &stage) {
            if let Some(v) = stage.count(id) {
                seen.push(v);
            }
            now += 1.0 / 60.0;
        }
        assert_eq!(stage.count(id), Some(250), "final write is exact");
        assert_eq!(c.value(), Some(250));
        assert_eq!(c.state(), TargetState::Settled);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "counts never go back");
        assert!(seen.iter().all(|v| (0..=250).contains(v)));
    }

    #[test]
    fn threshold_defaults_to_thirty_percent() {
        let (stage, id) = stage_with_counter();
        let mut c = CounterInterpolator::new(id, 10, CounterOptions::default());
        assert!(c.observe(0.25, 0.0, &stage).is_none());
        assert_eq!(c.state(), TargetState::Idle);
        c.observe(0.3, 0.0, &stage);
        assert_eq!(c.state(), TargetState::Armed);
    }

    #[test]
    fn nothing_is_written_before_the_delay() {
        let (stage, id) = stage_with_counter();
        let opts = CounterOptions {
            delay: 1.0,
            ..CounterOptions::default()
        };
        let mut c = CounterInterpolator::new(id, 10, opts);
        c.observe(1.0, 0.0, &stage);
        assert!(c.advance(0.5, &stage));
        assert_eq!(stage.count(id), None);
        assert_eq!(c.value(), None);
    }

    #[test]
    fn fires_once_even_after_leaving_and_returning() {
        let (stage, id) = stage_with_counter();
        let mut c = CounterInterpolator::new(id, 5, CounterOptions::default());
        c.observe(1.0, 0.0, &stage);
        while c.advance(10.0, &stage) {}
        c.observe(0.0, 11.0, &stage);
        c.observe(1.0, 12.0, &stage);
        assert!(!c.advance(12.5, &stage));
        assert_eq!(c.state(), TargetState::Settled);
    }

    #[test]
    fn nan_duration_lands_on_end_immediately() {
        let (stage, id) = stage_with_counter();
        let opts = CounterOptions {
            duration: f64::NAN,
            ..CounterOptions::default()
        };
        let mut c = CounterInterpolator::new(id, 7, opts);
        c.observe(1.0, 0.0, &stage);
        assert!(!c.advance(0.0, &stage), "settles on the first frame");
        assert_eq!(stage.count(id), Some(7));
        assert_eq!(c.state(), TargetState::Settled);
    }

    #[test]
    fn negative_end_values_count_down() {
        let (stage, id) = stage_with_counter();
        let mut c = CounterInterpolator::new(id, -40, CounterOptions::default());
        c.observe(1.0, 0.0, &stage);
        assert!(c.advance(1.0, &stage));
        let mid = stage.count(id).unwrap_or_default();
        assert!((-40..=0).contains(&mid));
        while c.advance(5.0, &stage) {}
        assert_eq!(stage.count(id), Some(-40));
    }

    #[test]
    fn rounding_goes_half_up() {
        assert_eq!(round_half_up(0.0), 0);
        assert_eq!(round_half_up(0.5), 1);
        assert_eq!(round_half_up(1.4999), 1);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(-0.51), -1);
        assert_eq!(round_half_up(-3.2), -3);
    }
}
