// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility gate: turn intersection ratios into edge-triggered observations.
//!
//! ## Usage
//!
//! 1) Feed every intersection ratio the host reports for a target into
//!    [`VisibilityGate::sample`].
//! 2) Act on the returned [`VisibilityObservation`], if any. Samples that do not
//!    cross the threshold produce nothing.
//! 3) Once a `trigger_once` gate has emitted its first visible observation it is
//!    [disconnected](VisibilityGate::is_connected): it ignores every later sample
//!    and the host watcher behind it can be released.
//!
//! ## Minimal example
//!
//! ```
//! use understory_motion::gate::{GateOptions, VisibilityGate};
//!
//! let mut gate = VisibilityGate::new(GateOptions::new(0.5, true));
//! assert!(gate.sample(0.2).is_none(), "below threshold, nothing crosses");
//! let obs = gate.sample(0.6).unwrap();
//! assert!(obs.is_visible && obs.has_fired_once);
//! assert!(!gate.is_connected());
//! assert!(gate.sample(0.0).is_none(), "one-shot gates go quiet");
//! ```

use kurbo::Rect;

/// Configuration for a [`VisibilityGate`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GateOptions {
    /// Fraction of the target's area that must intersect the viewport, in `[0, 1]`.
    ///
    /// `0.0` means "any overlap at all".
    pub threshold: f64,
    /// Stop observing after the first visible observation.
    pub trigger_once: bool,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            trigger_once: true,
        }
    }
}

impl GateOptions {
    /// Build options; `threshold` is clamped to `[0, 1]` (NaN becomes `0`).
    pub fn new(threshold: f64, trigger_once: bool) -> Self {
        let threshold = if threshold.is_nan() {
            0.0
        } else {
            threshold.clamp(0.0, 1.0)
        };
        Self {
            threshold,
            trigger_once,
        }
    }

    /// Whether `ratio` counts as visible under this threshold.
    pub fn is_visible(&self, ratio: f64) -> bool {
        if self.threshold <= 0.0 {
            ratio > 0.0
        } else {
            ratio >= self.threshold
        }
    }
}

/// One edge reported by a gate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VisibilityObservation {
    /// The side of the threshold the target is now on.
    pub is_visible: bool,
    /// Whether this gate has ever reported a visible edge (including this one).
    pub has_fired_once: bool,
}

/// Edge detector over intersection ratios for one target.
#[derive(Clone, Debug)]
pub struct VisibilityGate {
    options: GateOptions,
    visible: bool,
    fired: bool,
    connected: bool,
}

impl VisibilityGate {
    /// Create a gate. It starts out "not visible", so the first sample only
    /// emits when it is already above the threshold.
    pub fn new(options: GateOptions) -> Self {
        Self {
            options: GateOptions::new(options.threshold, options.trigger_once),
            visible: false,
            fired: false,
            connected: true,
        }
    }

    /// The (normalized) options this gate runs with.
    pub fn options(&self) -> GateOptions {
        self.options
    }

    /// Whether the gate still wants samples.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether the last accepted sample was visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether a visible edge has ever been reported.
    pub fn has_fired_once(&self) -> bool {
        self.fired
    }

    /// Feed one intersection ratio; returns an observation when it crosses the
    /// threshold.
    pub fn sample(&mut self, ratio: f64) -> Option<VisibilityObservation> {
        if !self.connected {
            return None;
        }
        let visible = self.options.is_visible(ratio);
        if visible == self.visible {
            return None;
        }
        self.visible = visible;
        if visible {
            self.fired = true;
            if self.options.trigger_once {
                self.connected = false;
                tracing::trace!(ratio, "one-shot gate fired; disconnecting");
            }
        }
        Some(VisibilityObservation {
            is_visible: visible,
            has_fired_once: self.fired,
        })
    }

    /// Stop accepting samples.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }
}

/// Fraction of `target`'s area inside `viewport`.
///
/// Zero-area targets count as fully visible when they lie within the viewport
/// (edges included) and invisible otherwise, which mirrors how browsers treat
/// empty elements.
pub fn intersection_ratio(target: Rect, viewport: Rect) -> f64 {
    let area = target.area();
    if area <= 0.0 {
        let inside = target.x0 >= viewport.x0
            && target.x1 <= viewport.x1
            && target.y0 >= viewport.y0
            && target.y1 <= viewport.y1;
        return if inside { 1.0 } else { 0.0 };
    }
    let overlap = target.intersect(viewport).area();
    (overlap / area).clamp(0.0, 1.0)
}
