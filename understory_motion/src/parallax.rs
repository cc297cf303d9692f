// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parallax driver: translate a target vertically in proportion to scroll.
//!
//! ```
//! use understory_motion::parallax::{ScrollDirection, ScrollTracker};
//!
//! let mut t = ScrollTracker::new();
//! assert_eq!(t.sample(0.0).direction, ScrollDirection::Down);
//! assert_eq!(t.sample(120.0).delta, 120.0);
//! let up = t.sample(80.0);
//! assert_eq!(up.direction, ScrollDirection::Up);
//! assert_eq!(up.delta, -40.0);
//! ```

use crate::host::Host;
use crate::style::{Property, Style};

/// Which way the document last moved.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    /// Offset increased (or nothing has moved yet).
    #[default]
    Down,
    /// Offset decreased.
    Up,
}

/// One scroll reading with what changed since the previous one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScrollSample {
    /// Vertical document scroll offset in CSS pixels.
    pub offset: f64,
    /// Change since the previous reading; `0` for the first.
    pub delta: f64,
    /// Direction of the latest non-zero change.
    pub direction: ScrollDirection,
}

/// Derives deltas and direction from successive scroll offsets.
#[derive(Copy, Clone, Debug, Default)]
pub struct ScrollTracker {
    last: Option<f64>,
    direction: ScrollDirection,
}

impl ScrollTracker {
    /// A tracker with no readings yet.
    pub const fn new() -> Self {
        Self {
            last: None,
            direction: ScrollDirection::Down,
        }
    }

    /// Record a reading. Equal consecutive offsets keep the previous direction.
    pub fn sample(&mut self, offset: f64) -> ScrollSample {
        let delta = self.last.map_or(0.0, |last| offset - last);
        if delta > 0.0 {
            self.direction = ScrollDirection::Down;
        } else if delta < 0.0 {
            self.direction = ScrollDirection::Up;
        }
        self.last = Some(offset);
        ScrollSample {
            offset,
            delta,
            direction: self.direction,
        }
    }

    /// The most recent offset, if any.
    pub fn offset(&self) -> Option<f64> {
        self.last
    }
}

/// Writes `y = offset * speed` to one target on every scroll reading.
///
/// A speed below `1` makes the target trail the page; negative speeds move it
/// against the scroll. Only `y` is written, so entrance animations on other
/// properties of the same target are unaffected.
#[derive(Clone, Debug)]
pub struct ParallaxDriver<T> {
    target: T,
    speed: f64,
    tracker: ScrollTracker,
}

impl<T: Clone + PartialEq + core::fmt::Debug + 'static> ParallaxDriver<T> {
    /// Drive `target` at `speed` pixels per scrolled pixel.
    pub fn new(target: T, speed: f64) -> Self {
        Self {
            target,
            speed,
            tracker: ScrollTracker::new(),
        }
    }

    /// The driven target.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// The speed factor.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Translation for a given offset.
    pub fn translation(&self, offset: f64) -> f64 {
        offset * self.speed
    }

    /// Handle one scroll reading and write the translation.
    pub fn on_scroll<H>(&mut self, offset: f64, host: &H) -> ScrollSample
    where
        H: Host<Target = T> + ?Sized,
    {
        let sample = self.tracker.sample(offset);
        let y = self.translation(offset);
        tracing::trace!(element = ?self.target, offset, y, "parallax");
        host.apply_style(&self.target, &Style::new().with(Property::Y, y));
        sample
    }
}
