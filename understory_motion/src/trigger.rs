// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation trigger: play a descriptor on one target when it becomes visible.
//!
//! ## Lifecycle
//!
//! A trigger owns a [`VisibilityGate`] and walks its target through
//! [`TargetState`]:
//!
//! - `Idle`: nothing has been written yet.
//! - `Armed`: the gate reported visible. The descriptor's `from` style has been
//!   written and the tween is waiting out its delay.
//! - `Playing`: interpolated styles are being written each frame.
//! - `Settled`: the `to` style has been written exactly.
//!
//! With `trigger_once` the gate disconnects after the first visible edge, so a
//! target passes through `Playing` at most once. Repeatable triggers re-arm
//! from `Settled` on the next visible edge. A visible edge that arrives while
//! the tween is still in flight is latched and replays once the tween settles,
//! unless an invisible edge clears the latch first.
//!
//! ## Minimal example
//!
//! ```
//! use std::rc::Rc;
//! use kurbo::{Rect, Size};
//! use understory_motion::gate::GateOptions;
//! use understory_motion::stage::{ElementSpec, Stage};
//! use understory_motion::trigger::{AnimationTrigger, TargetState};
//! use understory_motion::tween::AnimationDescriptor;
//!
//! let stage = Rc::new(Stage::new(Size::new(800.0, 600.0)));
//! let hero = stage.insert(None, ElementSpec::new("section").bounds(Rect::new(0.0, 0.0, 800.0, 400.0)));
//!
//! let mut trigger = AnimationTrigger::new(hero, AnimationDescriptor::fade_up(), GateOptions::default());
//! trigger.observe(1.0, 0.0, &*stage);
//! assert_eq!(trigger.state(), TargetState::Armed);
//! assert_eq!(stage.style(hero).opacity, Some(0.0));
//!
//! while trigger.advance(1.0, &*stage) {}
//! assert_eq!(trigger.state(), TargetState::Settled);
//! assert_eq!(stage.style(hero).opacity, Some(1.0));
//! ```

use crate::gate::{GateOptions, VisibilityGate, VisibilityObservation};
use crate::host::Host;
use crate::tween::{AnimationDescriptor, Tween, TweenPhase};

/// Where a target is in its entrance animation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TargetState {
    /// Not yet triggered.
    #[default]
    Idle,
    /// Initial style written; waiting for the delay to elapse.
    Armed,
    /// Interpolating.
    Playing,
    /// Final style written.
    Settled,
}

impl TargetState {
    /// Whether a tween is scheduled or running.
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Armed | Self::Playing)
    }
}

/// One target's scheduled tween and the state it has reached.
#[derive(Clone, Debug)]
pub(crate) struct Track<T> {
    pub(crate) target: T,
    pub(crate) tween: Tween,
    pub(crate) state: TargetState,
}

impl<T: Clone + PartialEq + core::fmt::Debug + 'static> Track<T> {
    /// Write the initial style and schedule the tween.
    pub(crate) fn arm<H>(target: T, tween: Tween, d: &AnimationDescriptor, host: &H) -> Self
    where
        H: Host<Target = T> + ?Sized,
    {
        host.apply_style(&target, &d.from);
        Self {
            target,
            tween,
            state: TargetState::Armed,
        }
    }

    /// Step the tween to `now`, writing styles; returns whether it is still busy.
    pub(crate) fn advance<H>(&mut self, now: f64, d: &AnimationDescriptor, host: &H) -> bool
    where
        H: Host<Target = T> + ?Sized,
    {
        if !self.state.is_busy() {
            return false;
        }
        match self.tween.phase(now) {
            TweenPhase::Waiting => true,
            TweenPhase::Running(t) => {
                self.state = TargetState::Playing;
                host.apply_style(&self.target, &d.sample(t));
                true
            }
            TweenPhase::Done => {
                host.apply_style(&self.target, &d.sample(1.0));
                self.state = TargetState::Settled;
                false
            }
        }
    }
}

/// Plays an [`AnimationDescriptor`] on a single target once it becomes visible.
#[derive(Clone, Debug)]
pub struct AnimationTrigger<T> {
    target: T,
    descriptor: AnimationDescriptor,
    gate: VisibilityGate,
    track: Option<Track<T>>,
    replay: bool,
}

impl<T: Clone + PartialEq + core::fmt::Debug + 'static> AnimationTrigger<T> {
    /// Create an idle trigger.
    pub fn new(target: T, descriptor: AnimationDescriptor, gate: GateOptions) -> Self {
        Self {
            target,
            descriptor,
            gate: VisibilityGate::new(gate),
            track: None,
            replay: false,
        }
    }

    /// The animated target.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// The descriptor this trigger plays.
    pub fn descriptor(&self) -> &AnimationDescriptor {
        &self.descriptor
    }

    /// The visibility gate.
    pub fn gate(&self) -> &VisibilityGate {
        &self.gate
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TargetState {
        self.track.as_ref().map_or(TargetState::Idle, |t| t.state)
    }

    /// Feed an intersection ratio observed at host time `now`.
    ///
    /// Arms the animation on a visible edge and returns the edge, if any.
    pub fn observe<H>(&mut self, ratio: f64, now: f64, host: &H) -> Option<VisibilityObservation>
    where
        H: Host<Target = T> + ?Sized,
    {
        let obs = self.gate.sample(ratio)?;
        if !obs.is_visible {
            self.replay = false;
        } else if self.state().is_busy() {
            tracing::trace!(element = ?self.target, "visible again mid-flight; replay latched");
            self.replay = true;
        } else {
            self.arm(now, host);
        }
        Some(obs)
    }

    /// Step to host time `now`; returns whether the trigger still needs frames.
    pub fn advance<H>(&mut self, now: f64, host: &H) -> bool
    where
        H: Host<Target = T> + ?Sized,
    {
        let Some(track) = self.track.as_mut() else {
            return false;
        };
        if track.advance(now, &self.descriptor, host) {
            return true;
        }
        if core::mem::take(&mut self.replay) {
            self.arm(now, host);
            return true;
        }
        false
    }

    fn arm<H>(&mut self, now: f64, host: &H)
    where
        H: Host<Target = T> + ?Sized,
    {
        tracing::debug!(
            element = ?self.target,
            delay = self.descriptor.delay,
            duration = self.descriptor.duration,
            "entrance armed"
        );
        let tween = Tween::schedule(now, &self.descriptor);
        self.track = Some(Track::arm(
            self.target.clone(),
            tween,
            &self.descriptor,
            host,
        ));
    }
}
