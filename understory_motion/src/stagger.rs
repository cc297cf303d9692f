// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stagger coordinator: one gate on a container, offset tweens on its children.
//!
//! When the container becomes visible the group reads its children in
//! document order, writes the shared `from` style to all of them, and starts
//! child `i` at `delay + i * stagger`. Children added after that moment are
//! not part of the run.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::gate::{GateOptions, VisibilityGate, VisibilityObservation};
use crate::host::Host;
use crate::trigger::{TargetState, Track};
use crate::tween::{AnimationDescriptor, Tween};

/// Options for a [`StaggerGroup`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StaggerOptions {
    /// Shared recipe for every child.
    pub descriptor: AnimationDescriptor,
    /// Seconds between consecutive children's starts.
    pub stagger: f64,
    /// Gate on the container.
    pub gate: GateOptions,
}

impl Default for StaggerOptions {
    fn default() -> Self {
        Self {
            descriptor: AnimationDescriptor::rise(),
            stagger: 0.1,
            gate: GateOptions::default(),
        }
    }
}

/// A child captured when the group fired.
#[derive(Clone, Debug)]
pub struct GroupMember<T> {
    track: Track<T>,
}

impl<T> GroupMember<T> {
    /// The child.
    pub fn target(&self) -> &T {
        &self.track.target
    }

    /// Host time at which this child starts moving.
    pub fn start(&self) -> f64 {
        self.track.tween.start
    }

    /// The child's lifecycle state.
    pub fn state(&self) -> TargetState {
        self.track.state
    }
}

/// Runs a shared descriptor over a container's children with per-child offsets.
#[derive(Clone, Debug)]
pub struct StaggerGroup<T> {
    container: T,
    options: StaggerOptions,
    gate: VisibilityGate,
    members: Vec<GroupMember<T>>,
    fired: bool,
    replay: bool,
}

impl<T: Clone + PartialEq + Debug + 'static> StaggerGroup<T> {
    /// Create an idle group on `container`.
    pub fn new(container: T, options: StaggerOptions) -> Self {
        let stagger = if options.stagger.is_nan() {
            0.0
        } else {
            options.stagger.max(0.0)
        };
        Self {
            container,
            options: StaggerOptions { stagger, ..options },
            gate: VisibilityGate::new(options.gate),
            members: Vec::new(),
            fired: false,
            replay: false,
        }
    }

    /// The observed container.
    pub fn container(&self) -> &T {
        &self.container
    }

    /// The container's gate.
    pub fn gate(&self) -> &VisibilityGate {
        &self.gate
    }

    /// Children captured by the latest run, in document order.
    pub fn members(&self) -> &[GroupMember<T>] {
        &self.members
    }

    /// Aggregate state: `Idle` before firing, then the least advanced child.
    ///
    /// A container with no children settles the moment it fires.
    pub fn state(&self) -> TargetState {
        if !self.fired {
            return TargetState::Idle;
        }
        let states = self.members.iter().map(GroupMember::state);
        if states.clone().any(|s| s == TargetState::Armed) {
            TargetState::Armed
        } else if states.clone().any(|s| s == TargetState::Playing) {
            TargetState::Playing
        } else {
            TargetState::Settled
        }
    }

    /// Feed the container's intersection ratio observed at host time `now`.
    pub fn observe<H>(&mut self, ratio: f64, now: f64, host: &H) -> Option<VisibilityObservation>
    where
        H: Host<Target = T> + ?Sized,
    {
        let obs = self.gate.sample(ratio)?;
        if !obs.is_visible {
            self.replay = false;
        } else if self.state().is_busy() {
            self.replay = true;
        } else {
            self.arm(now, host);
        }
        Some(obs)
    }

    /// Step every child to host time `now`; returns whether any is still busy.
    pub fn advance<H>(&mut self, now: f64, host: &H) -> bool
    where
        H: Host<Target = T> + ?Sized,
    {
        let mut busy = false;
        for m in &mut self.members {
            busy |= m.track.advance(now, &self.options.descriptor, host);
        }
        if !busy && core::mem::take(&mut self.replay) {
            self.arm(now, host);
            return self.state().is_busy();
        }
        busy
    }

    fn arm<H>(&mut self, now: f64, host: &H)
    where
        H: Host<Target = T> + ?Sized,
    {
        let d = &self.options.descriptor;
        let step = self.options.stagger;
        self.members = host
            .children(&self.container)
            .into_iter()
            .enumerate()
            .map(|(i, child)| {
                let tween = Tween::schedule_with_offset(now, d, i as f64 * step);
                GroupMember {
                    track: Track::arm(child, tween, d, host),
                }
            })
            .collect();
        self.fired = true;
        tracing::debug!(
            container = ?self.container,
            children = self.members.len(),
            stagger = step,
            "stagger group armed"
        );
    }
}
