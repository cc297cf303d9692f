// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mount scope: the acquisition and release boundary for one view.
//!
//! ## Overview
//!
//! A [`Scope`] binds triggers, stagger groups, counters, and parallax drivers
//! to a [`Host`] and owns every registration they need. Everything it
//! acquired is released exactly once, on [`Scope::unmount`] or on drop, so a
//! view that mounts and immediately unmounts leaves no watcher, listener, or
//! frame request behind.
//!
//! ## Frames
//!
//! The scope asks the host for frames only while at least one target is
//! `Armed` or `Playing`, and lets the request lapse once everything settles.
//! When a one-shot gate fires, its host watcher is released on the following
//! frame rather than from inside the host's visibility callback.
//!
//! ## Minimal example
//!
//! ```
//! use std::rc::Rc;
//! use kurbo::{Rect, Size};
//! use understory_motion::gate::GateOptions;
//! use understory_motion::scope::Scope;
//! use understory_motion::stage::{ElementSpec, Stage};
//! use understory_motion::trigger::TargetState;
//! use understory_motion::tween::AnimationDescriptor;
//!
//! let stage = Rc::new(Stage::new(Size::new(800.0, 600.0)));
//! let card = stage.insert(None, ElementSpec::new("div").bounds(Rect::new(0.0, 900.0, 800.0, 1100.0)));
//!
//! let mut scope = Scope::mount(Rc::clone(&stage));
//! let id = scope.arm(card, AnimationDescriptor::fade_up(), GateOptions::default());
//! stage.refresh();
//! assert_eq!(scope.state(id), Some(TargetState::Idle));
//!
//! stage.scroll_to(500.0);
//! assert_eq!(scope.state(id), Some(TargetState::Armed));
//! for _ in 0..60 {
//!     stage.advance(1.0 / 60.0);
//! }
//! assert_eq!(scope.state(id), Some(TargetState::Settled));
//! assert!(!scope.is_animating());
//!
//! scope.unmount();
//! assert_eq!(stage.active_watchers(), 0);
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::counter::{CounterInterpolator, CounterOptions};
use crate::gate::{GateOptions, VisibilityObservation};
use crate::host::{Disposer, Host};
use crate::parallax::ParallaxDriver;
use crate::stagger::{StaggerGroup, StaggerOptions};
use crate::trigger::{AnimationTrigger, TargetState};
use crate::tween::AnimationDescriptor;

/// Handle to something armed in a [`Scope`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u32);

impl BindingId {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
enum Binding<T> {
    Trigger(AnimationTrigger<T>),
    Group(StaggerGroup<T>),
    Counter(CounterInterpolator<T>),
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Binding<T> {
    fn observe<H>(&mut self, ratio: f64, now: f64, host: &H) -> Option<VisibilityObservation>
    where
        H: Host<Target = T> + ?Sized,
    {
        match self {
            Self::Trigger(t) => t.observe(ratio, now, host),
            Self::Group(g) => g.observe(ratio, now, host),
            Self::Counter(c) => c.observe(ratio, now, host),
        }
    }

    fn advance<H>(&mut self, now: f64, host: &H) -> bool
    where
        H: Host<Target = T> + ?Sized,
    {
        match self {
            Self::Trigger(t) => t.advance(now, host),
            Self::Group(g) => g.advance(now, host),
            Self::Counter(c) => c.advance(now, host),
        }
    }

    fn state(&self) -> TargetState {
        match self {
            Self::Trigger(t) => t.state(),
            Self::Group(g) => g.state(),
            Self::Counter(c) => c.state(),
        }
    }

    fn is_connected(&self) -> bool {
        match self {
            Self::Trigger(t) => t.gate().is_connected(),
            Self::Group(g) => g.gate().is_connected(),
            Self::Counter(c) => c.gate().is_connected(),
        }
    }
}

struct Shared<H: Host> {
    host: Rc<H>,
    bindings: RefCell<Vec<Binding<H::Target>>>,
    watchers: RefCell<Vec<Option<Disposer>>>,
    retired: RefCell<Vec<BindingId>>,
    frames: RefCell<Option<Disposer>>,
    frames_running: Cell<bool>,
    released: Cell<bool>,
}

impl<H: Host + 'static> Shared<H> {
    fn on_ratio(self: &Rc<Self>, id: BindingId, ratio: f64) {
        if self.released.get() {
            return;
        }
        let now = self.host.now();
        let (fired, connected, busy) = {
            let mut bindings = self.bindings.borrow_mut();
            let Some(binding) = bindings.get_mut(id.idx()) else {
                return;
            };
            let fired = binding.observe(ratio, now, &*self.host);
            (fired, binding.is_connected(), binding.state().is_busy())
        };
        let Some(obs) = fired else {
            return;
        };
        tracing::trace!(?id, ratio, visible = obs.is_visible, "visibility edge");
        let retire = !connected;
        if retire {
            self.retired.borrow_mut().push(id);
        }
        if busy || retire {
            self.ensure_frames();
        }
    }

    fn ensure_frames(self: &Rc<Self>) {
        if self.frames_running.get() || self.released.get() {
            return;
        }
        self.frames_running.set(true);
        let weak = Rc::downgrade(self);
        let frames = self.host.request_frames(Box::new(move |now| {
            let Some(shared) = weak.upgrade() else {
                return false;
            };
            let busy = shared.on_frame(now);
            if !busy {
                shared.frames_running.set(false);
            }
            busy
        }));
        // The previous request, if any, has already lapsed.
        let previous = self.frames.borrow_mut().replace(frames);
        drop(previous);
    }

    fn on_frame(&self, now: f64) -> bool {
        self.retire_watchers();
        let mut busy = false;
        for binding in self.bindings.borrow_mut().iter_mut() {
            busy |= binding.advance(now, &*self.host);
        }
        busy
    }

    fn retire_watchers(&self) {
        let retired: Vec<BindingId> = self.retired.borrow_mut().drain(..).collect();
        for id in retired {
            let watcher = self
                .watchers
                .borrow_mut()
                .get_mut(id.idx())
                .and_then(Option::take);
            if let Some(w) = watcher {
                tracing::trace!(?id, "one-shot watcher retired");
                w.dispose();
            }
        }
    }
}

/// Owns the bindings and host registrations of one mounted view.
pub struct Scope<H: Host + 'static> {
    shared: Rc<Shared<H>>,
    listeners: Vec<Disposer>,
}

impl<H: Host + 'static> fmt::Debug for Scope<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("bindings", &self.shared.bindings.borrow().len())
            .field("scroll_listeners", &self.listeners.len())
            .field("frames_running", &self.shared.frames_running.get())
            .field("released", &self.shared.released.get())
            .finish_non_exhaustive()
    }
}

impl<H: Host + 'static> Scope<H> {
    /// Open a scope on `host`. Nothing is registered until something is armed.
    pub fn mount(host: Rc<H>) -> Self {
        Self {
            shared: Rc::new(Shared {
                host,
                bindings: RefCell::new(Vec::new()),
                watchers: RefCell::new(Vec::new()),
                retired: RefCell::new(Vec::new()),
                frames: RefCell::new(None),
                frames_running: Cell::new(false),
                released: Cell::new(false),
            }),
            listeners: Vec::new(),
        }
    }

    /// The host this scope is bound to.
    pub fn host(&self) -> &Rc<H> {
        &self.shared.host
    }

    /// Play `descriptor` on `target` when it becomes visible.
    pub fn arm(
        &mut self,
        target: H::Target,
        descriptor: AnimationDescriptor,
        gate: GateOptions,
    ) -> BindingId {
        let trigger = AnimationTrigger::new(target.clone(), descriptor, gate);
        let threshold = trigger.gate().options().threshold;
        self.bind(&target, threshold, Binding::Trigger(trigger))
    }

    /// Stagger `options.descriptor` over `container`'s children when the
    /// container becomes visible.
    pub fn arm_group(&mut self, container: H::Target, options: StaggerOptions) -> BindingId {
        let group = StaggerGroup::new(container.clone(), options);
        let threshold = group.gate().options().threshold;
        self.bind(&container, threshold, Binding::Group(group))
    }

    /// Count `target` up to `end` when it becomes visible.
    pub fn arm_counter(&mut self, target: H::Target, end: i64, options: CounterOptions) -> BindingId {
        let counter = CounterInterpolator::new(target.clone(), end, options);
        let threshold = counter.gate().options().threshold;
        self.bind(&target, threshold, Binding::Counter(counter))
    }

    /// Translate `target` by `offset * speed` on every scroll reading.
    pub fn bind_parallax(&mut self, target: H::Target, speed: f64) {
        if self.shared.released.get() {
            return;
        }
        tracing::debug!(element = ?target, speed, "parallax bound");
        let mut driver = ParallaxDriver::new(target, speed);
        let host = Rc::downgrade(&self.shared.host);
        let listener = self.shared.host.on_scroll(Box::new(move |offset| {
            if let Some(host) = host.upgrade() {
                driver.on_scroll(offset, &*host);
            }
        }));
        self.listeners.push(listener);
    }

    fn bind(&mut self, target: &H::Target, threshold: f64, binding: Binding<H::Target>) -> BindingId {
        let shared = &self.shared;
        let id = {
            let mut bindings = shared.bindings.borrow_mut();
            #[allow(
                clippy::cast_possible_truncation,
                reason = "BindingId uses 32-bit indices by design."
            )]
            let id = BindingId(bindings.len() as u32);
            bindings.push(binding);
            id
        };
        shared.watchers.borrow_mut().push(None);
        if shared.released.get() {
            return id;
        }
        let weak = Rc::downgrade(shared);
        let watcher = shared.host.observe_visibility(
            target,
            threshold,
            Box::new(move |ratio| {
                if let Some(shared) = weak.upgrade() {
                    shared.on_ratio(id, ratio);
                }
            }),
        );
        if let Some(slot) = shared.watchers.borrow_mut().get_mut(id.idx()) {
            *slot = Some(watcher);
        }
        id
    }

    /// Lifecycle state of a binding.
    pub fn state(&self, id: BindingId) -> Option<TargetState> {
        self.shared
            .bindings
            .borrow()
            .get(id.idx())
            .map(Binding::state)
    }

    /// Number of bindings armed so far.
    pub fn len(&self) -> usize {
        self.shared.bindings.borrow().len()
    }

    /// Whether nothing has been armed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any binding is `Armed` or `Playing`.
    pub fn is_animating(&self) -> bool {
        self.shared
            .bindings
            .borrow()
            .iter()
            .any(|b| b.state().is_busy())
    }

    /// Release every registration and cancel in-flight animations.
    pub fn unmount(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let shared = &self.shared;
        if shared.released.replace(true) {
            return;
        }
        let frames = shared.frames.borrow_mut().take();
        drop(frames);
        shared.frames_running.set(false);
        shared.retired.borrow_mut().clear();
        let watchers = core::mem::take(&mut *shared.watchers.borrow_mut());
        drop(watchers);
        for listener in self.listeners.drain(..) {
            listener.dispose();
        }
        let bindings = core::mem::take(&mut *shared.bindings.borrow_mut());
        tracing::debug!(bindings = bindings.len(), "scope released");
    }
}

impl<H: Host + 'static> Drop for Scope<H> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::CounterOptions;
    use crate::stage::{ElementId, ElementSpec, Stage};
    use kurbo::{Rect, Size};

    const FRAME: f64 = 1.0 / 60.0;

    fn stage() -> Rc<Stage> {
        Rc::new(Stage::new(Size::new(400.0, 300.0)))
    }

    fn block(stage: &Stage, top: f64) -> ElementId {
        stage.insert(
            None,
            ElementSpec::new("section").bounds(Rect::new(0.0, top, 400.0, top + 100.0)),
        )
    }

    fn run(stage: &Stage, seconds: f64) {
        let mut elapsed = 0.0;
        while elapsed < seconds {
            stage.advance(FRAME);
            elapsed += FRAME;
        }
    }

    #[test]
    fn mount_then_unmount_leaves_nothing_behind() {
        for n in [0_usize, 1, 3, 4, 12] {
            let stage = stage();
            let mut scope = Scope::mount(Rc::clone(&stage));
            for i in 0..n {
                let top = i as f64 * 150.0;
                let id = block(&stage, top);
                match i % 4 {
                    0 => {
                        scope.arm(id, AnimationDescriptor::fade_up(), GateOptions::default());
                    }
                    1 => {
                        scope.arm_counter(id, 100, CounterOptions::default());
                    }
                    2 => {
                        stage.insert(
                            Some(id),
                            ElementSpec::new("li").bounds(Rect::new(0.0, top, 400.0, top + 20.0)),
                        );
                        let options = StaggerOptions {
                            gate: GateOptions::new(0.1, false),
                            ..StaggerOptions::default()
                        };
                        scope.arm_group(id, options);
                    }
                    _ => scope.bind_parallax(id, 0.3),
                }
            }
            stage.refresh();
            scope.unmount();
            assert_eq!(stage.active_watchers(), 0, "n = {n}");
            assert_eq!(stage.active_scroll_listeners(), 0, "n = {n}");
            assert_eq!(stage.active_frame_requests(), 0, "n = {n}");
        }
    }

    #[test]
    fn frames_lapse_once_everything_settles() {
        let stage = stage();
        let mut scope = Scope::mount(Rc::clone(&stage));
        let a = block(&stage, 0.0);
        let id = scope.arm(a, AnimationDescriptor::fade_up(), GateOptions::default());
        assert_eq!(stage.active_frame_requests(), 0);
        stage.refresh();
        assert_eq!(stage.active_frame_requests(), 1);
        assert!(scope.is_animating());
        run(&stage, 1.0);
        assert_eq!(scope.state(id), Some(TargetState::Settled));
        assert_eq!(stage.active_frame_requests(), 0);
        assert_eq!(stage.style(a).opacity, Some(1.0));
    }

    #[test]
    fn one_shot_watchers_retire_after_firing() {
        let stage = stage();
        let mut scope = Scope::mount(Rc::clone(&stage));
        let a = block(&stage, 0.0);
        let far = block(&stage, 2000.0);
        scope.arm(a, AnimationDescriptor::fade_up(), GateOptions::default());
        scope.arm(far, AnimationDescriptor::fade_up(), GateOptions::default());
        scope.arm(a, AnimationDescriptor::fade_up(), GateOptions::new(0.1, false));
        assert_eq!(stage.active_watchers(), 3);
        stage.refresh();
        stage.advance(FRAME);
        // The fired one-shot is gone; the far one and the repeatable stay.
        assert_eq!(stage.active_watchers(), 2);
    }

    #[test]
    fn parallax_writes_on_scroll_until_unmount() {
        let stage = stage();
        let mut scope = Scope::mount(Rc::clone(&stage));
        let bg = block(&stage, 0.0);
        scope.bind_parallax(bg, 0.5);
        let mut ys = Vec::new();
        for offset in [0.0, 100.0, 250.0] {
            stage.scroll_to(offset);
            ys.push(stage.style(bg).y);
        }
        assert_eq!(ys, [Some(0.0), Some(50.0), Some(125.0)]);
        drop(scope);
        stage.scroll_to(400.0);
        assert_eq!(stage.style(bg).y, Some(125.0));
        assert_eq!(stage.active_scroll_listeners(), 0);
    }

    #[test]
    fn counter_lands_on_exact_value() {
        let stage = stage();
        let mut scope = Scope::mount(Rc::clone(&stage));
        let n = block(&stage, 500.0);
        let id = scope.arm_counter(n, 250, CounterOptions::default());
        stage.refresh();
        assert_eq!(scope.state(id), Some(TargetState::Idle));
        stage.scroll_to(400.0);
        run(&stage, 2.5);
        assert_eq!(stage.count(n), Some(250));
        assert_eq!(scope.state(id), Some(TargetState::Settled));
    }

    #[test]
    fn unmount_mid_flight_cancels_writes() {
        let stage = stage();
        let mut scope = Scope::mount(Rc::clone(&stage));
        let a = block(&stage, 0.0);
        scope.arm(a, AnimationDescriptor::fade_up(), GateOptions::default());
        stage.refresh();
        stage.advance(0.1);
        let frozen = stage.style(a);
        scope.unmount();
        run(&stage, 1.0);
        assert_eq!(stage.style(a), frozen);
        assert_eq!(stage.active_frame_requests(), 0);
    }

    #[test]
    fn staggered_children_settle_in_order() {
        let stage = stage();
        let mut scope = Scope::mount(Rc::clone(&stage));
        let list = block(&stage, 0.0);
        let items: Vec<_> = (0..4)
            .map(|i| {
                let top = i as f64 * 20.0;
                stage.insert(
                    Some(list),
                    ElementSpec::new("li").bounds(Rect::new(0.0, top, 400.0, top + 20.0)),
                )
            })
            .collect();
        let id = scope.arm_group(list, StaggerOptions::default());
        stage.refresh();
        stage.advance(0.65);
        assert_eq!(stage.style(items[0]).y, Some(0.0), "first child done");
        assert_ne!(stage.style(items[3]).y, Some(0.0), "last child still moving");
        run(&stage, 1.0);
        assert_eq!(scope.state(id), Some(TargetState::Settled));
        assert!(items.iter().all(|c| stage.style(*c).opacity == Some(1.0)));
    }

    #[test]
    fn repeatable_group_rearms_on_every_return() {
        let stage = stage();
        let mut scope = Scope::mount(Rc::clone(&stage));
        let list = block(&stage, 0.0);
        let item = stage.insert(
            Some(list),
            ElementSpec::new("li").bounds(Rect::new(0.0, 0.0, 400.0, 20.0)),
        );
        let options = StaggerOptions {
            gate: GateOptions::new(0.1, false),
            ..StaggerOptions::default()
        };
        let id = scope.arm_group(list, options);
        stage.refresh();
        run(&stage, 1.0);
        assert_eq!(scope.state(id), Some(TargetState::Settled));
        assert_eq!(stage.active_frame_requests(), 0);
        stage.scroll_to(1000.0);
        stage.scroll_to(0.0);
        assert!(scope.is_animating());
        assert_eq!(stage.style(item).y, Some(30.0));
        run(&stage, 1.0);
        assert_eq!(scope.state(id), Some(TargetState::Settled));
        assert_eq!(stage.style(item).y, Some(0.0));
        assert_eq!(stage.active_watchers(), 1, "repeatable watcher stays");
    }

    #[test]
    fn target_that_never_mounts_stays_pending() {
        let stage = stage();
        let mut scope = Scope::mount(Rc::clone(&stage));
        let ghost = stage.insert(None, ElementSpec::new("div"));
        let id = scope.arm(ghost, AnimationDescriptor::fade_up(), GateOptions::default());
        stage.refresh();
        run(&stage, 1.0);
        assert_eq!(scope.state(id), Some(TargetState::Idle));
        assert_eq!(stage.active_frame_requests(), 0);
    }
}
