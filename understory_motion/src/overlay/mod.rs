// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer overlay: a ring and dot that follow the pointer and react to what
//! it hovers.
//!
//! ## Usage
//!
//! 1) Mount an [`OverlayController`] against an [`OverlayHost`]. Mounting is
//!    refused on touch-primary devices and while another controller owns the
//!    host's [`OverlaySlot`](crate::host::OverlaySlot); a refused mount holds
//!    nothing and touches nothing.
//! 2) The host feeds [`PointerInput`] to the controller's listener. Moves
//!    reposition the overlay synchronously. Enter, leave, press, and release
//!    drive [`OverlayState`], whose [`scales`](OverlayState::scales) follow a
//!    fixed table.
//! 3) Dropping or [unmounting](OverlayMount::unmount) the controller releases
//!    the listener, restores the cursor, removes the overlay, and frees the
//!    slot, in that order.
//!
//! ## Minimal example
//!
//! ```
//! use std::rc::Rc;
//! use kurbo::{Point, Rect, Size};
//! use understory_motion::overlay::{OverlayConfig, OverlayController};
//! use understory_motion::stage::{ElementSpec, Stage};
//!
//! let stage = Rc::new(Stage::new(Size::new(800.0, 600.0)));
//! stage.insert(None, ElementSpec::new("h1").bounds(Rect::new(0.0, 0.0, 800.0, 100.0)));
//!
//! let overlay = OverlayController::mount(&stage, &OverlayConfig::default());
//! assert!(overlay.is_active());
//! assert!(stage.cursor_hidden());
//!
//! stage.pointer_move(Point::new(50.0, 50.0));
//! let p = stage.overlay().unwrap();
//! assert_eq!(p.ring_scale, 2.5);
//! assert_eq!(p.ring_origin, Point::new(35.0, 35.0));
//!
//! overlay.unmount();
//! assert!(!stage.cursor_hidden());
//! assert_eq!(stage.active_pointer_listeners(), 0);
//! ```

mod role;
mod state;

pub use role::{Role, RoleClassifier, Selector, SelectorList};
pub use state::{
    Buttons, ColorVariant, DOT_OFFSET, DeviceClass, OverlayEvent, OverlayProjection, OverlayState,
    Palette, PointerSample, RING_OFFSET, ScaleTransition,
};

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use kurbo::Point;

use crate::host::{Disposer, ElementInfo, OverlayHost};

/// One raw pointer signal delivered by a host.
pub enum PointerInput<'a> {
    /// The pointer moved to this viewport position.
    Move(Point),
    /// The pointer entered an allowlisted element.
    Enter(&'a dyn ElementInfo),
    /// The pointer left an allowlisted element.
    Leave,
    /// A button went down.
    Down(Buttons),
    /// A button went up.
    Up(Buttons),
}

impl fmt::Debug for PointerInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(p) => f.debug_tuple("Move").field(p).finish(),
            Self::Enter(_) => f.write_str("Enter(..)"),
            Self::Leave => f.write_str("Leave"),
            Self::Down(b) => f.debug_tuple("Down").field(b).finish(),
            Self::Up(b) => f.debug_tuple("Up").field(b).finish(),
        }
    }
}

/// Selector lists and colors for the overlay.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverlayConfig {
    /// Elements that count as headings.
    pub headings: SelectorList,
    /// Elements that count as generic interactive targets.
    pub interactive: SelectorList,
    /// Colors for each variant.
    pub palette: Palette,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            headings: SelectorList::headings(),
            interactive: SelectorList::interactive(),
            palette: Palette::default(),
        }
    }
}

impl OverlayConfig {
    /// A classifier over this configuration's lists.
    pub fn classifier(&self) -> RoleClassifier {
        RoleClassifier::new(self.headings.clone(), self.interactive.clone())
    }
}

#[derive(Debug, Default)]
struct Tracker {
    position: Point,
    state: OverlayState,
    cause: Option<OverlayEvent>,
}

impl Tracker {
    /// Fold one input in; returns whether the projection changed.
    fn apply(&mut self, input: PointerInput<'_>, classifier: &RoleClassifier) -> bool {
        let event = match input {
            PointerInput::Move(p) => {
                self.position = p;
                return true;
            }
            PointerInput::Enter(el) => match classifier.classify(el) {
                Some(role) => OverlayEvent::Enter(role),
                None => return false,
            },
            PointerInput::Leave => OverlayEvent::Leave,
            PointerInput::Down(b) if b.contains(Buttons::PRIMARY) => OverlayEvent::Press,
            PointerInput::Up(b) if b.contains(Buttons::PRIMARY) => OverlayEvent::Release,
            PointerInput::Down(_) | PointerInput::Up(_) => return false,
        };
        let next = self.state.on(event);
        if next == self.state {
            return false;
        }
        tracing::trace!(from = ?self.state, to = ?next, ?event, "overlay transition");
        self.state = next;
        self.cause = Some(event);
        true
    }

    fn projection(&self) -> OverlayProjection {
        OverlayProjection::new(self.position, self.state, self.cause)
    }
}

/// Why a mount did nothing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DisabledReason {
    /// The device's primary input is touch.
    TouchPrimary,
    /// Another controller owns the overlay.
    AlreadyMounted,
}

/// The result of [`OverlayController::mount`].
#[derive(Debug)]
pub enum OverlayMount {
    /// The overlay is live.
    Active(OverlayController),
    /// Nothing was acquired.
    Disabled(DisabledReason),
}

impl OverlayMount {
    /// Whether the overlay is live.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// The live controller, if any.
    pub fn controller(&self) -> Option<&OverlayController> {
        match self {
            Self::Active(c) => Some(c),
            Self::Disabled(_) => None,
        }
    }

    /// Release everything the mount acquired.
    pub fn unmount(self) {
        drop(self);
    }
}

/// The live pointer overlay.
pub struct OverlayController {
    tracker: Rc<RefCell<Tracker>>,
    // Released last to first.
    resources: Vec<Disposer>,
}

impl fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayController")
            .field("tracker", &self.tracker)
            .field("resources", &self.resources.len())
            .finish()
    }
}

impl OverlayController {
    /// Mount the overlay on `host`.
    pub fn mount<H: OverlayHost + 'static>(host: &Rc<H>, config: &OverlayConfig) -> OverlayMount {
        if host.is_touch_primary() {
            tracing::debug!("touch-primary device; pointer overlay disabled");
            return OverlayMount::Disabled(DisabledReason::TouchPrimary);
        }
        if !host.overlay_slot().try_claim() {
            tracing::warn!("pointer overlay already mounted on this host");
            return OverlayMount::Disabled(DisabledReason::AlreadyMounted);
        }

        let mut resources = Vec::with_capacity(4);
        let h = Rc::clone(host);
        resources.push(Disposer::new(move || h.overlay_slot().release()));
        resources.push(host.attach_overlay());
        host.hide_cursor();
        let h = Rc::clone(host);
        resources.push(Disposer::new(move || h.restore_cursor()));

        let tracker = Rc::new(RefCell::new(Tracker::default()));
        host.apply_overlay(&tracker.borrow().projection());

        let classifier = config.classifier();
        let allowlist = classifier.allowlist().clone();
        let cell = Rc::clone(&tracker);
        let weak = Rc::downgrade(host);
        resources.push(host.on_pointer(
            &allowlist,
            Box::new(move |input: PointerInput<'_>| {
                let Some(host) = weak.upgrade() else {
                    return;
                };
                let projection = {
                    let mut t = cell.borrow_mut();
                    if !t.apply(input, &classifier) {
                        return;
                    }
                    t.projection()
                };
                host.apply_overlay(&projection);
            }),
        ));
        tracing::debug!(%allowlist, "pointer overlay mounted");
        OverlayMount::Active(Self { tracker, resources })
    }

    /// Current hover/press state.
    pub fn state(&self) -> OverlayState {
        self.tracker.borrow().state
    }

    /// The latest pointer reading.
    pub fn sample(&self) -> PointerSample {
        let t = self.tracker.borrow();
        PointerSample {
            position: t.position,
            primary_down: t.state.is_pressed(),
            hovered: t.state.hovered(),
        }
    }

    /// What the overlay currently looks like.
    pub fn projection(&self) -> OverlayProjection {
        self.tracker.borrow().projection()
    }
}

impl Drop for OverlayController {
    fn drop(&mut self) {
        while let Some(d) = self.resources.pop() {
            d.dispose();
        }
        tracing::debug!("pointer overlay unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{ElementSpec, Stage};
    use kurbo::{Rect, Size};

    fn page() -> Rc<Stage> {
        let stage = Rc::new(Stage::new(Size::new(400.0, 400.0)));
        let main = stage.insert(
            None,
            ElementSpec::new("main").bounds(Rect::new(0.0, 0.0, 400.0, 400.0)),
        );
        stage.insert(
            Some(main),
            ElementSpec::new("h2").bounds(Rect::new(0.0, 0.0, 400.0, 100.0)),
        );
        stage.insert(
            Some(main),
            ElementSpec::new("button").bounds(Rect::new(0.0, 200.0, 100.0, 240.0)),
        );
        stage
    }

    fn ring(stage: &Stage) -> f64 {
        stage.overlay().map_or(f64::NAN, |p| p.ring_scale)
    }

    #[test]
    fn hover_and_press_follow_the_scale_table() {
        let stage = page();
        let mount = OverlayController::mount(&stage, &OverlayConfig::default());
        let c = mount.controller().unwrap();

        stage.pointer_move(Point::new(50.0, 150.0));
        assert_eq!(c.state(), OverlayState::Resting);
        assert_eq!(ring(&stage), 1.0);

        stage.pointer_move(Point::new(50.0, 220.0));
        assert_eq!(c.state(), OverlayState::Hovering(Role::Generic));
        assert_eq!(stage.overlay().unwrap().dot_scale, 0.0);

        stage.pointer_down(Buttons::PRIMARY);
        assert_eq!(ring(&stage), 1.7);
        assert!(c.sample().primary_down);
        stage.pointer_up(Buttons::PRIMARY);
        assert_eq!(ring(&stage), 2.0);

        stage.pointer_move(Point::new(50.0, 50.0));
        assert_eq!(c.state(), OverlayState::Hovering(Role::Heading));
        stage.pointer_down(Buttons::PRIMARY);
        assert_eq!(ring(&stage), 2.5);
        stage.pointer_up(Buttons::PRIMARY);

        stage.pointer_move(Point::new(300.0, 300.0));
        stage.pointer_down(Buttons::PRIMARY);
        assert_eq!(ring(&stage), 0.8);
        assert_eq!(stage.overlay().unwrap().dot_scale, 1.0);
    }

    #[test]
    fn secondary_button_does_not_press() {
        let stage = page();
        let mount = OverlayController::mount(&stage, &OverlayConfig::default());
        stage.pointer_down(Buttons::SECONDARY);
        assert_eq!(mount.controller().unwrap().state(), OverlayState::Resting);
    }

    #[test]
    fn every_move_repositions() {
        let stage = page();
        let _mount = OverlayController::mount(&stage, &OverlayConfig::default());
        for x in [10.0, 11.0, 12.5] {
            stage.pointer_move(Point::new(x, 390.0));
            assert_eq!(stage.overlay().unwrap().dot_origin, Point::new(x - 2.0, 388.0));
        }
    }

    #[test]
    fn touch_devices_acquire_nothing() {
        let stage = page();
        stage.set_touch_primary(true);
        let mount = OverlayController::mount(&stage, &OverlayConfig::default());
        assert!(matches!(
            mount,
            OverlayMount::Disabled(DisabledReason::TouchPrimary)
        ));
        assert!(!stage.cursor_hidden());
        assert!(!stage.overlay_attached());
        assert!(!stage.overlay_slot().is_claimed());
        assert_eq!(stage.active_pointer_listeners(), 0);
        mount.unmount();
        assert!(!stage.cursor_hidden());
    }

    #[test]
    fn second_controller_is_refused_until_first_unmounts() {
        let stage = page();
        let first = OverlayController::mount(&stage, &OverlayConfig::default());
        let second = OverlayController::mount(&stage, &OverlayConfig::default());
        assert!(matches!(
            second,
            OverlayMount::Disabled(DisabledReason::AlreadyMounted)
        ));
        drop(second);
        assert!(stage.cursor_hidden(), "refused mount must not restore");
        first.unmount();
        assert!(!stage.cursor_hidden());
        assert!(OverlayController::mount(&stage, &OverlayConfig::default()).is_active());
    }

    #[test]
    fn unmount_releases_everything() {
        let stage = page();
        let mount = OverlayController::mount(&stage, &OverlayConfig::default());
        assert!(stage.overlay_attached());
        assert_eq!(stage.active_pointer_listeners(), 1);
        drop(mount);
        assert!(!stage.overlay_attached());
        assert!(!stage.cursor_hidden());
        assert!(!stage.overlay_slot().is_claimed());
        assert_eq!(stage.active_pointer_listeners(), 0);
    }

    #[test]
    fn custom_lists_change_roles() {
        let stage = page();
        let config = OverlayConfig {
            headings: "button".parse().unwrap(),
            ..OverlayConfig::default()
        };
        let mount = OverlayController::mount(&stage, &config);
        stage.pointer_move(Point::new(50.0, 220.0));
        assert_eq!(
            mount.controller().unwrap().state(),
            OverlayState::Hovering(Role::Heading)
        );
    }
}
