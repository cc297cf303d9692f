// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay state machine and its projection onto ring and dot transforms.
//!
//! The state only changes on enter, leave, press, and release. Pointer moves
//! feed position into the projection without touching the state, so the
//! projection is a pure function of the latest position and state.
//!
//! | State                 | Ring scale | Dot scale |
//! |-----------------------|-----------:|----------:|
//! | Resting               | 1          | 1         |
//! | Hovering(Generic)     | 2          | 0         |
//! | Hovering(Heading)     | 2.5        | 0         |
//! | Pressed from Resting  | 0.8        | unchanged |
//! | Pressed from Generic  | 1.7        | unchanged |
//! | Pressed from Heading  | 2.5        | unchanged |

use alloc::string::String;

use kurbo::{Point, Vec2};

use super::role::Role;
use crate::easing::Easing;

bitflags::bitflags! {
    /// Pointer buttons, laid out like DOM `MouseEvent.buttons`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        /// Usually the left button.
        const PRIMARY   = 0b0000_0001;
        /// Usually the right button.
        const SECONDARY = 0b0000_0010;
        /// Usually the wheel button.
        const AUXILIARY = 0b0000_0100;
    }
}

impl Buttons {
    /// Map a DOM `MouseEvent.button` index to its flag.
    pub const fn from_button_index(index: i16) -> Self {
        match index {
            0 => Self::PRIMARY,
            1 => Self::AUXILIARY,
            2 => Self::SECONDARY,
            _ => Self::empty(),
        }
    }
}

/// The latest pointer reading as the overlay sees it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointerSample {
    /// Viewport position of the pointer.
    pub position: Point,
    /// Whether the primary button is held.
    pub primary_down: bool,
    /// Role of the allowlisted element under the pointer, if any.
    pub hovered: Option<Role>,
}

/// A state-changing pointer event, already classified.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OverlayEvent {
    /// The pointer entered an allowlisted element with this role.
    Enter(Role),
    /// The pointer left the allowlisted element.
    Leave,
    /// The primary button went down.
    Press,
    /// The primary button went up.
    Release,
}

/// The overlay's hover and press state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OverlayState {
    /// Not over anything interesting.
    #[default]
    Resting,
    /// Over an allowlisted element.
    Hovering(Role),
    /// Primary button held.
    Pressed {
        /// Hover role when the button went down. Fixes the scale while pressed.
        from: Option<Role>,
        /// Hover role to return to on release. Enter and leave update it.
        resume: Option<Role>,
    },
}

impl OverlayState {
    /// `Resting` or `Hovering(role)`.
    pub const fn from_hover(role: Option<Role>) -> Self {
        match role {
            None => Self::Resting,
            Some(r) => Self::Hovering(r),
        }
    }

    /// Role currently under the pointer, as far as the state knows.
    pub const fn hovered(self) -> Option<Role> {
        match self {
            Self::Resting => None,
            Self::Hovering(r) => Some(r),
            Self::Pressed { resume, .. } => resume,
        }
    }

    /// Whether the primary button is held.
    pub const fn is_pressed(self) -> bool {
        matches!(self, Self::Pressed { .. })
    }

    /// Apply one event.
    ///
    /// A press while pressed and a release while not pressed leave the state
    /// unchanged.
    #[must_use]
    pub const fn on(self, event: OverlayEvent) -> Self {
        match (self, event) {
            (Self::Pressed { from, .. }, OverlayEvent::Enter(r)) => Self::Pressed {
                from,
                resume: Some(r),
            },
            (Self::Pressed { from, .. }, OverlayEvent::Leave) => {
                Self::Pressed { from, resume: None }
            }
            (Self::Pressed { resume, .. }, OverlayEvent::Release) => Self::from_hover(resume),
            (Self::Pressed { .. }, OverlayEvent::Press) => self,
            (_, OverlayEvent::Enter(r)) => Self::Hovering(r),
            (_, OverlayEvent::Leave) => Self::Resting,
            (_, OverlayEvent::Press) => {
                let hover = self.hovered();
                Self::Pressed {
                    from: hover,
                    resume: hover,
                }
            }
            (_, OverlayEvent::Release) => self,
        }
    }

    /// `(ring, dot)` scale factors.
    pub const fn scales(self) -> (f64, f64) {
        match self {
            Self::Resting => (1.0, 1.0),
            Self::Hovering(Role::Generic) => (2.0, 0.0),
            Self::Hovering(Role::Heading) => (2.5, 0.0),
            Self::Pressed { from, .. } => {
                let ring = match from {
                    None => 0.8,
                    Some(Role::Generic) => 1.7,
                    Some(Role::Heading) => 2.5,
                };
                (ring, Self::from_hover(from).scales().1)
            }
        }
    }

    /// Color treatment for the ring.
    pub const fn color(self) -> ColorVariant {
        match self.hovered() {
            None => ColorVariant::Rest,
            Some(Role::Generic) => ColorVariant::Interactive,
            Some(Role::Heading) => ColorVariant::Heading,
        }
    }
}

/// Ring color treatment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorVariant {
    /// Plain ring.
    #[default]
    Rest,
    /// Over a generic interactive element.
    Interactive,
    /// Over a heading.
    Heading,
}

/// CSS colors for each [`ColorVariant`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Palette {
    /// Ring border at rest.
    pub ring_rest: String,
    /// Ring border over generic interactive elements.
    pub ring_interactive: String,
    /// Ring border over headings.
    pub ring_heading: String,
    /// Ring fill at rest.
    pub fill_rest: String,
    /// Ring fill over generic interactive elements.
    pub fill_interactive: String,
    /// Ring fill over headings.
    pub fill_heading: String,
    /// Dot fill.
    pub dot: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ring_rest: "#ffffff".into(),
            ring_interactive: "#3b82f6".into(),
            ring_heading: "#f59e0b".into(),
            fill_rest: "transparent".into(),
            fill_interactive: "rgba(59, 130, 246, 0.1)".into(),
            fill_heading: "rgba(245, 158, 11, 0.1)".into(),
            dot: "#ffffff".into(),
        }
    }
}

impl Palette {
    /// Ring border color.
    pub fn ring(&self, variant: ColorVariant) -> &str {
        match variant {
            ColorVariant::Rest => &self.ring_rest,
            ColorVariant::Interactive => &self.ring_interactive,
            ColorVariant::Heading => &self.ring_heading,
        }
    }

    /// Ring fill color.
    pub fn fill(&self, variant: ColorVariant) -> &str {
        match variant {
            ColorVariant::Rest => &self.fill_rest,
            ColorVariant::Interactive => &self.fill_interactive,
            ColorVariant::Heading => &self.fill_heading,
        }
    }
}

/// How a host should animate a scale change.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScaleTransition {
    /// Seconds.
    pub duration: f64,
    /// Timing curve.
    pub easing: Easing,
}

/// Offset from the pointer to the ring's top-left corner.
pub const RING_OFFSET: Vec2 = Vec2::new(-15.0, -15.0);
/// Offset from the pointer to the dot's top-left corner.
pub const DOT_OFFSET: Vec2 = Vec2::new(-2.0, -2.0);

const HOVER_RING: f64 = 0.2;
const HOVER_DOT: f64 = 0.15;
const PRESS: f64 = 0.08;

/// Everything a host needs to draw the overlay for one tick.
///
/// Translations apply immediately; scale changes animate with the attached
/// transitions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OverlayProjection {
    /// Ring top-left in viewport coordinates.
    pub ring_origin: Point,
    /// Dot top-left in viewport coordinates.
    pub dot_origin: Point,
    /// Ring scale factor.
    pub ring_scale: f64,
    /// Dot scale factor.
    pub dot_scale: f64,
    /// Ring color treatment.
    pub color: ColorVariant,
    /// Transition for ring scale changes.
    pub ring_transition: ScaleTransition,
    /// Transition for dot scale changes.
    pub dot_transition: ScaleTransition,
}

impl OverlayProjection {
    /// Project `state` at `position`. `cause` is the event that last changed
    /// the state; press and release use the short transition.
    pub fn new(position: Point, state: OverlayState, cause: Option<OverlayEvent>) -> Self {
        let (ring_scale, dot_scale) = state.scales();
        let ring_duration = match cause {
            Some(OverlayEvent::Press | OverlayEvent::Release) => PRESS,
            _ => HOVER_RING,
        };
        Self {
            ring_origin: position + RING_OFFSET,
            dot_origin: position + DOT_OFFSET,
            ring_scale,
            dot_scale,
            color: state.color(),
            ring_transition: ScaleTransition {
                duration: ring_duration,
                easing: Easing::default(),
            },
            dot_transition: ScaleTransition {
                duration: HOVER_DOT,
                easing: Easing::default(),
            },
        }
    }
}

/// Whether the device's primary input is a pointer or touch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// Mouse or trackpad.
    Pointer,
    /// Touch screen.
    TouchPrimary,
}

const TOUCH_SIGNATURES: [&str; 7] = [
    "Android",
    "iPhone",
    "iPad",
    "iPod",
    "BlackBerry",
    "IEMobile",
    "Opera Mini",
];

impl DeviceClass {
    /// Classify from a user-agent string (case-insensitive signature match).
    ///
    /// ```
    /// use understory_motion::overlay::DeviceClass;
    ///
    /// let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
    /// assert_eq!(DeviceClass::from_user_agent(ua), DeviceClass::TouchPrimary);
    /// ```
    pub fn from_user_agent(ua: &str) -> Self {
        let bytes = ua.as_bytes();
        let touch = TOUCH_SIGNATURES.iter().any(|sig| {
            bytes
                .windows(sig.len())
                .any(|w| w.eq_ignore_ascii_case(sig.as_bytes()))
        });
        if touch {
            Self::TouchPrimary
        } else {
            Self::Pointer
        }
    }
}
