// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_motion --heading-base-level=0

//! Understory Motion: deterministic, `no_std` scroll and visibility driven animation for UI.
//!
//! ## Overview
//!
//! This crate decides *when* and *how* page elements animate as they scroll into view, and how a
//! custom pointer overlay follows the mouse. It does not render anything and never touches a
//! document directly. Every side effect goes through a [`Host`](crate::host::Host): the host
//! reports visibility ratios, scroll offsets, and animation frames, and the crate answers with
//! style and counter writes.
//!
//! ## Components
//!
//! - [`VisibilityGate`](crate::gate::VisibilityGate) turns visibility ratios into edge
//!   observations and disconnects itself after a one-shot fire.
//! - [`AnimationTrigger`](crate::trigger::AnimationTrigger) plays an
//!   [`AnimationDescriptor`](crate::tween::AnimationDescriptor) on one target when its gate fires.
//! - [`StaggerGroup`](crate::stagger::StaggerGroup) plays the same descriptor on each child of a
//!   container with a fixed per-child delay.
//! - [`ParallaxDriver`](crate::parallax::ParallaxDriver) translates a target vertically in
//!   proportion to scroll offset.
//! - [`CounterInterpolator`](crate::counter::CounterInterpolator) counts displayed integers from
//!   zero to a target value once.
//! - [`OverlayController`](crate::overlay::OverlayController) drives a ring and dot that follow the
//!   pointer and react to hover and press.
//!
//! ## Lifecycle
//!
//! Each animated target moves through
//! [`TargetState`](crate::trigger::TargetState) `Idle → Armed → Playing → Settled`.
//! A target is armed when its gate fires, plays while its tween runs, and settles on the exact
//! end style. With `trigger_once` off, a target that leaves the viewport and returns replays.
//!
//! ## Workflow
//!
//! 1) Implement [`Host`](crate::host::Host) (and [`OverlayHost`](crate::host::OverlayHost) for the
//!    pointer overlay) for your document, or use the headless [`Stage`](crate::stage::Stage).
//! 2) Mount a [`Scope`](crate::scope::Scope) per view and bind targets with
//!    [`arm`](crate::scope::Scope::arm), [`arm_group`](crate::scope::Scope::arm_group),
//!    [`arm_counter`](crate::scope::Scope::arm_counter), and
//!    [`bind_parallax`](crate::scope::Scope::bind_parallax).
//! 3) Let the host drive it. The scope only requests frames while something is animating.
//! 4) Unmount the scope. Every watcher, listener, and frame request it acquired is released
//!    exactly once.
//!
//! Defaults for every binding kind live in [`MotionConfig`](crate::config::MotionConfig), which
//! deserializes from partial configuration files with the `serde` feature.
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use kurbo::{Rect, Size};
//! use understory_motion::counter::CounterOptions;
//! use understory_motion::scope::Scope;
//! use understory_motion::stage::{ElementSpec, Stage};
//! use understory_motion::stagger::StaggerOptions;
//!
//! let stage = Rc::new(Stage::new(Size::new(800.0, 600.0)));
//! let list = stage.insert(None, ElementSpec::new("ul").bounds(Rect::new(0.0, 100.0, 800.0, 400.0)));
//! for i in 0..3 {
//!     let top = 100.0 + 100.0 * f64::from(i);
//!     stage.insert(Some(list), ElementSpec::new("li").bounds(Rect::new(0.0, top, 800.0, top + 100.0)));
//! }
//! let stat = stage.insert(None, ElementSpec::new("span").bounds(Rect::new(0.0, 450.0, 100.0, 500.0)));
//!
//! let mut scope = Scope::mount(Rc::clone(&stage));
//! scope.arm_group(list, StaggerOptions::default());
//! scope.arm_counter(stat, 250, CounterOptions::default());
//! stage.refresh();
//!
//! for _ in 0..240 {
//!     stage.advance(1.0 / 60.0);
//! }
//! assert_eq!(stage.count(stat), Some(250));
//! assert!(!scope.is_animating());
//! assert_eq!(stage.active_frame_requests(), 0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod counter;
pub mod easing;
pub mod error;
pub mod gate;
pub mod host;
pub mod overlay;
pub mod parallax;
pub mod scope;
pub mod stage;
pub mod stagger;
pub mod style;
pub mod trigger;
pub mod tween;
