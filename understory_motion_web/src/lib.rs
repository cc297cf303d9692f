// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser host for `understory_motion`.
//!
//! [`WebHost`] implements [`Host`] and [`OverlayHost`] on top of the DOM:
//!
//! - visibility comes from one `IntersectionObserver` per watched element,
//! - scroll events are coalesced to at most one report per animation frame,
//! - frame requests share a single `requestAnimationFrame` loop that stops
//!   as soon as nobody needs it,
//! - style patches are merged per element and written as CSS `opacity` and
//!   `transform`,
//! - the pointer overlay is two fixed-position `<div>`s colored from a
//!   [`Palette`].
//!
//! JavaScript exceptions never escape: they are logged with `tracing::warn!`
//! and the affected registration degrades to a no-op.
//!
//! ```no_run
//! use std::rc::Rc;
//! use understory_motion::overlay::{OverlayConfig, OverlayController};
//! use understory_motion::scope::Scope;
//! use understory_motion_web::WebHost;
//!
//! # fn mount(hero: web_sys::HtmlElement) -> Result<(), understory_motion_web::WebHostError> {
//! let host = Rc::new(WebHost::new()?);
//! let mut scope = Scope::mount(Rc::clone(&host));
//! scope.bind_parallax(hero, 0.3);
//! let overlay = OverlayController::mount(&host, &OverlayConfig::default());
//! # drop((scope, overlay));
//! # Ok(())
//! # }
//! ```
//!
//! [`Host`]: understory_motion::host::Host
//! [`OverlayHost`]: understory_motion::host::OverlayHost
//! [`Palette`]: understory_motion::overlay::Palette

#![no_std]
// This crate only does useful work in the browser; suppress dead-code
// warnings when checking on a native host target.
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

mod css;
mod dom;
mod frames;
mod host;

pub use host::{WebHost, WebHostError};
