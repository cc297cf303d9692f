// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between orchestration logic and the environment that renders it.
//!
//! ## Overview
//!
//! Everything in this crate runs on one thread and reacts to three
//! asynchronous signal sources the host owns: element visibility, scroll
//! position, and the pointer. A host exposes those sources as registrations
//! that hand back a [`Disposer`], and accepts visual writes in return.
//!
//! - [`Host`] covers visibility, scroll, and display-refresh frames plus the
//!   style and counter writes that entrance animations produce.
//! - [`OverlayHost`] covers the document-wide pointer overlay: device
//!   classification, the cursor-hidden flag, overlay elements, and pointer input.
//!
//! Hosts take `&self` and use interior mutability, because callbacks they
//! invoke may register or release other callbacks re-entrantly. A host must
//! not hold its own borrows while invoking a callback.
//!
//! ## Disposers
//!
//! A [`Disposer`] is the only way to undo a registration. It runs its release
//! action exactly once: when [`Disposer::dispose`] is called or when it is
//! dropped, whichever comes first. Owners keep disposers next to the state the
//! callbacks touch, so tearing down the owner tears down the registrations.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use understory_motion::host::Disposer;
//!
//! let released = Rc::new(Cell::new(0));
//! let r = Rc::clone(&released);
//! let d = Disposer::new(move || r.set(r.get() + 1));
//! d.dispose();
//! assert_eq!(released.get(), 1);
//!
//! let r = Rc::clone(&released);
//! drop(Disposer::new(move || r.set(r.get() + 1)));
//! assert_eq!(released.get(), 2);
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use crate::overlay::{OverlayProjection, PointerInput, SelectorList};
use crate::style::Style;

/// An owned release action that runs exactly once.
#[must_use = "dropping a Disposer releases its registration immediately"]
pub struct Disposer {
    release: Option<Box<dyn FnOnce()>>,
}

impl Disposer {
    /// Wrap a release action.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A disposer with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Run the release action now.
    pub fn dispose(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("pending", &self.release.is_some())
            .finish()
    }
}

/// Signal sources and visual sinks for entrance animations, parallax, and counters.
///
/// See the [module docs](self) for the re-entrancy contract.
pub trait Host {
    /// Handle to one rendered element.
    type Target: Clone + PartialEq + fmt::Debug + 'static;

    /// Current time in seconds on a monotonic clock.
    fn now(&self) -> f64;

    /// Direct children of `container`, in document order, as of this call.
    fn children(&self, container: &Self::Target) -> Vec<Self::Target>;

    /// Write the properties carried by `style`, leaving others untouched.
    ///
    /// Writes to an element that is not mounted are dropped.
    fn apply_style(&self, target: &Self::Target, style: &Style);

    /// Replace the element's text with `value`.
    fn write_count(&self, target: &Self::Target, value: i64);

    /// Report `target`'s intersection ratio with the viewport to `on_ratio`
    /// whenever it crosses `threshold` (and once initially).
    ///
    /// A target that never mounts never reports.
    fn observe_visibility(
        &self,
        target: &Self::Target,
        threshold: f64,
        on_ratio: Box<dyn FnMut(f64)>,
    ) -> Disposer;

    /// Report the document's vertical scroll offset, at most once per
    /// display refresh.
    fn on_scroll(&self, on_offset: Box<dyn FnMut(f64)>) -> Disposer;

    /// Call `on_frame` with the frame time once per display refresh until it
    /// returns `false` or the disposer is released.
    fn request_frames(&self, on_frame: Box<dyn FnMut(f64) -> bool>) -> Disposer;
}

/// Facts about an element used to classify hover targets.
pub trait ElementInfo {
    /// Whether the element's tag name equals `tag` (ASCII case-insensitive).
    fn is_tag(&self, tag: &str) -> bool;
    /// Whether the element carries `class`.
    fn has_class(&self, class: &str) -> bool;
    /// Whether attribute `name` is present (`value == None`) or equals `value`.
    fn attribute_is(&self, name: &str, value: Option<&str>) -> bool;
}

/// Ownership flag for the single document-wide pointer overlay.
///
/// Hosts own one slot per document; controllers claim it on mount and
/// release it on unmount.
#[derive(Debug, Default)]
pub struct OverlaySlot {
    claimed: Cell<bool>,
}

impl OverlaySlot {
    /// A free slot.
    pub const fn new() -> Self {
        Self {
            claimed: Cell::new(false),
        }
    }

    /// Claim the slot; returns `false` if another owner holds it.
    pub fn try_claim(&self) -> bool {
        !self.claimed.replace(true)
    }

    /// Give the slot back.
    pub fn release(&self) {
        self.claimed.set(false);
    }

    /// Whether an owner currently holds the slot.
    pub fn is_claimed(&self) -> bool {
        self.claimed.get()
    }
}

/// Environment for the document-wide pointer overlay.
pub trait OverlayHost {
    /// Whether the device's primary input is touch. Read once per mount.
    fn is_touch_primary(&self) -> bool;

    /// The document's overlay ownership slot.
    fn overlay_slot(&self) -> &OverlaySlot;

    /// Hide the platform cursor, remembering what was there before.
    fn hide_cursor(&self);

    /// Put back whatever [`hide_cursor`](Self::hide_cursor) replaced.
    fn restore_cursor(&self);

    /// Create the overlay's ring and dot; the disposer removes them.
    fn attach_overlay(&self) -> Disposer;

    /// Move, scale, and recolor the overlay.
    fn apply_overlay(&self, projection: &OverlayProjection);

    /// Deliver document pointer input, plus enter/leave for elements matching
    /// `allowlist`, to `on_input`.
    fn on_pointer(
        &self,
        allowlist: &SelectorList,
        on_input: Box<dyn FnMut(PointerInput<'_>)>,
    ) -> Disposer;
}
