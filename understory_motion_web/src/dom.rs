// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small DOM adapters: element facts and RAII event listeners.

use alloc::boxed::Box;

use understory_motion::host::ElementInfo;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Element, Event, EventTarget};

/// Borrowed view of a DOM element for hover classification.
pub(crate) struct DomElement<'a>(pub(crate) &'a Element);

impl ElementInfo for DomElement<'_> {
    fn is_tag(&self, tag: &str) -> bool {
        self.0.tag_name().eq_ignore_ascii_case(tag)
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn attribute_is(&self, name: &str, value: Option<&str>) -> bool {
        match (self.0.get_attribute(name), value) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(actual), Some(want)) => actual == want,
        }
    }
}

/// An event listener that removes itself when dropped.
pub(crate) struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    /// Register `handler` for `event` on `target`.
    ///
    /// Returns `None` (after logging) if the browser rejects the registration.
    pub(crate) fn add(
        target: &EventTarget,
        event: &'static str,
        passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Option<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        if let Err(err) = target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        ) {
            tracing::warn!(event, ?err, "addEventListener failed");
            return None;
        }
        Some(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref())
        {
            tracing::warn!(event = self.event, ?err, "removeEventListener failed");
        }
    }
}
