// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The DOM-backed [`Host`] and [`OverlayHost`].

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use js_sys::Array;
use kurbo::Point;
use understory_motion::host::{Disposer, Host, OverlayHost, OverlaySlot};
use understory_motion::overlay::{
    Buttons, DeviceClass, OverlayProjection, Palette, PointerInput, SelectorList,
};
use understory_motion::style::Style;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{
    CssStyleDeclaration, Document, Element, Event, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, MouseEvent, Window,
};

use crate::css;
use crate::dom::{DomElement, Listener};
use crate::frames::{FrameLoop, performance_now};

/// Errors constructing a [`WebHost`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WebHostError {
    /// Not running in a window context (for example, inside a worker).
    #[error("no global `window`")]
    NoWindow,
    /// The window has no document.
    #[error("window has no document")]
    NoDocument,
    /// The document has no `<body>` yet.
    #[error("document has no body")]
    NoBody,
}

type PointerFn = Rc<RefCell<Box<dyn FnMut(PointerInput<'_>)>>>;

struct OverlayNodes {
    ring: HtmlElement,
    dot: HtmlElement,
}

/// [`Host`] and [`OverlayHost`] for the current browser document.
///
/// Targets are [`HtmlElement`]s. One host serves any number of scopes and at
/// most one pointer overlay.
pub struct WebHost {
    window: Window,
    document: Document,
    body: HtmlElement,
    palette: Palette,
    frames: FrameLoop,
    /// Composed style per animated element; patches merge into these.
    styles: RefCell<Vec<(HtmlElement, Style)>>,
    slot: OverlaySlot,
    saved_cursor: RefCell<Option<String>>,
    overlay: Rc<RefCell<Option<OverlayNodes>>>,
    scroll_listeners: Rc<Cell<usize>>,
    pointer_listeners: Rc<Cell<usize>>,
    observers: Rc<Cell<usize>>,
}

impl fmt::Debug for WebHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebHost")
            .field("frame_requests", &self.frames.len())
            .field("styled_elements", &self.styles.borrow().len())
            .field("scroll_listeners", &self.scroll_listeners.get())
            .field("pointer_listeners", &self.pointer_listeners.get())
            .field("observers", &self.observers.get())
            .field("overlay_claimed", &self.slot.is_claimed())
            .field("overlay_attached", &self.overlay.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl WebHost {
    /// Bind to the global window and document, with the default [`Palette`].
    pub fn new() -> Result<Self, WebHostError> {
        let window = web_sys::window().ok_or(WebHostError::NoWindow)?;
        let document = window.document().ok_or(WebHostError::NoDocument)?;
        let body = document.body().ok_or(WebHostError::NoBody)?;
        Ok(Self {
            window,
            document,
            body,
            palette: Palette::default(),
            frames: FrameLoop::new(),
            styles: RefCell::new(Vec::new()),
            slot: OverlaySlot::new(),
            saved_cursor: RefCell::new(None),
            overlay: Rc::new(RefCell::new(None)),
            scroll_listeners: Rc::new(Cell::new(0)),
            pointer_listeners: Rc::new(Cell::new(0)),
            observers: Rc::new(Cell::new(0)),
        })
    }

    /// Use `palette` for the pointer overlay.
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// The document this host writes to.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Live `requestAnimationFrame` consumers.
    pub fn active_frame_requests(&self) -> usize {
        self.frames.len()
    }

    /// Live scroll listeners.
    pub fn active_scroll_listeners(&self) -> usize {
        self.scroll_listeners.get()
    }

    /// Live DOM listeners registered for the pointer overlay.
    pub fn active_pointer_listeners(&self) -> usize {
        self.pointer_listeners.get()
    }

    /// Connected `IntersectionObserver`s.
    pub fn active_observers(&self) -> usize {
        self.observers.get()
    }

    fn create_div(&self) -> Option<HtmlElement> {
        match self.document.create_element("div") {
            Ok(el) => el.dyn_into::<HtmlElement>().ok(),
            Err(err) => {
                tracing::warn!(?err, "createElement failed");
                None
            }
        }
    }
}

fn set(style: &CssStyleDeclaration, property: &str, value: &str) {
    if let Err(err) = style.set_property(property, value) {
        tracing::warn!(property, value, ?err, "style write failed");
    }
}

fn deliver(on_input: &PointerFn, input: PointerInput<'_>) {
    if let Ok(mut f) = on_input.try_borrow_mut() {
        f(input);
    }
}

fn mouse_position(event: &Event) -> Option<Point> {
    let event = event.dyn_ref::<MouseEvent>()?;
    Some(Point::new(
        f64::from(event.client_x()),
        f64::from(event.client_y()),
    ))
}

fn mouse_buttons(event: &Event) -> Option<Buttons> {
    event
        .dyn_ref::<MouseEvent>()
        .map(|e| Buttons::from_button_index(e.button()))
}

impl Host for WebHost {
    type Target = HtmlElement;

    fn now(&self) -> f64 {
        performance_now() / 1000.0
    }

    fn children(&self, container: &HtmlElement) -> Vec<HtmlElement> {
        let list = container.children();
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .collect()
    }

    fn apply_style(&self, target: &HtmlElement, patch: &Style) {
        if !target.is_connected() {
            return;
        }
        let composed = {
            let mut styles = self.styles.borrow_mut();
            styles.retain(|(el, _)| el.is_connected());
            match styles.iter_mut().find(|(el, _)| el == target) {
                Some((_, style)) => {
                    style.merge(patch);
                    *style
                }
                None => {
                    styles.push((target.clone(), *patch));
                    *patch
                }
            }
        };
        let css = target.style();
        if let Some(opacity) = patch.opacity {
            set(&css, "opacity", &opacity.to_string());
        }
        if css::touches_transform(patch) {
            set(&css, "transform", &css::transform(&composed));
        }
    }

    fn write_count(&self, target: &HtmlElement, value: i64) {
        target.set_text_content(Some(&value.to_string()));
    }

    fn observe_visibility(
        &self,
        target: &HtmlElement,
        threshold: f64,
        mut on_ratio: Box<dyn FnMut(f64)>,
    ) -> Disposer {
        let callback = Closure::wrap(Box::new(move |entries: Array, _: IntersectionObserver| {
            for entry in entries.iter() {
                if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                    on_ratio(entry.intersection_ratio());
                }
            }
        })
            as Box<dyn FnMut(Array, IntersectionObserver)>);
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        let observer =
            match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
            {
                Ok(observer) => observer,
                Err(err) => {
                    tracing::warn!(threshold, ?err, "IntersectionObserver unavailable");
                    return Disposer::noop();
                }
            };
        observer.observe(target);
        let count = Rc::clone(&self.observers);
        count.set(count.get() + 1);
        Disposer::new(move || {
            observer.disconnect();
            drop(callback);
            count.set(count.get() - 1);
        })
    }

    fn on_scroll(&self, on_offset: Box<dyn FnMut(f64)>) -> Disposer {
        let on_offset = Rc::new(RefCell::new(on_offset));
        let pending = Rc::new(Cell::new(false));
        // Holds the in-flight frame request so it outlives the event callback.
        let tick: Rc<RefCell<Option<Disposer>>> = Rc::new(RefCell::new(None));
        let frames = self.frames.handle();
        let window = self.window.clone();
        let listener = {
            let tick = Rc::clone(&tick);
            Listener::add(&self.window, "scroll", true, move |_| {
                if pending.replace(true) {
                    return;
                }
                let pending = Rc::clone(&pending);
                let on_offset = Rc::clone(&on_offset);
                let window = window.clone();
                let request = frames.request(Box::new(move |_| {
                    pending.set(false);
                    match window.scroll_y() {
                        Ok(offset) => {
                            if let Ok(mut f) = on_offset.try_borrow_mut() {
                                f(offset);
                            }
                        }
                        Err(err) => tracing::warn!(?err, "scrollY unavailable"),
                    }
                    false
                }));
                tick.replace(Some(request));
            })
        };
        let Some(listener) = listener else {
            return Disposer::noop();
        };
        let count = Rc::clone(&self.scroll_listeners);
        count.set(count.get() + 1);
        Disposer::new(move || {
            drop(listener);
            drop(tick.take());
            count.set(count.get() - 1);
        })
    }

    fn request_frames(&self, on_frame: Box<dyn FnMut(f64) -> bool>) -> Disposer {
        self.frames.request(on_frame)
    }
}

impl OverlayHost for WebHost {
    fn is_touch_primary(&self) -> bool {
        match self.window.navigator().user_agent() {
            Ok(ua) => DeviceClass::from_user_agent(&ua) == DeviceClass::TouchPrimary,
            Err(err) => {
                tracing::warn!(?err, "userAgent unavailable; assuming a pointer device");
                false
            }
        }
    }

    fn overlay_slot(&self) -> &OverlaySlot {
        &self.slot
    }

    fn hide_cursor(&self) {
        let css = self.body.style();
        {
            let mut saved = self.saved_cursor.borrow_mut();
            if saved.is_none() {
                *saved = Some(css.get_property_value("cursor").unwrap_or_default());
            }
        }
        set(&css, "cursor", "none");
    }

    fn restore_cursor(&self) {
        let css = self.body.style();
        match self.saved_cursor.take() {
            Some(prev) if !prev.is_empty() => set(&css, "cursor", &prev),
            _ => {
                if let Err(err) = css.remove_property("cursor") {
                    tracing::warn!(?err, "cursor restore failed");
                }
            }
        }
    }

    fn attach_overlay(&self) -> Disposer {
        let (Some(ring), Some(dot)) = (self.create_div(), self.create_div()) else {
            return Disposer::noop();
        };
        for (el, size) in [(&ring, 30.0), (&dot, 4.0)] {
            let css = el.style();
            set(&css, "position", "fixed");
            set(&css, "left", "0px");
            set(&css, "top", "0px");
            set(&css, "width", &css::px(size));
            set(&css, "height", &css::px(size));
            set(&css, "border-radius", "50%");
            set(&css, "pointer-events", "none");
            set(&css, "z-index", "9999");
            set(&css, "will-change", "transform");
            if let Err(err) = self.body.append_child(el) {
                tracing::warn!(?err, "overlay attach failed");
            }
        }
        set(&ring.style(), "border", &alloc::format!("2px solid {}", self.palette.ring_rest));
        set(&ring.style(), "background-color", &self.palette.fill_rest);
        set(&dot.style(), "background-color", &self.palette.dot);
        *self.overlay.borrow_mut() = Some(OverlayNodes { ring, dot });

        let overlay: Weak<RefCell<Option<OverlayNodes>>> = Rc::downgrade(&self.overlay);
        Disposer::new(move || {
            let nodes = overlay.upgrade().and_then(|o| o.borrow_mut().take());
            if let Some(nodes) = nodes {
                nodes.ring.remove();
                nodes.dot.remove();
            }
        })
    }

    fn apply_overlay(&self, p: &OverlayProjection) {
        let overlay = self.overlay.borrow();
        let Some(nodes) = overlay.as_ref() else {
            return;
        };
        let ring = nodes.ring.style();
        set(&ring, "transform", &css::translate(p.ring_origin));
        set(&ring, "scale", &css::scale(p.ring_scale));
        set(&ring, "transition", &css::scale_transition(&p.ring_transition));
        set(&ring, "border-color", self.palette.ring(p.color));
        set(&ring, "background-color", self.palette.fill(p.color));

        let dot = nodes.dot.style();
        set(&dot, "transform", &css::translate(p.dot_origin));
        set(&dot, "scale", &css::scale(p.dot_scale));
        set(&dot, "transition", &css::scale_transition(&p.dot_transition));
    }

    fn on_pointer(
        &self,
        allowlist: &SelectorList,
        on_input: Box<dyn FnMut(PointerInput<'_>)>,
    ) -> Disposer {
        let on_input: PointerFn = Rc::new(RefCell::new(on_input));
        let mut listeners = Vec::new();

        let f = Rc::clone(&on_input);
        listeners.extend(Listener::add(&self.document, "mousemove", true, move |e| {
            if let Some(p) = mouse_position(&e) {
                deliver(&f, PointerInput::Move(p));
            }
        }));
        let f = Rc::clone(&on_input);
        listeners.extend(Listener::add(&self.document, "mousedown", true, move |e| {
            if let Some(b) = mouse_buttons(&e) {
                deliver(&f, PointerInput::Down(b));
            }
        }));
        let f = Rc::clone(&on_input);
        listeners.extend(Listener::add(&self.document, "mouseup", true, move |e| {
            if let Some(b) = mouse_buttons(&e) {
                deliver(&f, PointerInput::Up(b));
            }
        }));

        // Elements present now; later insertions are not tracked.
        match self.document.query_selector_all(&allowlist.to_string()) {
            Ok(nodes) => {
                for i in 0..nodes.length() {
                    let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok())
                    else {
                        continue;
                    };
                    let f = Rc::clone(&on_input);
                    let entered = el.clone();
                    listeners.extend(Listener::add(&el, "mouseenter", true, move |_| {
                        deliver(&f, PointerInput::Enter(&DomElement(&entered)));
                    }));
                    let f = Rc::clone(&on_input);
                    listeners.extend(Listener::add(&el, "mouseleave", true, move |_| {
                        deliver(&f, PointerInput::Leave);
                    }));
                }
            }
            Err(err) => tracing::warn!(%allowlist, ?err, "querySelectorAll failed"),
        }
        tracing::debug!(listeners = listeners.len(), "pointer listeners attached");
        let count = Rc::clone(&self.pointer_listeners);
        count.set(count.get() + listeners.len());
        Disposer::new(move || {
            count.set(count.get() - listeners.len());
            drop(listeners);
        })
    }
}
