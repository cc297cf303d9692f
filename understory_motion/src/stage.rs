// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stage: a deterministic, headless host.
//!
//! ## Overview
//!
//! [`Stage`] implements [`Host`] and [`OverlayHost`] over an in-memory element
//! tree. It is what the tests, demos, and benches in this workspace run
//! against, and it is a reasonable starting point for native toolkits that
//! want to drive the same orchestration logic.
//!
//! Nothing happens on its own. Signals are produced by explicit calls:
//!
//! - [`Stage::scroll_to`] reports the offset to scroll listeners, then
//!   re-evaluates visibility and hover.
//! - [`Stage::advance`] moves the clock, re-evaluates visibility, and runs one
//!   display frame.
//! - [`Stage::refresh`] re-evaluates visibility only.
//! - [`Stage::pointer_move`], [`Stage::pointer_down`], and [`Stage::pointer_up`]
//!   deliver pointer input. Moves derive enter/leave for allowlisted elements
//!   from the change in root→target hit path.
//!
//! ## Elements
//!
//! Elements carry a tag, classes, attributes, and document-space bounds.
//! Bounds of `None` mean "not mounted": such an element never reports
//! visibility, is never hit, and ignores style and counter writes.
//!
//! [`ElementId`]s are generational: removing an element frees its slot, and a
//! later insert into the same slot yields a new, distinct id.
//!
//! ## Callbacks
//!
//! Registrations live in ordered maps keyed by a monotonically increasing
//! counter, so released keys are never reused. Every dispatch snapshots the
//! live registrations first and re-checks liveness before each call, so
//! callbacks may register or release freely, including releasing themselves.
//!
//! ```
//! use kurbo::{Rect, Size};
//! use understory_motion::host::Host;
//! use understory_motion::stage::{ElementSpec, Stage};
//! use understory_motion::style::{Property, Style};
//!
//! let stage = Stage::new(Size::new(320.0, 480.0));
//! let card = stage.insert(None, ElementSpec::new("div").bounds(Rect::new(0.0, 0.0, 320.0, 100.0)));
//! stage.apply_style(&card, &Style::new().with(Property::Opacity, 0.5));
//! assert_eq!(stage.style(card).opacity, Some(0.5));
//!
//! stage.remove(card);
//! assert!(!stage.is_alive(card));
//! ```

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::{Point, Rect, Size, Vec2};

use crate::gate::{GateOptions, intersection_ratio};
use crate::host::{Disposer, ElementInfo, Host, OverlayHost, OverlaySlot};
use crate::overlay::{Buttons, OverlayProjection, PointerInput, SelectorList};
use crate::style::Style;

/// Identifier for an element on a [`Stage`]: a slot index and a generation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementId(u32, u32);

impl ElementId {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Static description of an element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementSpec {
    /// Lowercase tag name.
    pub tag: String,
    /// Class list.
    pub classes: Vec<String>,
    /// Attribute name/value pairs.
    pub attributes: Vec<(String, String)>,
    /// Document-space bounds, or `None` while unmounted.
    pub bounds: Option<Rect>,
}

impl ElementSpec {
    /// An unmounted element with this tag.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Add a class.
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Set an attribute.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// Mount at `bounds`.
    #[must_use]
    pub fn bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

impl ElementInfo for ElementSpec {
    fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn attribute_is(&self, name: &str, value: Option<&str>) -> bool {
        self.attributes
            .iter()
            .any(|(n, v)| {
                n.eq_ignore_ascii_case(name) && value.is_none_or(|want| want == v.as_str())
            })
    }
}

#[derive(Clone, Debug)]
struct Element {
    generation: u32,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    spec: ElementSpec,
    style: Style,
    count: Option<i64>,
}

impl Element {
    fn mounted_bounds(&self) -> Option<Rect> {
        self.spec.bounds
    }
}

#[derive(Debug, Default)]
struct Tree {
    slots: Vec<Option<Element>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    roots: Vec<ElementId>,
}

impl Tree {
    fn insert(&mut self, parent: Option<ElementId>, spec: ElementSpec) -> ElementId {
        let parent = parent.filter(|p| self.get(*p).is_some());
        let element = |generation| Element {
            generation,
            parent,
            children: Vec::new(),
            spec,
            style: Style::new(),
            count: None,
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(element(generation));
            (idx, generation)
        } else {
            self.slots.push(Some(element(1)));
            self.generations.push(1);
            (self.slots.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ElementId uses 32-bit indices by design."
        )]
        let id = ElementId(idx as u32, generation);
        match parent.and_then(|p| self.get_mut(p)) {
            Some(p) => p.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    fn remove(&mut self, id: ElementId) {
        let Some(parent) = self.get(id).map(|e| e.parent) else {
            return;
        };
        match parent.and_then(|p| self.get_mut(p)) {
            Some(p) => p.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }
        let mut stack = alloc::vec![id];
        while let Some(next) = stack.pop() {
            if let Some(el) = self.slots.get_mut(next.idx()).and_then(Option::take) {
                stack.extend(el.children);
                self.free_list.push(next.idx());
            }
        }
    }

    fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.idx())?
            .as_ref()
            .filter(|e| e.generation == id.1)
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.idx())?
            .as_mut()
            .filter(|e| e.generation == id.1)
    }

    fn mounted_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.get_mut(id).filter(|e| e.spec.bounds.is_some())
    }

    /// Root→target path to the topmost mounted element containing `p`.
    ///
    /// Later siblings paint over earlier ones. Children are only hit inside
    /// their parent's bounds.
    fn hit_path(&self, p: Point) -> Vec<ElementId> {
        let mut path = Vec::new();
        let mut layer: &[ElementId] = &self.roots;
        while let Some((id, el)) = layer.iter().rev().find_map(|&id| {
            let el = self.get(id)?;
            el.mounted_bounds()?.contains(p).then_some((id, el))
        }) {
            path.push(id);
            layer = &el.children;
        }
        path
    }
}

/// Live registrations keyed by a never-reused counter.
struct Registry<E> {
    entries: Rc<RefCell<BTreeMap<u64, E>>>,
    next: Cell<u64>,
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            entries: Rc::new(RefCell::new(BTreeMap::new())),
            next: Cell::new(0),
        }
    }
}

impl<E: Clone + 'static> Registry<E> {
    fn insert(&self, entry: E) -> Disposer {
        let key = self.next.get();
        self.next.set(key + 1);
        self.entries.borrow_mut().insert(key, entry);
        let entries: Weak<RefCell<BTreeMap<u64, E>>> = Rc::downgrade(&self.entries);
        Disposer::new(move || {
            if let Some(entries) = entries.upgrade() {
                let removed = entries.borrow_mut().remove(&key);
                drop(removed);
            }
        })
    }

    fn snapshot(&self) -> Vec<(u64, E)> {
        self.entries
            .borrow()
            .iter()
            .map(|(k, e)| (*k, e.clone()))
            .collect()
    }

    fn contains(&self, key: u64) -> bool {
        self.entries.borrow().contains_key(&key)
    }

    fn remove(&self, key: u64) {
        let removed = self.entries.borrow_mut().remove(&key);
        drop(removed);
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

struct Watch {
    target: ElementId,
    options: GateOptions,
    last: Cell<Option<f64>>,
    on_ratio: RefCell<Box<dyn FnMut(f64)>>,
}

struct PointerListener {
    allowlist: SelectorList,
    on_input: RefCell<Box<dyn FnMut(PointerInput<'_>)>>,
}

type ScrollCallback = Rc<RefCell<Box<dyn FnMut(f64)>>>;
type FrameCallback = Rc<RefCell<Box<dyn FnMut(f64) -> bool>>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Boundary {
    Leave,
    Enter,
}

/// Headless host over an in-memory element tree.
pub struct Stage {
    tree: RefCell<Tree>,
    viewport: Size,
    scroll: Cell<f64>,
    clock: Cell<f64>,
    pointer: Cell<Option<Point>>,
    hover: RefCell<Vec<ElementId>>,
    touch_primary: Cell<bool>,
    cursor_hidden: Cell<bool>,
    saved_cursor: Cell<Option<bool>>,
    slot: OverlaySlot,
    overlay_attached: Rc<Cell<bool>>,
    overlay: Rc<Cell<Option<OverlayProjection>>>,
    watchers: Registry<Rc<Watch>>,
    scroll_listeners: Registry<ScrollCallback>,
    frames: Registry<FrameCallback>,
    pointer_listeners: Registry<Rc<PointerListener>>,
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree.borrow();
        let alive = tree.slots.iter().filter(|s| s.is_some()).count();
        f.debug_struct("Stage")
            .field("elements_alive", &alive)
            .field("viewport", &self.viewport)
            .field("scroll", &self.scroll.get())
            .field("clock", &self.clock.get())
            .field("watchers", &self.watchers.len())
            .field("scroll_listeners", &self.scroll_listeners.len())
            .field("frames", &self.frames.len())
            .field("pointer_listeners", &self.pointer_listeners.len())
            .field("cursor_hidden", &self.cursor_hidden.get())
            .finish_non_exhaustive()
    }
}

impl Stage {
    /// An empty stage with a viewport of `viewport` CSS pixels, scrolled to the top.
    pub fn new(viewport: Size) -> Self {
        Self {
            tree: RefCell::new(Tree::default()),
            viewport,
            scroll: Cell::new(0.0),
            clock: Cell::new(0.0),
            pointer: Cell::new(None),
            hover: RefCell::new(Vec::new()),
            touch_primary: Cell::new(false),
            cursor_hidden: Cell::new(false),
            saved_cursor: Cell::new(None),
            slot: OverlaySlot::new(),
            overlay_attached: Rc::new(Cell::new(false)),
            overlay: Rc::new(Cell::new(None)),
            watchers: Registry::default(),
            scroll_listeners: Registry::default(),
            frames: Registry::default(),
            pointer_listeners: Registry::default(),
        }
    }

    /// Insert an element as the last child of `parent` (or as a root).
    ///
    /// A dead `parent` inserts a root.
    pub fn insert(&self, parent: Option<ElementId>, spec: ElementSpec) -> ElementId {
        self.tree.borrow_mut().insert(parent, spec)
    }

    /// Remove an element and its subtree.
    pub fn remove(&self, id: ElementId) {
        self.tree.borrow_mut().remove(id);
    }

    /// Whether `id` refers to a live element.
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.tree.borrow().get(id).is_some()
    }

    /// Mount at `bounds`, or unmount with `None`.
    pub fn set_bounds(&self, id: ElementId, bounds: Option<Rect>) {
        if let Some(el) = self.tree.borrow_mut().get_mut(id) {
            el.spec.bounds = bounds;
        }
    }

    /// Accumulated style writes (empty for dead elements).
    pub fn style(&self, id: ElementId) -> Style {
        self.tree.borrow().get(id).map_or_else(Style::new, |e| e.style)
    }

    /// Last counter value written, if any.
    pub fn count(&self, id: ElementId) -> Option<i64> {
        self.tree.borrow().get(id).and_then(|e| e.count)
    }

    /// The visible document region.
    pub fn viewport(&self) -> Rect {
        Rect::from_origin_size((0.0, self.scroll.get()), self.viewport)
    }

    /// Current scroll offset.
    pub fn scroll_offset(&self) -> f64 {
        self.scroll.get()
    }

    /// Scroll to `offset`: notify scroll listeners, then re-evaluate
    /// visibility and hover.
    pub fn scroll_to(&self, offset: f64) {
        self.scroll.set(offset);
        for (key, listener) in self.scroll_listeners.snapshot() {
            if !self.scroll_listeners.contains(key) {
                continue;
            }
            if let Ok(mut f) = listener.try_borrow_mut() {
                f(offset);
            }
        }
        self.refresh();
        self.update_hover();
    }

    /// Re-evaluate visibility and report threshold crossings.
    ///
    /// A watcher's first evaluation always reports.
    pub fn refresh(&self) {
        let viewport = self.viewport();
        for (key, watch) in self.watchers.snapshot() {
            if !self.watchers.contains(key) {
                continue;
            }
            let bounds = self
                .tree
                .borrow()
                .get(watch.target)
                .and_then(Element::mounted_bounds);
            let Some(bounds) = bounds else {
                continue;
            };
            let ratio = intersection_ratio(bounds, viewport);
            let crossed = watch.last.get().is_none_or(|prev| {
                watch.options.is_visible(prev) != watch.options.is_visible(ratio)
            });
            watch.last.set(Some(ratio));
            if crossed && let Ok(mut f) = watch.on_ratio.try_borrow_mut() {
                f(ratio);
            }
        }
    }

    /// Advance the clock by `dt` seconds, re-evaluate visibility, and run one
    /// frame. Frame callbacks requested during the frame run on the next one.
    pub fn advance(&self, dt: f64) {
        let now = self.clock.get() + dt;
        self.clock.set(now);
        self.refresh();
        for (key, frame) in self.frames.snapshot() {
            if !self.frames.contains(key) {
                continue;
            }
            let again = match frame.try_borrow_mut() {
                Ok(mut f) => f(now),
                Err(_) => true,
            };
            if !again {
                self.frames.remove(key);
            }
        }
    }

    /// Move the pointer to viewport position `p`.
    ///
    /// Leave and enter for allowlisted elements are delivered before the move.
    pub fn pointer_move(&self, p: Point) {
        self.pointer.set(Some(p));
        self.update_hover();
        self.dispatch_pointer(|f| f(PointerInput::Move(p)));
    }

    /// Press `buttons`.
    pub fn pointer_down(&self, buttons: Buttons) {
        self.dispatch_pointer(|f| f(PointerInput::Down(buttons)));
    }

    /// Release `buttons`.
    pub fn pointer_up(&self, buttons: Buttons) {
        self.dispatch_pointer(|f| f(PointerInput::Up(buttons)));
    }

    fn dispatch_pointer(&self, mut deliver: impl FnMut(&mut dyn FnMut(PointerInput<'_>))) {
        for (key, listener) in self.pointer_listeners.snapshot() {
            if !self.pointer_listeners.contains(key) {
                continue;
            }
            if let Ok(mut f) = listener.on_input.try_borrow_mut() {
                deliver(&mut **f);
            }
        }
    }

    fn update_hover(&self) {
        let Some(client) = self.pointer.get() else {
            return;
        };
        let doc = client + Vec2::new(0.0, self.scroll.get());
        let transitions = {
            let tree = self.tree.borrow();
            let path = tree.hit_path(doc);
            let old = self.hover.replace(path.clone());
            let lca = old
                .iter()
                .zip(&path)
                .take_while(|(a, b)| a == b)
                .count();
            // Leaves inner→outer, then enters outer→inner.
            let leaves = old[lca..].iter().rev().map(|id| (Boundary::Leave, *id));
            let enters = path[lca..].iter().map(|id| (Boundary::Enter, *id));
            leaves
                .chain(enters)
                .filter_map(|(kind, id)| Some((kind, tree.get(id)?.spec.clone())))
                .collect::<Vec<_>>()
        };
        for (kind, spec) in &transitions {
            self.dispatch_boundary(*kind, spec);
        }
    }

    fn dispatch_boundary(&self, kind: Boundary, spec: &ElementSpec) {
        for (key, listener) in self.pointer_listeners.snapshot() {
            if !self.pointer_listeners.contains(key) || !listener.allowlist.matches(spec) {
                continue;
            }
            if let Ok(mut f) = listener.on_input.try_borrow_mut() {
                match kind {
                    Boundary::Leave => f(PointerInput::Leave),
                    Boundary::Enter => f(PointerInput::Enter(spec)),
                }
            }
        }
    }

    /// Touch-primary classification reported to overlay controllers.
    pub fn set_touch_primary(&self, touch: bool) {
        self.touch_primary.set(touch);
    }

    /// Set the cursor-hidden flag directly, as page code outside the overlay might.
    pub fn set_cursor_hidden(&self, hidden: bool) {
        self.cursor_hidden.set(hidden);
    }

    /// Whether the platform cursor is hidden.
    pub fn cursor_hidden(&self) -> bool {
        self.cursor_hidden.get()
    }

    /// Whether overlay elements are attached.
    pub fn overlay_attached(&self) -> bool {
        self.overlay_attached.get()
    }

    /// The last projection applied to the attached overlay.
    pub fn overlay(&self) -> Option<OverlayProjection> {
        self.overlay.get()
    }

    /// Live visibility watchers.
    pub fn active_watchers(&self) -> usize {
        self.watchers.len()
    }

    /// Live scroll listeners.
    pub fn active_scroll_listeners(&self) -> usize {
        self.scroll_listeners.len()
    }

    /// Live frame requests.
    pub fn active_frame_requests(&self) -> usize {
        self.frames.len()
    }

    /// Live pointer listeners.
    pub fn active_pointer_listeners(&self) -> usize {
        self.pointer_listeners.len()
    }
}

impl Host for Stage {
    type Target = ElementId;

    fn now(&self) -> f64 {
        self.clock.get()
    }

    fn children(&self, container: &ElementId) -> Vec<ElementId> {
        self.tree
            .borrow()
            .get(*container)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    fn apply_style(&self, target: &ElementId, style: &Style) {
        if let Some(el) = self.tree.borrow_mut().mounted_mut(*target) {
            el.style.merge(style);
        }
    }

    fn write_count(&self, target: &ElementId, value: i64) {
        if let Some(el) = self.tree.borrow_mut().mounted_mut(*target) {
            el.count = Some(value);
        }
    }

    fn observe_visibility(
        &self,
        target: &ElementId,
        threshold: f64,
        on_ratio: Box<dyn FnMut(f64)>,
    ) -> Disposer {
        self.watchers.insert(Rc::new(Watch {
            target: *target,
            options: GateOptions::new(threshold, false),
            last: Cell::new(None),
            on_ratio: RefCell::new(on_ratio),
        }))
    }

    fn on_scroll(&self, on_offset: Box<dyn FnMut(f64)>) -> Disposer {
        self.scroll_listeners.insert(Rc::new(RefCell::new(on_offset)))
    }

    fn request_frames(&self, on_frame: Box<dyn FnMut(f64) -> bool>) -> Disposer {
        self.frames.insert(Rc::new(RefCell::new(on_frame)))
    }
}

impl OverlayHost for Stage {
    fn is_touch_primary(&self) -> bool {
        self.touch_primary.get()
    }

    fn overlay_slot(&self) -> &OverlaySlot {
        &self.slot
    }

    fn hide_cursor(&self) {
        self.saved_cursor.set(Some(self.cursor_hidden.get()));
        self.cursor_hidden.set(true);
    }

    fn restore_cursor(&self) {
        if let Some(previous) = self.saved_cursor.take() {
            self.cursor_hidden.set(previous);
        }
    }

    fn attach_overlay(&self) -> Disposer {
        self.overlay_attached.set(true);
        let attached = Rc::clone(&self.overlay_attached);
        let overlay = Rc::clone(&self.overlay);
        Disposer::new(move || {
            attached.set(false);
            overlay.set(None);
        })
    }

    fn apply_overlay(&self, projection: &OverlayProjection) {
        if self.overlay_attached.get() {
            self.overlay.set(Some(*projection));
        }
    }

    fn on_pointer(
        &self,
        allowlist: &SelectorList,
        on_input: Box<dyn FnMut(PointerInput<'_>)>,
    ) -> Disposer {
        self.pointer_listeners.insert(Rc::new(PointerListener {
            allowlist: allowlist.clone(),
            on_input: RefCell::new(on_input),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::Role;
    use alloc::vec;

    fn boxed(stage: &Stage, parent: Option<ElementId>, tag: &str, r: Rect) -> ElementId {
        stage.insert(parent, ElementSpec::new(tag).bounds(r))
    }

    #[test]
    fn ids_are_generational() {
        let stage = Stage::new(Size::new(10.0, 10.0));
        let a = stage.insert(None, ElementSpec::new("div"));
        stage.remove(a);
        let b = stage.insert(None, ElementSpec::new("div"));
        assert_eq!(a.0, b.0, "slot is reused");
        assert!(b.1 > a.1, "generation must increase on reuse");
        assert!(!stage.is_alive(a));
        assert!(stage.is_alive(b));
    }

    #[test]
    fn removing_a_parent_removes_its_subtree() {
        let stage = Stage::new(Size::new(10.0, 10.0));
        let ul = stage.insert(None, ElementSpec::new("ul"));
        let li = stage.insert(Some(ul), ElementSpec::new("li"));
        assert_eq!(stage.children(&ul), vec![li]);
        stage.remove(ul);
        assert!(!stage.is_alive(li));
        assert!(stage.children(&ul).is_empty());
    }

    #[test]
    fn unmounted_elements_ignore_writes() {
        let stage = Stage::new(Size::new(10.0, 10.0));
        let el = stage.insert(None, ElementSpec::new("div"));
        stage.apply_style(&el, &Style::new().with(crate::style::Property::X, 3.0));
        stage.write_count(&el, 9);
        assert!(stage.style(el).is_empty());
        assert_eq!(stage.count(el), None);
    }

    #[test]
    fn visibility_reports_initially_then_on_crossings_only() {
        let stage = Stage::new(Size::new(100.0, 100.0));
        let el = boxed(&stage, None, "div", Rect::new(0.0, 150.0, 100.0, 250.0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _watch = stage.observe_visibility(&el, 0.5, Box::new(move |r| s.borrow_mut().push(r)));
        stage.refresh();
        stage.scroll_to(10.0);
        stage.scroll_to(100.0);
        stage.scroll_to(120.0);
        stage.scroll_to(0.0);
        assert_eq!(*seen.borrow(), vec![0.0, 0.5, 0.0]);
    }

    #[test]
    fn released_watchers_stop_reporting() {
        let stage = Stage::new(Size::new(100.0, 100.0));
        let el = boxed(&stage, None, "div", Rect::new(0.0, 0.0, 10.0, 10.0));
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let watch = stage.observe_visibility(&el, 0.0, Box::new(move |_| h.set(h.get() + 1)));
        assert_eq!(stage.active_watchers(), 1);
        watch.dispose();
        stage.refresh();
        assert_eq!(hits.get(), 0);
        assert_eq!(stage.active_watchers(), 0);
    }

    #[test]
    fn frames_run_until_they_decline() {
        let stage = Stage::new(Size::new(10.0, 10.0));
        let ticks = Rc::new(RefCell::new(Vec::new()));
        let t = Rc::clone(&ticks);
        let _frames = stage.request_frames(Box::new(move |now| {
            t.borrow_mut().push(now);
            t.borrow().len() < 3
        }));
        for _ in 0..5 {
            stage.advance(0.5);
        }
        assert_eq!(*ticks.borrow(), vec![0.5, 1.0, 1.5]);
        assert_eq!(stage.active_frame_requests(), 0);
    }

    #[test]
    fn hover_transitions_are_minimal_and_ordered() {
        let stage = Stage::new(Size::new(200.0, 200.0));
        let nav = boxed(&stage, None, "nav", Rect::new(0.0, 0.0, 200.0, 50.0));
        stage.insert(
            Some(nav),
            ElementSpec::new("a")
                .class("title")
                .bounds(Rect::new(0.0, 0.0, 50.0, 50.0)),
        );
        boxed(&stage, Some(nav), "button", Rect::new(100.0, 0.0, 150.0, 50.0));
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        let classifier = crate::overlay::RoleClassifier::default();
        let allowlist = classifier.allowlist().clone();
        let _listener = stage.on_pointer(
            &allowlist,
            Box::new(move |input: PointerInput<'_>| {
                let entry = match input {
                    PointerInput::Enter(el) => classifier.classify(el).map(Some),
                    PointerInput::Leave => Some(None),
                    _ => None,
                };
                if let Some(e) = entry {
                    l.borrow_mut().push(e);
                }
            }),
        );
        stage.pointer_move(Point::new(10.0, 10.0));
        stage.pointer_move(Point::new(20.0, 10.0));
        stage.pointer_move(Point::new(120.0, 10.0));
        stage.pointer_move(Point::new(120.0, 150.0));
        assert_eq!(
            *log.borrow(),
            vec![
                Some(Role::Heading),
                None,
                Some(Role::Generic),
                None
            ]
        );
    }

    #[test]
    fn scrolling_under_a_still_pointer_updates_hover() {
        let stage = Stage::new(Size::new(200.0, 100.0));
        boxed(&stage, None, "button", Rect::new(0.0, 150.0, 200.0, 200.0));
        let entered = Rc::new(Cell::new(0));
        let e = Rc::clone(&entered);
        let _listener = stage.on_pointer(
            &SelectorList::interactive(),
            Box::new(move |input: PointerInput<'_>| {
                if matches!(input, PointerInput::Enter(_)) {
                    e.set(e.get() + 1);
                }
            }),
        );
        stage.pointer_move(Point::new(10.0, 60.0));
        assert_eq!(entered.get(), 0);
        stage.scroll_to(100.0);
        assert_eq!(entered.get(), 1);
    }

    #[test]
    fn cursor_restore_returns_prior_state() {
        let stage = Stage::new(Size::new(10.0, 10.0));
        stage.set_cursor_hidden(true);
        stage.hide_cursor();
        stage.restore_cursor();
        assert!(stage.cursor_hidden(), "was hidden before; stays hidden");
        stage.set_cursor_hidden(false);
        stage.hide_cursor();
        assert!(stage.cursor_hidden());
        stage.restore_cursor();
        assert!(!stage.cursor_hidden());
    }

    #[test]
    fn overlay_writes_need_attachment() {
        let stage = Stage::new(Size::new(10.0, 10.0));
        let p = OverlayProjection::new(Point::ZERO, crate::overlay::OverlayState::Resting, None);
        stage.apply_overlay(&p);
        assert_eq!(stage.overlay(), None);
        let attached = stage.attach_overlay();
        stage.apply_overlay(&p);
        assert_eq!(stage.overlay(), Some(p));
        drop(attached);
        assert!(!stage.overlay_attached());
        assert_eq!(stage.overlay(), None);
    }
}
