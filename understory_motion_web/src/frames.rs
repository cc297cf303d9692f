// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared `requestAnimationFrame` loop.
//!
//! Every frame request from every scope runs off one browser callback. The
//! loop re-registers itself only while at least one request is live, so an
//! idle page schedules no frames at all.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use understory_motion::host::Disposer;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

// Direct global bindings instead of `web_sys::Window` methods; avoids
// fetching the Window/Performance objects on every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type FrameFn = Rc<RefCell<Box<dyn FnMut(f64) -> bool>>>;
type RafClosure = Closure<dyn FnMut(f64)>;

/// Owner of the browser callback. Dropping it cancels the pending frame.
pub(crate) struct FrameLoop {
    inner: Rc<FrameInner>,
}

/// A weak handle for registering requests from inside other callbacks.
#[derive(Clone)]
pub(crate) struct FrameHandle(Weak<FrameInner>);

struct FrameInner {
    /// The JS closure registered with `requestAnimationFrame`.
    closure: RefCell<Option<RafClosure>>,
    requests: RefCell<BTreeMap<u64, FrameFn>>,
    next_key: Cell<u64>,
    /// Pending `requestAnimationFrame` id, if a frame is scheduled.
    raf_id: Cell<Option<i32>>,
}

impl FrameLoop {
    pub(crate) fn new() -> Self {
        let inner = Rc::new(FrameInner {
            closure: RefCell::new(None),
            requests: RefCell::new(BTreeMap::new()),
            next_key: Cell::new(0),
            raf_id: Cell::new(None),
        });
        // The closure lives inside `inner`, so it must not keep `inner` alive.
        let weak = Rc::downgrade(&inner);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.raf_id.set(None);
            inner.tick(timestamp_ms / 1000.0);
            if !inner.requests.borrow().is_empty() {
                inner.schedule();
            }
        }) as Box<dyn FnMut(f64)>);
        *inner.closure.borrow_mut() = Some(closure);
        Self { inner }
    }

    pub(crate) fn handle(&self) -> FrameHandle {
        FrameHandle(Rc::downgrade(&self.inner))
    }

    pub(crate) fn request(&self, on_frame: Box<dyn FnMut(f64) -> bool>) -> Disposer {
        self.handle().request(on_frame)
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.requests.borrow().len()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let Some(id) = self.inner.raf_id.take() {
            cancel_animation_frame(id);
        }
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl FrameHandle {
    /// Call `on_frame` every frame until it returns `false` or the disposer
    /// is released. A handle whose loop is gone returns a no-op disposer.
    pub(crate) fn request(&self, on_frame: Box<dyn FnMut(f64) -> bool>) -> Disposer {
        let Some(inner) = self.0.upgrade() else {
            return Disposer::noop();
        };
        let key = inner.next_key.get();
        inner.next_key.set(key + 1);
        inner
            .requests
            .borrow_mut()
            .insert(key, Rc::new(RefCell::new(on_frame)));
        inner.schedule();
        let weak = Weak::clone(&self.0);
        Disposer::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.cancel(key);
            }
        })
    }
}

impl FrameInner {
    fn schedule(&self) {
        if self.raf_id.get().is_some() {
            return;
        }
        if let Some(closure) = self.closure.borrow().as_ref() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.raf_id.set(Some(id));
        }
    }

    fn cancel(&self, key: u64) {
        let now_empty = {
            let mut requests = self.requests.borrow_mut();
            requests.remove(&key);
            requests.is_empty()
        };
        if now_empty && let Some(id) = self.raf_id.take() {
            cancel_animation_frame(id);
        }
    }

    fn tick(&self, now: f64) {
        let snapshot: Vec<(u64, FrameFn)> = self
            .requests
            .borrow()
            .iter()
            .map(|(k, f)| (*k, Rc::clone(f)))
            .collect();
        for (key, on_frame) in snapshot {
            // A callback may have released a later request this frame.
            if !self.requests.borrow().contains_key(&key) {
                continue;
            }
            let keep = match on_frame.try_borrow_mut() {
                Ok(mut f) => f(now),
                Err(_) => true,
            };
            if !keep {
                self.requests.borrow_mut().remove(&key);
            }
        }
        tracing::trace!(live = self.requests.borrow().len(), "frame");
    }
}
