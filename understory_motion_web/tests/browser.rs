// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Release checks against a real DOM.
//!
//! Run with `wasm-pack test --headless --chrome understory_motion_web`.

#![cfg(target_arch = "wasm32")]

use std::rc::Rc;

use understory_motion::counter::CounterOptions;
use understory_motion::gate::GateOptions;
use understory_motion::host::Host;
use understory_motion::overlay::{OverlayConfig, OverlayController};
use understory_motion::scope::Scope;
use understory_motion::tween::AnimationDescriptor;
use understory_motion_web::WebHost;
use wasm_bindgen::JsCast as _;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Event, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn host() -> Rc<WebHost> {
    Rc::new(WebHost::new().expect("test page has a body"))
}

fn section(host: &WebHost) -> HtmlElement {
    let el = host
        .document()
        .create_element("section")
        .expect("createElement")
        .dyn_into::<HtmlElement>()
        .expect("section is an HtmlElement");
    host.document()
        .body()
        .expect("body")
        .append_child(&el)
        .expect("append");
    el
}

fn body_cursor(host: &WebHost) -> String {
    host.document()
        .body()
        .expect("body")
        .style()
        .get_property_value("cursor")
        .expect("read cursor")
}

/// Resolves on the next animation frame.
async fn next_frame() {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .expect("window")
            .request_animation_frame(&resolve)
            .expect("requestAnimationFrame");
    });
    JsFuture::from(promise).await.expect("frame");
}

#[wasm_bindgen_test]
fn scope_unmount_releases_observers_listeners_and_frames() {
    let host = host();
    let hero = section(&host);
    let stats = section(&host);
    let mut scope = Scope::mount(Rc::clone(&host));
    scope.arm(
        hero.clone(),
        AnimationDescriptor::fade_up(),
        GateOptions::default(),
    );
    scope.arm_counter(stats.clone(), 120, CounterOptions::default());
    scope.bind_parallax(hero.clone(), 0.3);
    assert_eq!(host.active_observers(), 2);
    assert_eq!(host.active_scroll_listeners(), 1);

    // A scroll event queues a coalesced frame request; unmount must cancel it.
    let window = web_sys::window().expect("window");
    let scroll = Event::new("scroll").expect("Event");
    window.dispatch_event(&scroll).expect("dispatch");
    window.dispatch_event(&scroll).expect("dispatch");
    assert_eq!(host.active_frame_requests(), 1, "scrolls coalesce");

    scope.unmount();
    assert_eq!(host.active_observers(), 0);
    assert_eq!(host.active_scroll_listeners(), 0);
    assert_eq!(host.active_frame_requests(), 0);
    hero.remove();
    stats.remove();
}

#[wasm_bindgen_test]
async fn frame_loop_goes_idle_when_requests_finish() {
    let host = host();
    let finished = host.request_frames(Box::new(|_| false));
    let cancelled = host.request_frames(Box::new(|_| true));
    assert_eq!(host.active_frame_requests(), 2);
    cancelled.dispose();
    assert_eq!(host.active_frame_requests(), 1);
    next_frame().await;
    next_frame().await;
    assert_eq!(host.active_frame_requests(), 0);
    // Releasing an already finished request is harmless.
    finished.dispose();
    assert_eq!(host.active_frame_requests(), 0);
}

#[wasm_bindgen_test]
fn overlay_unmount_restores_cursor_and_removes_nodes() {
    let host = host();
    let body = host.document().body().expect("body");
    body.style()
        .set_property("cursor", "crosshair")
        .expect("set cursor");
    let children_before = body.child_element_count();

    let mount = OverlayController::mount(&host, &OverlayConfig::default());
    if mount.is_active() {
        assert_eq!(body_cursor(&host), "none");
        assert_eq!(body.child_element_count(), children_before + 2);
        assert!(host.active_pointer_listeners() >= 3);
    }
    mount.unmount();

    assert_eq!(body_cursor(&host), "crosshair");
    assert_eq!(body.child_element_count(), children_before);
    assert_eq!(host.active_pointer_listeners(), 0);
    assert_eq!(host.active_scroll_listeners(), 0);
    assert_eq!(host.active_frame_requests(), 0);
    body.style().remove_property("cursor").expect("reset cursor");
}

#[wasm_bindgen_test]
fn second_overlay_on_the_same_host_is_refused() {
    let host = host();
    let first = OverlayController::mount(&host, &OverlayConfig::default());
    let second = OverlayController::mount(&host, &OverlayConfig::default());
    assert!(!second.is_active());
    drop(second);
    drop(first);
    assert_eq!(host.active_pointer_listeners(), 0);
}
