// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer overlay on a headless stage.
//!
//! Move over a heading and a button, press and release, and print the ring
//! and dot scales the overlay would render.
//!
//! Run:
//! - `cargo run -p understory_examples --example motion_overlay`

use std::rc::Rc;

use kurbo::{Point, Rect, Size};
use understory_motion::overlay::{Buttons, OverlayConfig, OverlayController, OverlayMount};
use understory_motion::stage::{ElementSpec, Stage};

fn report(stage: &Stage, label: &str) {
    if let Some(p) = stage.overlay() {
        println!(
            "{label:<16} ring {:>4} dot {:>4} color {:?} ({}s)",
            p.ring_scale, p.dot_scale, p.color, p.ring_transition.duration
        );
    }
}

fn main() {
    let stage = Rc::new(Stage::new(Size::new(800.0, 600.0)));
    stage.insert(
        None,
        ElementSpec::new("h2").bounds(Rect::new(0.0, 0.0, 800.0, 80.0)),
    );
    stage.insert(
        None,
        ElementSpec::new("button").bounds(Rect::new(100.0, 200.0, 220.0, 240.0)),
    );

    let mount = OverlayController::mount(&stage, &OverlayConfig::default());
    let OverlayMount::Active(controller) = &mount else {
        println!("overlay disabled: {mount:?}");
        return;
    };

    stage.pointer_move(Point::new(400.0, 400.0));
    report(&stage, "resting");
    stage.pointer_move(Point::new(400.0, 40.0));
    report(&stage, "over heading");
    stage.pointer_move(Point::new(150.0, 220.0));
    report(&stage, "over button");
    stage.pointer_down(Buttons::PRIMARY);
    report(&stage, "pressed");
    stage.pointer_up(Buttons::PRIMARY);
    report(&stage, "released");
    println!("state: {:?}", controller.state());

    mount.unmount();
    assert!(!stage.cursor_hidden(), "cursor restored on unmount");
    assert!(!stage.overlay_attached());

    // Touch-primary devices never get an overlay.
    stage.set_touch_primary(true);
    let touch = OverlayController::mount(&stage, &OverlayConfig::default());
    println!("touch device: {touch:?}");
    assert!(!touch.is_active());
}
