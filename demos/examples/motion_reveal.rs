// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-driven entrances on a headless stage.
//!
//! A hero fades up, a feature list staggers in, a stat counts to its value,
//! and a background drifts with parallax as the page scrolls.
//!
//! Run:
//! - `cargo run -p understory_examples --example motion_reveal`

use std::rc::Rc;

use kurbo::{Rect, Size};
use understory_motion::config::MotionConfig;
use understory_motion::scope::Scope;
use understory_motion::stage::{ElementSpec, Stage};

const FRAME: f64 = 1.0 / 60.0;

fn main() {
    let config = MotionConfig::default();
    let stage = Rc::new(Stage::new(Size::new(1280.0, 720.0)));

    let backdrop = stage.insert(
        None,
        ElementSpec::new("div")
            .class("backdrop")
            .bounds(Rect::new(0.0, 0.0, 1280.0, 720.0)),
    );
    let hero = stage.insert(
        None,
        ElementSpec::new("h1").bounds(Rect::new(100.0, 200.0, 1180.0, 320.0)),
    );
    let features = stage.insert(
        None,
        ElementSpec::new("ul").bounds(Rect::new(100.0, 900.0, 1180.0, 1200.0)),
    );
    for i in 0..4 {
        let top = 900.0 + 75.0 * f64::from(i);
        stage.insert(
            Some(features),
            ElementSpec::new("li").bounds(Rect::new(100.0, top, 1180.0, top + 75.0)),
        );
    }
    let stat = stage.insert(
        None,
        ElementSpec::new("span")
            .class("stat")
            .bounds(Rect::new(100.0, 1400.0, 300.0, 1460.0)),
    );

    let mut scope = Scope::mount(Rc::clone(&stage));
    let hero_id = scope.arm(hero, config.reveal.descriptor, config.reveal.gate);
    let list_id = scope.arm_group(features, config.stagger);
    let stat_id = scope.arm_counter(stat, 250, config.counter);
    scope.bind_parallax(backdrop, config.parallax.speed);
    stage.refresh();

    // The hero is on screen from the start.
    for _ in 0..30 {
        stage.advance(FRAME);
    }
    println!(
        "hero half way: {:?} opacity={:?}",
        scope.state(hero_id),
        stage.style(hero).opacity
    );

    // Scroll down in steps, a few frames per step.
    for offset in [200.0, 400.0, 600.0, 800.0, 1000.0] {
        stage.scroll_to(offset);
        for _ in 0..10 {
            stage.advance(FRAME);
        }
        println!(
            "scroll {offset:>6}: list={:?} stat={:?} count={:?} backdrop y={:?}",
            scope.state(list_id),
            scope.state(stat_id),
            stage.count(stat),
            stage.style(backdrop).y,
        );
    }

    // Let everything finish.
    while scope.is_animating() {
        stage.advance(FRAME);
    }
    println!("final count: {:?}", stage.count(stat));
    assert_eq!(stage.count(stat), Some(250));
    assert_eq!(stage.active_frame_requests(), 0, "frames stop when idle");

    scope.unmount();
    assert_eq!(stage.active_watchers(), 0);
    assert_eq!(stage.active_scroll_listeners(), 0);
    println!("unmounted cleanly");
}
