// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect, Size};
use understory_motion::gate::GateOptions;
use understory_motion::overlay::{Buttons, OverlayConfig, OverlayController};
use understory_motion::scope::Scope;
use understory_motion::stage::{ElementSpec, Stage};
use understory_motion::stagger::StaggerOptions;
use understory_motion::tween::AnimationDescriptor;

const FRAME: f64 = 1.0 / 60.0;

/// A column of `n` cards, each 100px tall, alternating headings and buttons.
fn card_column(n: usize) -> Rc<Stage> {
    let stage = Rc::new(Stage::new(Size::new(1280.0, 720.0)));
    for i in 0..n {
        let top = i as f64 * 100.0;
        let tag = if i % 2 == 0 { "h3" } else { "button" };
        stage.insert(
            None,
            ElementSpec::new(tag).bounds(Rect::new(0.0, top, 1280.0, top + 100.0)),
        );
    }
    stage
}

fn bench_overlay_pointer_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlay");
    for &n in &[8_usize, 64, 512] {
        let stage = card_column(n);
        let mount = OverlayController::mount(&stage, &OverlayConfig::default());
        let path: Vec<Point> = (0..240)
            .map(|i| Point::new(640.0, f64::from(i) * 3.0))
            .collect();
        group.throughput(Throughput::Elements(path.len() as u64));
        group.bench_function(format!("pointer_move_n{n}"), |b| {
            b.iter(|| {
                for &p in &path {
                    stage.pointer_move(black_box(p));
                }
            });
        });
        group.bench_function(format!("press_release_n{n}"), |b| {
            b.iter(|| {
                stage.pointer_down(Buttons::PRIMARY);
                stage.pointer_up(Buttons::PRIMARY);
            });
        });
        mount.unmount();
    }
    group.finish();
}

fn bench_frame_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("frames");
    for &n in &[16_usize, 128, 1024] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("reveal_second_n{n}"), |b| {
            b.iter_batched(
                || {
                    let stage = Rc::new(Stage::new(Size::new(1280.0, 720.0)));
                    let mut scope = Scope::mount(Rc::clone(&stage));
                    for i in 0..n {
                        let top = (i % 8) as f64 * 80.0;
                        let card = stage.insert(
                            None,
                            ElementSpec::new("div").bounds(Rect::new(0.0, top, 300.0, top + 80.0)),
                        );
                        scope.arm(card, AnimationDescriptor::fade_up(), GateOptions::default());
                    }
                    stage.refresh();
                    (stage, scope)
                },
                |(stage, scope)| {
                    for _ in 0..60 {
                        stage.advance(FRAME);
                    }
                    black_box(scope.is_animating());
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("stagger_second_n{n}"), |b| {
            b.iter_batched(
                || {
                    let stage = Rc::new(Stage::new(Size::new(1280.0, 720.0)));
                    let list = stage.insert(
                        None,
                        ElementSpec::new("ul").bounds(Rect::new(0.0, 0.0, 1280.0, 720.0)),
                    );
                    for _ in 0..n {
                        stage.insert(
                            Some(list),
                            ElementSpec::new("li").bounds(Rect::new(0.0, 0.0, 1280.0, 40.0)),
                        );
                    }
                    let mut scope = Scope::mount(Rc::clone(&stage));
                    scope.arm_group(list, StaggerOptions::default());
                    stage.refresh();
                    (stage, scope)
                },
                |(stage, scope)| {
                    for _ in 0..60 {
                        stage.advance(FRAME);
                    }
                    black_box(scope.is_animating());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_overlay_pointer_ticks, bench_frame_advance);
criterion_main!(benches);
