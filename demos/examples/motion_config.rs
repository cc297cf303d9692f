// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Load motion defaults from TOML.
//!
//! Only the values that differ from the defaults need to be written down.
//!
//! Run:
//! - `cargo run -p understory_examples --example motion_config`

use understory_motion::config::MotionConfig;

const SITE: &str = r##"
[reveal]
descriptor = { duration = 1.0, easing = "power3.out" }

[stagger]
stagger = 0.15

[counter]
duration = 2.5
threshold = 0.5

[parallax]
speed = 0.5

[overlay]
interactive = "a, button, .card"

[overlay.palette]
ring_interactive = "#10b981"
"##;

fn main() {
    let config: MotionConfig = match toml::from_str(SITE) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid motion config: {err}");
            return;
        }
    };
    println!("reveal:   {:?}", config.reveal);
    println!("stagger:  {}s between children", config.stagger.stagger);
    println!("counter:  {:?}", config.counter);
    println!("parallax: {}", config.parallax.speed);
    println!("headings: {}", config.overlay.headings);
    println!("hover:    {}", config.overlay.classifier().allowlist());

    let rejected = toml::from_str::<MotionConfig>("[overlay]\nheadings = \"main > h1\"\n");
    println!("unsupported selector: {}", rejected.is_err());
}
