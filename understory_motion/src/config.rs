// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Site-wide motion defaults.
//!
//! [`MotionConfig`] gathers the defaults each binding kind starts from. With
//! the `serde` feature every section deserializes with per-field defaults, so
//! a configuration file only needs to name what it changes:
//!
//! ```toml
//! [reveal.gate]
//! threshold = 0.25
//!
//! [stagger]
//! stagger = 0.15
//!
//! [overlay]
//! headings = "h1, h2, .hero-title"
//! ```

use crate::counter::CounterOptions;
use crate::gate::GateOptions;
use crate::overlay::OverlayConfig;
use crate::stagger::StaggerOptions;
use crate::tween::AnimationDescriptor;

/// Defaults for single-target entrance animations.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RevealOptions {
    /// The recipe.
    pub descriptor: AnimationDescriptor,
    /// When it fires.
    pub gate: GateOptions,
}

/// Defaults for parallax bindings.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParallaxOptions {
    /// Pixels of translation per scrolled pixel.
    pub speed: f64,
}

impl Default for ParallaxOptions {
    fn default() -> Self {
        Self { speed: 0.3 }
    }
}

/// Every default in one place.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionConfig {
    /// Single-target entrances.
    pub reveal: RevealOptions,
    /// Staggered children.
    pub stagger: StaggerOptions,
    /// Counters.
    pub counter: CounterOptions,
    /// Parallax.
    pub parallax: ParallaxOptions,
    /// Pointer overlay.
    pub overlay: OverlayConfig,
}
