// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSS text for styles and overlay transitions.

use alloc::format;
use alloc::string::String;

use kurbo::Point;

use understory_motion::easing::Easing;
use understory_motion::overlay::ScaleTransition;
use understory_motion::style::{Property, Style};

/// Whether `patch` touches any property that lives in `transform`.
pub(crate) fn touches_transform(patch: &Style) -> bool {
    patch.x.is_some() || patch.y.is_some() || patch.scale.is_some() || patch.rotate_y.is_some()
}

/// The `transform` value for the composed `style`.
///
/// Missing properties use their resting values, so a style carrying only `y`
/// still produces a complete transform.
pub(crate) fn transform(style: &Style) -> String {
    let value = |p: Property| style.get(p).unwrap_or(p.resting());
    format!(
        "translate3d({}px, {}px, 0px) scale({}) rotateY({}deg)",
        value(Property::X),
        value(Property::Y),
        value(Property::Scale),
        value(Property::RotateY),
    )
}

/// A CSS `<easing-function>` for `easing`.
pub(crate) fn timing_function(easing: &Easing) -> String {
    if *easing == Easing::Linear {
        return String::from("linear");
    }
    let (x1, y1, x2, y2) = easing.css_bezier();
    format!("cubic-bezier({x1}, {y1}, {x2}, {y2})")
}

/// A `transition` value animating only the standalone `scale` property with `t`.
///
/// Position lives in `transform`, so it follows the pointer without easing.
pub(crate) fn scale_transition(t: &ScaleTransition) -> String {
    format!("scale {}s {}", t.duration, timing_function(&t.easing))
}

pub(crate) fn px(v: f64) -> String {
    format!("{v}px")
}

/// `transform` placing an element's top-left corner at `origin`.
pub(crate) fn translate(origin: Point) -> String {
    format!("translate3d({}px, {}px, 0px)", origin.x, origin.y)
}

/// Value for the standalone `scale` property.
pub(crate) fn scale(s: f64) -> String {
    format!("{s}")
}
