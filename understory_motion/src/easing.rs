// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing curves for tweens.
//!
//! The polynomial families follow the common `powerN` naming: `power1` is
//! quadratic, `power2` cubic, `power3` quartic, and `power4` quintic. Names
//! parse from and render to strings so curves can live in configuration.
//!
//! ```
//! use understory_motion::easing::{Easing, Power};
//!
//! let e: Easing = "power2.out".parse().unwrap();
//! assert_eq!(e, Easing::Out(Power::Power2));
//! assert_eq!(e.evaluate(0.0), 0.0);
//! assert_eq!(e.evaluate(1.0), 1.0);
//! assert!(e.evaluate(0.5) > 0.5, "ease-out runs ahead of linear");
//! ```

use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use crate::error::ParseError;

/// Degree family for the polynomial curves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Power {
    /// Quadratic.
    Power1,
    /// Cubic.
    Power2,
    /// Quartic.
    Power3,
    /// Quintic.
    Power4,
}

impl Power {
    const fn exponent(self) -> u32 {
        match self {
            Self::Power1 => 2,
            Self::Power2 => 3,
            Self::Power3 => 4,
            Self::Power4 => 5,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Power1 => "power1",
            Self::Power2 => "power2",
            Self::Power3 => "power3",
            Self::Power4 => "power4",
        }
    }
}

/// A timing curve mapping linear progress in `[0, 1]` to eased progress.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum Easing {
    /// No easing.
    Linear,
    /// Accelerating from zero velocity.
    In(Power),
    /// Decelerating to zero velocity.
    Out(Power),
    /// Accelerating until halfway, then decelerating.
    InOut(Power),
    /// CSS-style cubic Bézier with control points `(x1, y1)` and `(x2, y2)`.
    ///
    /// `x1` and `x2` are expected in `[0, 1]`; they are clamped on evaluation.
    CubicBezier {
        /// First control point x.
        x1: f64,
        /// First control point y.
        y1: f64,
        /// Second control point x.
        x2: f64,
        /// Second control point y.
        y2: f64,
    },
}

impl Default for Easing {
    fn default() -> Self {
        Self::Out(Power::Power2)
    }
}

impl Easing {
    /// Evaluate the curve at `t`, clamped to `[0, 1]`.
    ///
    /// Every curve returns exactly `0.0` at `t <= 0` and `1.0` at `t >= 1`.
    pub fn evaluate(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Self::Linear => t,
            Self::In(p) => pow(t, p.exponent()),
            Self::Out(p) => 1.0 - pow(1.0 - t, p.exponent()),
            Self::InOut(p) => {
                let n = p.exponent();
                if t < 0.5 {
                    pow(2.0 * t, n) / 2.0
                } else {
                    1.0 - pow(2.0 * (1.0 - t), n) / 2.0
                }
            }
            Self::CubicBezier { x1, y1, x2, y2 } => {
                let x1 = x1.clamp(0.0, 1.0);
                let x2 = x2.clamp(0.0, 1.0);
                let s = solve_bezier_x(x1, x2, t);
                bezier(y1, y2, s)
            }
        }
    }

    /// Control points of an equivalent (or closely fitting) CSS
    /// `cubic-bezier()` timing function, for hosts that hand timing to CSS.
    pub fn css_bezier(&self) -> (f64, f64, f64, f64) {
        use Power::*;
        match *self {
            Self::Linear => (0.0, 0.0, 1.0, 1.0),
            Self::In(Power1) => (0.55, 0.085, 0.68, 0.53),
            Self::In(Power2) => (0.55, 0.055, 0.675, 0.19),
            Self::In(Power3) => (0.895, 0.03, 0.685, 0.22),
            Self::In(Power4) => (0.755, 0.05, 0.855, 0.06),
            Self::Out(Power1) => (0.25, 0.46, 0.45, 0.94),
            Self::Out(Power2) => (0.215, 0.61, 0.355, 1.0),
            Self::Out(Power3) => (0.165, 0.84, 0.44, 1.0),
            Self::Out(Power4) => (0.23, 1.0, 0.32, 1.0),
            Self::InOut(Power1) => (0.455, 0.03, 0.515, 0.955),
            Self::InOut(Power2) => (0.645, 0.045, 0.355, 1.0),
            Self::InOut(Power3) => (0.77, 0.0, 0.175, 1.0),
            Self::InOut(Power4) => (0.86, 0.0, 0.07, 1.0),
            Self::CubicBezier { x1, y1, x2, y2 } => (x1, y1, x2, y2),
        }
    }
}

fn pow(base: f64, exp: u32) -> f64 {
    let mut acc = 1.0;
    for _ in 0..exp {
        acc *= base;
    }
    acc
}

/// One coordinate of a unit cubic Bézier with endpoints 0 and 1.
fn bezier(p1: f64, p2: f64, s: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * s * p1 + 3.0 * ms * s * s * p2 + s * s * s
}

fn bezier_derivative(p1: f64, p2: f64, s: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * p1 + 6.0 * ms * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Find the curve parameter whose x equals `x`: Newton first, bisection if it stalls.
fn solve_bezier_x(x1: f64, x2: f64, x: f64) -> f64 {
    const EPS: f64 = 1e-7;
    let mut s = x;
    for _ in 0..8 {
        let err = bezier(x1, x2, s) - x;
        if abs(err) < EPS {
            return s;
        }
        let d = bezier_derivative(x1, x2, s);
        if abs(d) < EPS {
            break;
        }
        s = (s - err / d).clamp(0.0, 1.0);
    }
    let (mut lo, mut hi) = (0.0, 1.0);
    s = x;
    for _ in 0..40 {
        let v = bezier(x1, x2, s);
        if abs(v - x) < EPS {
            break;
        }
        if v < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}

fn abs(v: f64) -> f64 {
    if v < 0.0 { -v } else { v }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::In(p) => write!(f, "{}.in", p.name()),
            Self::Out(p) => write!(f, "{}.out", p.name()),
            Self::InOut(p) => write!(f, "{}.inOut", p.name()),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }
}

impl FromStr for Easing {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("linear") || name.eq_ignore_ascii_case("none") {
            return Ok(Self::Linear);
        }
        if let Some(args) = name
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_bezier(args).ok_or_else(|| ParseError::UnknownEasing(s.to_string()));
        }
        let (family, direction) = name.split_once('.').unwrap_or((name, "out"));
        let power = match family {
            "power1" | "quad" => Power::Power1,
            "power2" | "cubic" => Power::Power2,
            "power3" | "quart" => Power::Power3,
            "power4" | "quint" | "strong" => Power::Power4,
            "power0" => return Ok(Self::Linear),
            _ => return Err(ParseError::UnknownEasing(s.to_string())),
        };
        match direction {
            "in" => Ok(Self::In(power)),
            "out" => Ok(Self::Out(power)),
            "inOut" => Ok(Self::InOut(power)),
            _ => Err(ParseError::UnknownEasing(s.to_string())),
        }
    }
}

fn parse_bezier(args: &str) -> Option<Easing> {
    let mut it = args.split(',').map(|v| v.trim().parse::<f64>());
    let x1 = it.next()?.ok()?;
    let y1 = it.next()?.ok()?;
    let x2 = it.next()?.ok()?;
    let y2 = it.next()?.ok()?;
    if it.next().is_some() {
        return None;
    }
    Some(Easing::CubicBezier { x1, y1, x2, y2 })
}

impl TryFrom<String> for Easing {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(value: Easing) -> Self {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn close(a: f64, b: f64) -> bool {
        abs(a - b) < EPS
    }

    #[test]
    fn endpoints_are_exact_for_every_curve() {
        let curves = [
            Easing::Linear,
            Easing::In(Power::Power1),
            Easing::Out(Power::Power2),
            Easing::InOut(Power::Power3),
            Easing::CubicBezier {
                x1: 0.25,
                y1: 0.1,
                x2: 0.25,
                y2: 1.0,
            },
        ];
        for c in curves {
            assert_eq!(c.evaluate(0.0), 0.0, "{c} at 0");
            assert_eq!(c.evaluate(1.0), 1.0, "{c} at 1");
            assert_eq!(c.evaluate(-3.0), 0.0, "{c} clamps below");
            assert_eq!(c.evaluate(7.0), 1.0, "{c} clamps above");
        }
    }

    #[test]
    fn power2_out_is_cubic_ease_out() {
        let e = Easing::Out(Power::Power2);
        assert!(close(e.evaluate(0.5), 0.875), "1 - 0.5^3");
        assert!(close(e.evaluate(0.25), 1.0 - 0.75 * 0.75 * 0.75));
    }

    #[test]
    fn in_out_is_symmetric() {
        let e = Easing::InOut(Power::Power1);
        assert!(close(e.evaluate(0.5), 0.5));
        assert!(close(e.evaluate(0.2) + e.evaluate(0.8), 1.0));
    }

    #[test]
    fn css_ease_bezier_matches_reference_midpoint() {
        let ease = Easing::CubicBezier {
            x1: 0.25,
            y1: 0.1,
            x2: 0.25,
            y2: 1.0,
        };
        let mid = ease.evaluate(0.5);
        assert!(mid > 0.78 && mid < 0.82, "CSS `ease` at 0.5 is ~0.802, got {mid}");
        // Linear control points reproduce linear progress.
        let lin = Easing::CubicBezier {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
        };
        assert!(abs(lin.evaluate(0.3) - 0.3) < 1e-4);
    }

    #[test]
    fn parses_common_names() {
        assert_eq!("linear".parse::<Easing>(), Ok(Easing::Linear));
        assert_eq!("none".parse::<Easing>(), Ok(Easing::Linear));
        assert_eq!("power2".parse::<Easing>(), Ok(Easing::Out(Power::Power2)));
        assert_eq!("quad.in".parse::<Easing>(), Ok(Easing::In(Power::Power1)));
        assert_eq!(
            "power4.inOut".parse::<Easing>(),
            Ok(Easing::InOut(Power::Power4))
        );
        assert_eq!(
            "cubic-bezier(0.4, 0, 0.2, 1)".parse::<Easing>(),
            Ok(Easing::CubicBezier {
                x1: 0.4,
                y1: 0.0,
                x2: 0.2,
                y2: 1.0
            })
        );
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(
            "elastic.out".parse::<Easing>(),
            Err(ParseError::UnknownEasing("elastic.out".into()))
        );
        assert!("power2.sideways".parse::<Easing>().is_err());
        assert!("cubic-bezier(1, 2)".parse::<Easing>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for e in [
            Easing::Linear,
            Easing::In(Power::Power3),
            Easing::InOut(Power::Power1),
        ] {
            let text = format!("{e}");
            assert_eq!(text.parse::<Easing>(), Ok(e));
        }
    }
}
