// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animatable visual properties and sparse property maps.
//!
//! A [`Style`] is a patch: hosts write only the properties it carries and
//! leave everything else on the element untouched. That lets a parallax driver
//! own `y` while an entrance animation owns `opacity` on the same element.

/// A visual property that tweens can drive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Horizontal translation in CSS pixels.
    X,
    /// Vertical translation in CSS pixels.
    Y,
    /// Uniform scale factor.
    Scale,
    /// Rotation about the vertical axis, in degrees.
    RotateY,
}

impl Property {
    /// Every property, in a stable order.
    pub const ALL: [Self; 5] = [Self::Opacity, Self::X, Self::Y, Self::Scale, Self::RotateY];

    /// The value an element has when nothing has been written.
    pub const fn resting(self) -> f64 {
        match self {
            Self::Opacity | Self::Scale => 1.0,
            Self::X | Self::Y | Self::RotateY => 0.0,
        }
    }
}

/// A sparse map from [`Property`] to value.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Style {
    /// Opacity.
    pub opacity: Option<f64>,
    /// Horizontal translation.
    pub x: Option<f64>,
    /// Vertical translation.
    pub y: Option<f64>,
    /// Uniform scale.
    pub scale: Option<f64>,
    /// Rotation about the vertical axis, in degrees.
    pub rotate_y: Option<f64>,
}

impl Style {
    /// An empty patch.
    pub const fn new() -> Self {
        Self {
            opacity: None,
            x: None,
            y: None,
            scale: None,
            rotate_y: None,
        }
    }

    /// Return a copy with `property` set to `value`.
    #[must_use]
    pub fn with(mut self, property: Property, value: f64) -> Self {
        self.set(property, value);
        self
    }

    /// Read one property.
    pub fn get(&self, property: Property) -> Option<f64> {
        match property {
            Property::Opacity => self.opacity,
            Property::X => self.x,
            Property::Y => self.y,
            Property::Scale => self.scale,
            Property::RotateY => self.rotate_y,
        }
    }

    /// Set one property.
    pub fn set(&mut self, property: Property, value: f64) {
        *self.slot(property) = Some(value);
    }

    /// Remove one property from the patch.
    pub fn clear(&mut self, property: Property) {
        *self.slot(property) = None;
    }

    fn slot(&mut self, property: Property) -> &mut Option<f64> {
        match property {
            Property::Opacity => &mut self.opacity,
            Property::X => &mut self.x,
            Property::Y => &mut self.y,
            Property::Scale => &mut self.scale,
            Property::RotateY => &mut self.rotate_y,
        }
    }

    /// Whether the patch carries no properties.
    pub fn is_empty(&self) -> bool {
        Property::ALL.iter().all(|p| self.get(*p).is_none())
    }

    /// Iterate the properties present in the patch.
    pub fn iter(&self) -> impl Iterator<Item = (Property, f64)> + '_ {
        Property::ALL
            .into_iter()
            .filter_map(|p| self.get(p).map(|v| (p, v)))
    }

    /// Overlay `patch` onto `self`; properties present in `patch` win.
    pub fn merge(&mut self, patch: &Self) {
        for (p, v) in patch.iter() {
            self.set(p, v);
        }
    }

    /// Interpolate between two patches at eased progress `t`.
    ///
    /// Every property present on either side is produced. A property missing
    /// from `from` starts at its [resting](Property::resting) value; a property
    /// missing from `to` holds its `from` value. At `t == 1.0` the result for
    /// every property carried by `to` is exactly the `to` value.
    pub fn lerp(from: &Self, to: &Self, t: f64) -> Self {
        let mut out = Self::new();
        for p in Property::ALL {
            let v = match (from.get(p), to.get(p)) {
                (None, None) => continue,
                (Some(a), None) => a,
                (_, Some(b)) if t >= 1.0 => b,
                (a, Some(b)) => {
                    let a = a.unwrap_or_else(|| p.resting());
                    a + (b - a) * t
                }
            };
            out.set(p, v);
        }
        out
    }
}
