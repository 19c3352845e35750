// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial identity keys derived from planar coordinates.
//!
//! A [`SpatialKey`] joins a line vertex to the chamber it starts or ends at,
//! and joins connection vertices to run vertices. Two derivation modes exist:
//!
//! - [`KeyMode::Composite`] keeps the exact `(x, y)` pair. Equality is bitwise
//!   per coordinate, so two distinct points never share a key.
//! - [`KeyMode::Additive`] reduces the pair to `x + y`. Different points can
//!   collide (`(1, 2)` and `(2, 1)`), so this mode exists only to reproduce
//!   datasets keyed that way.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// How a [`SpatialKey`] is derived from a coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    /// Exact `(x, y)` pair.
    #[default]
    Composite,
    /// Scalar `x + y`.
    Additive,
}

impl KeyMode {
    /// Returns the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyMode::Composite => "composite",
            KeyMode::Additive => "additive",
        }
    }
}

impl std::fmt::Display for KeyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KeyMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "composite" => Ok(KeyMode::Composite),
            "additive" => Ok(KeyMode::Additive),
            other => Err(format!("unknown key mode: {other}")),
        }
    }
}

/// A spatial identity key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SpatialKey {
    Composite { x: f64, y: f64 },
    Additive { sum: f64 },
}

impl SpatialKey {
    /// Derives a key from a coordinate pair.
    pub fn derive(mode: KeyMode, x: f64, y: f64) -> Self {
        match mode {
            KeyMode::Composite => SpatialKey::Composite { x, y },
            KeyMode::Additive => SpatialKey::Additive { sum: x + y },
        }
    }

    /// Wraps a stored scalar key value (an additive key read from an attribute).
    pub fn from_scalar(sum: f64) -> Self {
        SpatialKey::Additive { sum }
    }

    /// Returns the mode this key was derived with.
    pub fn mode(&self) -> KeyMode {
        match self {
            SpatialKey::Composite { .. } => KeyMode::Composite,
            SpatialKey::Additive { .. } => KeyMode::Additive,
        }
    }

    /// Returns the planar coordinates used for tolerance comparisons.
    ///
    /// Additive keys are one-dimensional and sit on the x axis.
    pub fn plane_coords(&self) -> (f64, f64) {
        match *self {
            SpatialKey::Composite { x, y } => (x, y),
            SpatialKey::Additive { sum } => (sum, 0.0),
        }
    }

    /// Planar distance between two keys, or `None` if their modes differ.
    pub fn distance(&self, other: &SpatialKey) -> Option<f64> {
        if self.mode() != other.mode() {
            return None;
        }
        let (ax, ay) = self.plane_coords();
        let (bx, by) = other.plane_coords();
        Some(((ax - bx).powi(2) + (ay - by).powi(2)).sqrt())
    }

    /// Returns `true` if `other` lies within `tolerance` (inclusive) of this key.
    pub fn within(&self, other: &SpatialKey, tolerance: f64) -> bool {
        self.distance(other).is_some_and(|d| d <= tolerance)
    }

    fn bits(&self) -> (u8, u64, u64) {
        match *self {
            SpatialKey::Composite { x, y } => (0, canonical_bits(x), canonical_bits(y)),
            SpatialKey::Additive { sum } => (1, canonical_bits(sum), 0),
        }
    }
}

/// Bit pattern with `-0.0` folded onto `0.0`.
fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

impl PartialEq for SpatialKey {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for SpatialKey {}

impl Hash for SpatialKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl std::fmt::Display for SpatialKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpatialKey::Composite { x, y } => write!(f, "({x}, {y})"),
            SpatialKey::Additive { sum } => write!(f, "{sum}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn composite_keys_do_not_collide() {
        let a = SpatialKey::derive(KeyMode::Composite, 1.0, 2.0);
        let b = SpatialKey::derive(KeyMode::Composite, 2.0, 1.0);
        assert_ne!(a, b);
    }

    #[test]
    fn additive_keys_collide_on_swapped_coordinates() {
        let a = SpatialKey::derive(KeyMode::Additive, 1.0, 2.0);
        let b = SpatialKey::derive(KeyMode::Additive, 2.0, 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn negative_zero_equals_zero() {
        let a = SpatialKey::derive(KeyMode::Composite, 0.0, 5.0);
        let b = SpatialKey::derive(KeyMode::Composite, -0.0, 5.0);
        assert_eq!(a, b);

        let mut set = FxHashSet::default();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn tolerance_is_inclusive_and_mode_aware() {
        let a = SpatialKey::derive(KeyMode::Composite, 10.0, 10.0);
        let b = SpatialKey::derive(KeyMode::Composite, 10.002, 10.0);
        let c = SpatialKey::derive(KeyMode::Composite, 10.01, 10.0);
        assert!(a.within(&b, 0.003));
        assert!(!a.within(&c, 0.003));

        let s = SpatialKey::derive(KeyMode::Additive, 10.0, 10.0);
        assert_eq!(a.distance(&s), None);
        assert!(!a.within(&s, 1.0e9));
    }

    #[test]
    fn key_mode_parsing() {
        assert_eq!("Composite".parse::<KeyMode>(), Ok(KeyMode::Composite));
        assert_eq!(" additive ".parse::<KeyMode>(), Ok(KeyMode::Additive));
        assert!("hash".parse::<KeyMode>().is_err());
        assert_eq!(KeyMode::default().to_string(), "composite");
    }
}
