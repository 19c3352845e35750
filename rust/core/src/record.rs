// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed vertex and reference records.

use nalgebra::{Point3, Vector2};
use crate::keys::SpatialKey;

/// One sample point of a run or connection.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexRecord {
    pub position: Point3<f64>,
    pub key: SpatialKey,
    pub run_id: i64,
    pub sequence: i64,
    /// Originating run for connection vertices.
    pub group_id: Option<i64>,
    /// Pre-adjustment value of the delta field.
    pub baseline: f64,
    /// Computed correction to apply to `z`.
    pub elevation_delta: f64,
}

impl VertexRecord {
    pub fn new(position: Point3<f64>, key: SpatialKey, run_id: i64, sequence: i64) -> Self {
        Self {
            position,
            key,
            run_id,
            sequence,
            group_id: None,
            baseline: 0.0,
            elevation_delta: 0.0,
        }
    }

    pub fn with_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = baseline;
        self
    }

    /// Group used by the cascade; falls back to the run id.
    pub fn group(&self) -> i64 {
        self.group_id.unwrap_or(self.run_id)
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }
}

/// One authoritative invert-elevation sample, one per chamber.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRecord {
    pub position: Point3<f64>,
    pub key: SpatialKey,
}

impl ReferenceRecord {
    pub fn new(position: Point3<f64>, key: SpatialKey) -> Self {
        Self { position, key }
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }
}

/// Squared planar (XY) distance between two points.
pub fn planar_distance_sq(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    Vector2::new(a.x - b.x, a.y - b.y).norm_squared()
}
