// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The first-generation adjustment pass.
//!
//! Runs are interpolated without a noise floor and each delta is written
//! over the z attribute before the geometry is shifted by it, so the z
//! attribute of unresolved run vertices reads 0 afterwards. Connections
//! copy the value of the first run vertex with an identical key; everything
//! else gets 0. There is no sub-interpolation and no tolerance cascade.

use sewer_lite_core::{ReferenceRecord, VertexRecord};

use crate::cascade::CascadePass;
use crate::config::AdjustConfig;
use crate::interpolate::{interpolate_with, RunPass};
use crate::matcher::KeyIndex;

/// Interpolates runs the way the first-generation pass did.
pub fn interpolate_runs(
    vertices: &[VertexRecord],
    references: &[ReferenceRecord],
    config: &AdjustConfig,
) -> RunPass {
    interpolate_with(vertices, references, config, false)
}

/// Copies run values onto connection vertices by exact key.
pub fn transfer_by_key(runs: &[VertexRecord], run_values: &[f64], connections: &[VertexRecord]) -> CascadePass {
    let index = KeyIndex::build(runs.iter().map(|v| &v.key));
    let mut pass = CascadePass {
        deltas: vec![0.0; connections.len()],
        ..Default::default()
    };
    pass.stats.vertices = connections.len();

    for (i, vertex) in connections.iter().enumerate() {
        if let Some(value) = index.get(&vertex.key).and_then(|j| run_values.get(j)) {
            pass.deltas[i] = *value;
            pass.stats.exact_matches += 1;
        }
    }

    pass.stats.adjusted_vertices = pass.deltas.iter().filter(|d| **d != 0.0).count();
    tracing::info!(
        connections = pass.stats.vertices,
        matched = pass.stats.exact_matches,
        "Transferred run values onto connections"
    );
    pass
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sewer_lite_core::{KeyMode, Point3, SpatialKey};

    fn vertex(run: i64, seq: i64, x: f64, z: f64) -> VertexRecord {
        VertexRecord::new(
            Point3::new(x, 0.0, z),
            SpatialKey::derive(KeyMode::Additive, x, 0.0),
            run,
            seq,
        )
    }

    #[test]
    fn small_deltas_survive_without_noise_floor() {
        let vertices = vec![vertex(1, 0, 0.0, 9.95), vertex(1, 1, 10.0, 8.0)];
        let refs = vec![
            ReferenceRecord::new(Point3::new(0.0, 0.0, 10.0), SpatialKey::from_scalar(0.0)),
            ReferenceRecord::new(Point3::new(10.0, 0.0, 8.0), SpatialKey::from_scalar(10.0)),
        ];
        let pass = interpolate_runs(&vertices, &refs, &AdjustConfig::default());
        assert_relative_eq!(pass.deltas[0], 0.05, epsilon = 1e-12);
        assert_relative_eq!(pass.deltas[1], 0.0);
    }

    #[test]
    fn transfer_copies_exact_matches_only() {
        let runs = vec![vertex(1, 0, 0.0, 0.0), vertex(1, 1, 10.0, 0.0)];
        let connections = vec![
            vertex(5, 0, 10.0, 0.0),
            vertex(5, 1, 10.001, 0.0),
            vertex(6, 0, 0.0, 0.0),
        ];
        let pass = transfer_by_key(&runs, &[0.7, -0.4], &connections);
        assert_eq!(pass.deltas, vec![-0.4, 0.0, 0.7]);
        assert_eq!(pass.stats.exact_matches, 2);
    }
}
