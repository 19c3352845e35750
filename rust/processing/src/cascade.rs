// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cascading propagation of run corrections onto connection vertices.
//!
//! Connections are not linked to runs topologically. A connection vertex is
//! seeded when its key equals a run vertex key; the run vertex's delta then
//! spreads to connection vertices that lie within the coincidence tolerance,
//! in up to three further hops:
//!
//! 1. **exact match**: the seed takes `run delta - baseline(seed)`
//! 2. **group snap**: vertices of the seed's group near the seed
//! 3. **cross-group snap**: untouched vertices of any group near a level 2 vertex
//! 4. **final snap**: untouched vertices near a level 3 vertex
//!
//! Each hop composes deltas against baselines:
//! `delta(target) = (baseline(source vertex) + run delta) - baseline(target)`,
//! so every vertex keeps its own prior correction. Vertices reached by no
//! hop keep a zero delta.
//!
//! Seeds are processed in input order; a later seed overwrites what an
//! earlier chain assigned.

use rustc_hash::FxHashSet;
use sewer_lite_core::{SpatialGrid, VertexRecord};

use crate::config::AdjustConfig;
use crate::matcher::KeyIndex;
use crate::report::CascadeStats;

/// Output of the propagation pass.
#[derive(Debug, Clone, Default)]
pub struct CascadePass {
    /// One delta per connection vertex, in input order.
    pub deltas: Vec<f64>,
    pub stats: CascadeStats,
}

/// Propagates `run_deltas` (aligned with `runs`) onto `connections`.
pub fn propagate(
    runs: &[VertexRecord],
    run_deltas: &[f64],
    connections: &[VertexRecord],
    config: &AdjustConfig,
) -> CascadePass {
    let run_index = KeyIndex::build(runs.iter().map(|v| &v.key));
    let grid = SpatialGrid::from_keys(connections.iter().map(|v| &v.key), config.tolerance);
    let baseline: Vec<f64> = connections.iter().map(|v| v.baseline).collect();

    let mut pass = CascadePass {
        deltas: vec![0.0; connections.len()],
        stats: CascadeStats {
            vertices: connections.len(),
            ..Default::default()
        },
    };

    tracing::debug!(
        run_keys = run_index.len(),
        connection_points = grid.len(),
        "Built key indexes"
    );
    if run_index.is_empty() || grid.is_empty() {
        return pass;
    }

    let near = |i: usize| grid.find_all_near(&connections[i].key, config.tolerance);

    for seed in 0..connections.len() {
        let Some(run_vertex) = run_index.get(&connections[seed].key) else {
            continue;
        };
        let source = run_deltas.get(run_vertex).copied().unwrap_or(0.0);
        pass.stats.exact_matches += 1;
        pass.deltas[seed] = source - baseline[seed];

        let mut touched = FxHashSet::default();
        touched.insert(seed);
        let reconcile = |from: usize, to: usize| (baseline[from] + source) - baseline[to];

        let group = connections[seed].group();
        let mut level2 = Vec::new();
        for k in near(seed) {
            if connections[k].group() == group && touched.insert(k) {
                pass.deltas[k] = reconcile(seed, k);
                level2.push(k);
            }
        }
        if level2.is_empty() {
            // Nothing in the group snapped; keep the run delta above the noise floor.
            pass.deltas[seed] = config.apply_noise_floor(source);
        }
        pass.stats.group_snaps += level2.len();

        let mut level3 = Vec::new();
        for &k in &level2 {
            for m in near(k) {
                if touched.insert(m) {
                    pass.deltas[m] = reconcile(k, m);
                    level3.push(m);
                }
            }
        }
        pass.stats.cross_group_snaps += level3.len();

        for &m in &level3 {
            for q in near(m) {
                if touched.insert(q) {
                    pass.deltas[q] = reconcile(m, q);
                    pass.stats.final_snaps += 1;
                }
            }
        }

        tracing::debug!(
            seed,
            run_vertex,
            reached = touched.len(),
            "Propagated run delta"
        );
    }

    pass.stats.adjusted_vertices = pass.deltas.iter().filter(|d| **d != 0.0).count();
    tracing::info!(
        connections = pass.stats.vertices,
        exact = pass.stats.exact_matches,
        snapped = pass.stats.group_snaps + pass.stats.cross_group_snaps + pass.stats.final_snaps,
        adjusted = pass.stats.adjusted_vertices,
        "Propagated corrections onto connections"
    );
    pass
}
