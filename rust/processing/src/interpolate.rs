// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Linear elevation interpolation along runs.
//!
//! Each resolvable run is stretched between the invert levels of the chambers
//! at its two ends. A vertex's fractional position is its planar distance from
//! the start chamber divided by the chamber-to-chamber distance. The fraction
//! is not clamped: vertices beyond the span extrapolate along the same slope.

use sewer_lite_core::{planar_distance_sq, Point3, ReferenceRecord, VertexRecord};

use crate::config::AdjustConfig;
use crate::endpoints::{group_runs, resolve_endpoints, Endpoints};
use crate::matcher::ReferenceMatcher;
use crate::report::{RunStats, Warning, WarningKind};

/// Per-vertex interpolation state, in run/sequence order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointInfo {
    pub distance_from_start: f64,
    pub run_length: f64,
    pub elevation_delta: f64,
    pub run_id: i64,
    pub original_z: f64,
}

/// Output of the run interpolation pass.
#[derive(Debug, Clone, Default)]
pub struct RunPass {
    /// One delta per input vertex, in input order.
    pub deltas: Vec<f64>,
    /// Cache entries in run/sequence order.
    pub cache: Vec<PointInfo>,
    /// `order[i]` is the input position of `cache[i]`.
    pub order: Vec<usize>,
    /// Whether each input vertex belongs to a resolved run.
    pub resolved: Vec<bool>,
    pub warnings: Vec<Warning>,
    pub stats: RunStats,
}

/// Elevation at `position` on the line from `start` to `end`.
///
/// Returns `None` when the two anchors share a planar position.
pub fn interpolate_elevation(position: &Point3<f64>, start: &Point3<f64>, end: &Point3<f64>) -> Option<f64> {
    let base_length = planar_distance_sq(start, end);
    if base_length == 0.0 {
        return None;
    }
    let to_start_length = planar_distance_sq(position, start);
    let distance_factor = (to_start_length / base_length).sqrt();
    Some(start.z - distance_factor * (start.z - end.z))
}

/// Interpolates every run against its endpoint references.
pub fn interpolate_runs(
    vertices: &[VertexRecord],
    references: &[ReferenceRecord],
    config: &AdjustConfig,
) -> RunPass {
    interpolate_with(vertices, references, config, true)
}

pub(crate) fn interpolate_with(
    vertices: &[VertexRecord],
    references: &[ReferenceRecord],
    config: &AdjustConfig,
    noise_floor: bool,
) -> RunPass {
    let matcher = ReferenceMatcher::new(references);
    let runs = group_runs(vertices);

    let mut pass = RunPass {
        deltas: vec![0.0; vertices.len()],
        cache: Vec::with_capacity(vertices.len()),
        order: Vec::with_capacity(vertices.len()),
        resolved: vec![false; vertices.len()],
        ..Default::default()
    };
    pass.stats.vertices = vertices.len();
    pass.stats.runs = runs.len();

    for run in &runs {
        let endpoints = resolve_endpoints(run, vertices, &matcher).and_then(|ends| {
            if planar_distance_sq(&ends.start_ref.position, &ends.end_ref.position) == 0.0 {
                Err(vec![WarningKind::ZeroSpan])
            } else {
                Ok(ends)
            }
        });

        match endpoints {
            Ok(ends) => {
                pass.stats.resolved_runs += 1;
                adjust_run(&mut pass, &run.members, run.run_id, vertices, &ends, config, noise_floor);
            }
            Err(reasons) => {
                let first = run.first().unwrap_or_default();
                for kind in reasons {
                    let warning = Warning {
                        run_id: run.run_id,
                        vertex_index: first,
                        kind,
                    };
                    if config.emit_warnings {
                        tracing::warn!(label = %config.label, "{}", warning);
                        pass.warnings.push(warning);
                    } else {
                        tracing::debug!("{}", warning);
                    }
                }
                cache_unresolved(&mut pass, &run.members, run.run_id, vertices);
            }
        }
    }

    pass.stats.adjusted_vertices = pass.deltas.iter().filter(|d| **d != 0.0).count();
    tracing::info!(
        runs = pass.stats.runs,
        resolved = pass.stats.resolved_runs,
        adjusted = pass.stats.adjusted_vertices,
        "Interpolated run elevations"
    );
    pass
}

fn adjust_run(
    pass: &mut RunPass,
    members: &[usize],
    run_id: i64,
    vertices: &[VertexRecord],
    ends: &Endpoints<'_>,
    config: &AdjustConfig,
    noise_floor: bool,
) {
    let start = &ends.start_ref.position;
    let end = &ends.end_ref.position;
    let run_length = planar_distance_sq(start, end).sqrt();

    for &i in members {
        let vertex = &vertices[i];
        // Span is nonzero here, so interpolation always yields a value.
        let new_z = interpolate_elevation(&vertex.position, start, end).unwrap_or(vertex.z());
        let mut delta = new_z - vertex.z();
        if noise_floor {
            delta = config.apply_noise_floor(delta);
        }

        pass.cache.push(PointInfo {
            distance_from_start: planar_distance_sq(&vertex.position, start).sqrt(),
            run_length,
            elevation_delta: delta,
            run_id,
            original_z: vertex.z(),
        });
        pass.order.push(i);
        pass.resolved[i] = true;
    }

    // Write back only once the whole run is cached.
    let from = pass.cache.len() - members.len();
    for (info, &i) in pass.cache[from..].iter().zip(&pass.order[from..]) {
        pass.deltas[i] = info.elevation_delta;
    }
    tracing::debug!(run_id, vertices = members.len(), "Run interpolated");
}

fn cache_unresolved(pass: &mut RunPass, members: &[usize], run_id: i64, vertices: &[VertexRecord]) {
    let Some(&first) = members.first() else {
        return;
    };
    let origin = &vertices[first].position;
    let run_length = members
        .last()
        .map(|&l| planar_distance_sq(origin, &vertices[l].position).sqrt())
        .unwrap_or(0.0);

    for &i in members {
        pass.cache.push(PointInfo {
            distance_from_start: planar_distance_sq(&vertices[i].position, origin).sqrt(),
            run_length,
            elevation_delta: 0.0,
            run_id,
            original_z: vertices[i].z(),
        });
        pass.order.push(i);
    }
}
