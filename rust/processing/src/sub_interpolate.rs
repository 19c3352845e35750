// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Second pass for vertices the linear pass left at zero.
//!
//! A zero-delta vertex lying between two corrected vertices of the same run
//! is re-interpolated between them, using cached distances from the run
//! start as the span and the neighbours' corrected elevations as anchors.
//! The noise floor is not reapplied: a bracketed vertex follows its
//! neighbours even when the correction is small.

use crate::interpolate::{PointInfo, RunPass};

/// Residuals this small are rounding noise, not corrections.
const RESIDUAL_EPSILON: f64 = 1e-9;

/// Nearest cache positions before and after `at` with a nonzero delta in the
/// same run. Searches stop at the run boundary.
fn resolved_neighbours(cache: &[PointInfo], at: usize) -> Option<(usize, usize)> {
    let run_id = cache[at].run_id;

    let before = cache[..at]
        .iter()
        .enumerate()
        .rev()
        .take_while(|(_, p)| p.run_id == run_id)
        .find(|(_, p)| p.elevation_delta != 0.0)
        .map(|(i, _)| i)?;

    let after = cache[at + 1..]
        .iter()
        .enumerate()
        .take_while(|(_, p)| p.run_id == run_id)
        .find(|(_, p)| p.elevation_delta != 0.0)
        .map(|(i, _)| at + 1 + i)?;

    Some((before, after))
}

/// Fills zero deltas from their resolved neighbours. Returns the number of
/// vertices that received a nonzero delta.
///
/// Neighbours are taken from the deltas as they were before this pass, so
/// results do not depend on visiting order. Nonzero deltas are never changed.
pub fn sub_interpolate(pass: &mut RunPass) -> usize {
    let snapshot = pass.cache.clone();
    let mut filled = 0;

    for at in 0..snapshot.len() {
        let point = &snapshot[at];
        if point.elevation_delta != 0.0 {
            continue;
        }
        let Some((before, after)) = resolved_neighbours(&snapshot, at) else {
            continue;
        };
        let prev = &snapshot[before];
        let next = &snapshot[after];

        let base_length = (next.distance_from_start - prev.distance_from_start).powi(2);
        if base_length == 0.0 {
            continue;
        }
        let to_start_length = (point.distance_from_start - prev.distance_from_start).powi(2);
        let distance_factor = (to_start_length / base_length).sqrt();

        let start_z = prev.original_z + prev.elevation_delta;
        let end_z = next.original_z + next.elevation_delta;
        let new_z = start_z - distance_factor * (start_z - end_z);
        let delta = new_z - point.original_z;
        if delta.abs() <= RESIDUAL_EPSILON {
            continue;
        }

        pass.cache[at].elevation_delta = delta;
        pass.deltas[pass.order[at]] = delta;
        filled += 1;
    }

    pass.stats.sub_interpolated += filled;
    pass.stats.adjusted_vertices += filled;
    tracing::info!(filled, "Sub-interpolated zero-delta vertices");
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn info(run_id: i64, distance: f64, z: f64, delta: f64) -> PointInfo {
        PointInfo {
            distance_from_start: distance,
            run_length: 30.0,
            elevation_delta: delta,
            run_id,
            original_z: z,
        }
    }

    fn pass_from(cache: Vec<PointInfo>) -> RunPass {
        RunPass {
            deltas: cache.iter().map(|p| p.elevation_delta).collect(),
            order: (0..cache.len()).collect(),
            resolved: vec![true; cache.len()],
            cache,
            ..Default::default()
        }
    }

    #[test]
    fn fills_zero_between_corrected_neighbours() {
        // Corrected elevations 10.0 at d=0 and 8.0 at d=20; middle vertex sat at 8.0.
        let mut pass = pass_from(vec![
            info(1, 0.0, 9.0, 1.0),
            info(1, 10.0, 8.0, 0.0),
            info(1, 20.0, 7.0, 1.0),
        ]);
        let filled = sub_interpolate(&mut pass);
        assert_eq!(filled, 1);
        assert_relative_eq!(pass.deltas[1], 1.0);
        assert_eq!(pass.stats.sub_interpolated, 1);
    }

    #[test]
    fn nonzero_deltas_are_untouched() {
        let mut pass = pass_from(vec![
            info(1, 0.0, 9.0, 1.0),
            info(1, 10.0, 5.0, 0.7),
            info(1, 20.0, 7.0, 1.0),
        ]);
        sub_interpolate(&mut pass);
        assert_eq!(pass.deltas, vec![1.0, 0.7, 1.0]);
    }

    #[test]
    fn missing_neighbour_leaves_zero() {
        let mut pass = pass_from(vec![
            info(1, 0.0, 9.0, 0.0),
            info(1, 10.0, 8.0, 1.0),
            info(1, 20.0, 7.0, 0.0),
        ]);
        assert_eq!(sub_interpolate(&mut pass), 0);
        assert_eq!(pass.deltas, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn neighbours_never_cross_runs() {
        let mut pass = pass_from(vec![
            info(1, 0.0, 9.0, 1.0),
            info(2, 0.0, 8.0, 0.0),
            info(2, 10.0, 7.0, 0.0),
            info(3, 0.0, 7.0, 1.0),
        ]);
        assert_eq!(sub_interpolate(&mut pass), 0);
    }

    #[test]
    fn vertex_on_corrected_line_stays_zero() {
        let mut pass = pass_from(vec![
            info(1, 0.0, 9.0, 1.0),
            info(1, 10.0, 9.0, 0.0),
            info(1, 20.0, 7.0, 1.0),
        ]);
        assert_eq!(sub_interpolate(&mut pass), 0);
        assert_eq!(pass.deltas[1], 0.0);
    }

    #[test]
    fn small_corrections_are_filled_when_bracketed() {
        let mut pass = pass_from(vec![
            info(1, 0.0, 9.0, 1.0),
            info(1, 10.0, 8.9, 0.0),
            info(1, 20.0, 7.0, 1.0),
        ]);
        assert_eq!(sub_interpolate(&mut pass), 1);
        assert_relative_eq!(pass.deltas[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(pass.cache[1].elevation_delta, 0.1, epsilon = 1e-12);
    }
}
