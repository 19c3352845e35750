// Behavioural properties of the interpolation and propagation passes.
use approx::assert_relative_eq;
use sewer_lite_core::{KeyMode, Point3, ReferenceRecord, SpatialKey, VertexRecord};
use sewer_lite_processing::{
    interpolate_runs, propagate, sub_interpolate, AdjustConfig, Pipeline, WarningKind,
};

fn vertex(run: i64, seq: i64, x: f64, y: f64, z: f64) -> VertexRecord {
    VertexRecord::new(
        Point3::new(x, y, z),
        SpatialKey::derive(KeyMode::Composite, x, y),
        run,
        seq,
    )
}

fn chamber(x: f64, y: f64, z: f64) -> ReferenceRecord {
    ReferenceRecord::new(Point3::new(x, y, z), SpatialKey::derive(KeyMode::Composite, x, y))
}

/// Run along the x axis from (0,0) to (10,0) with chambers at 10.0 and 8.0.
fn straight_run(zs: &[f64]) -> (Vec<VertexRecord>, Vec<ReferenceRecord>) {
    let step = 10.0 / (zs.len() - 1) as f64;
    let vertices = zs
        .iter()
        .enumerate()
        .map(|(i, &z)| vertex(1, i as i64, i as f64 * step, 0.0, z))
        .collect();
    (vertices, vec![chamber(0.0, 0.0, 10.0), chamber(10.0, 0.0, 8.0)])
}

#[test]
fn ten_nine_eight_scenario() {
    let (vertices, refs) = straight_run(&[7.0, 6.5, 5.0]);
    let pass = interpolate_runs(&vertices, &refs, &AdjustConfig::default());
    assert_relative_eq!(pass.deltas[0], 10.0 - 7.0);
    assert_relative_eq!(pass.deltas[1], 9.0 - 6.5);
    assert_relative_eq!(pass.deltas[2], 8.0 - 5.0);
}

#[test]
fn start_vertex_matches_start_chamber_and_end_vertex_reaches_end_chamber() {
    let (vertices, refs) = straight_run(&[10.0, 7.0, 6.0, 5.0, 4.0]);
    let pass = interpolate_runs(&vertices, &refs, &AdjustConfig::default());
    assert_relative_eq!(pass.deltas[0], 0.0);
    assert_relative_eq!(vertices[4].z() + pass.deltas[4], refs[1].z());
}

#[test]
fn rerunning_on_corrected_data_changes_nothing() {
    let (mut vertices, refs) = straight_run(&[3.0, 2.0, 4.0, 1.0, 0.5]);
    let config = AdjustConfig::default();
    let first = interpolate_runs(&vertices, &refs, &config);
    for (v, d) in vertices.iter_mut().zip(&first.deltas) {
        v.position.z += d;
    }
    let second = interpolate_runs(&vertices, &refs, &config);
    assert!(second.deltas.iter().all(|d| *d == 0.0));
}

#[test]
fn interpolated_elevations_do_not_rise_downstream() {
    let (vertices, refs) = straight_run(&[0.0; 11]);
    let pass = interpolate_runs(&vertices, &refs, &AdjustConfig::default());
    let new_z: Vec<f64> = vertices.iter().zip(&pass.deltas).map(|(v, d)| v.z() + d).collect();
    assert!(new_z.windows(2).all(|w| w[1] <= w[0]));
    assert_relative_eq!(new_z[5], 9.0);
}

#[test]
fn unmatched_run_warns_once_per_endpoint() {
    let vertices = vec![vertex(4, 0, 0.0, 0.0, 1.0), vertex(4, 1, 3.0, 4.0, 2.0)];
    let refs = vec![chamber(100.0, 100.0, 5.0)];
    let config = AdjustConfig::default().with_warnings(true);
    let pass = interpolate_runs(&vertices, &refs, &config);

    assert_eq!(pass.deltas, vec![0.0, 0.0]);
    let kinds: Vec<_> = pass.warnings.iter().map(|w| w.kind).collect();
    assert_eq!(
        kinds,
        vec![WarningKind::StartReferenceNotFound, WarningKind::EndReferenceNotFound]
    );
    assert!(pass.warnings.iter().all(|w| w.run_id == 4));
}

#[test]
fn one_bad_run_does_not_stop_the_batch() {
    let mut vertices = vec![vertex(1, 0, 50.0, 50.0, 1.0), vertex(1, 1, 60.0, 50.0, 1.0)];
    let (good, refs) = straight_run(&[7.0, 6.5, 5.0]);
    vertices.extend(good.into_iter().map(|mut v| {
        v.run_id = 2;
        v
    }));
    let pass = interpolate_runs(&vertices, &refs, &AdjustConfig::default());
    assert_eq!(&pass.deltas[..2], &[0.0, 0.0]);
    assert_relative_eq!(pass.deltas[3], 2.5);
    assert_eq!(pass.stats.runs, 2);
    assert_eq!(pass.stats.resolved_runs, 1);
}

#[test]
fn sub_interpolation_only_fills_zero_deltas() {
    // Middle vertex is within the noise floor, bracketed by corrected vertices.
    let (vertices, refs) = straight_run(&[9.0, 9.1, 8.95, 7.0, 7.0]);
    let config = AdjustConfig::default().with_sub_interpolation(true);
    let mut pass = interpolate_runs(&vertices, &refs, &config);
    let before = pass.deltas.clone();
    assert_eq!(before[2], 0.0);

    assert_eq!(sub_interpolate(&mut pass), 1);
    for (b, a) in before.iter().zip(&pass.deltas) {
        if *b != 0.0 {
            assert_eq!(a, b);
        }
    }
    assert_relative_eq!(pass.deltas[2], 9.0 - 8.95, epsilon = 1e-9);
}

#[test]
fn sub_interpolation_cannot_rescue_unresolved_runs() {
    let vertices = vec![
        vertex(2, 0, 0.0, 0.0, 1.0),
        vertex(2, 1, 1.0, 0.0, 1.0),
        vertex(2, 2, 2.0, 0.0, 1.0),
    ];
    let mut pass = interpolate_runs(&vertices, &[], &AdjustConfig::default());
    assert_eq!(sub_interpolate(&mut pass), 0);
    assert_eq!(pass.deltas, vec![0.0; 3]);
}

#[test]
fn cascade_leaves_distant_unmatched_vertices_alone() {
    let runs = vec![vertex(1, 0, 0.0, 0.0, 5.0), vertex(1, 1, 10.0, 0.0, 4.0)];
    let connections = vec![
        vertex(7, 0, 10.0, 0.0, 4.0).with_group(7),
        vertex(7, 1, 10.0, 6.0, 4.5).with_group(7),
        vertex(8, 0, 30.0, 6.0, 4.5).with_group(8),
    ];
    let pass = propagate(&runs, &[0.0, 0.8], &connections, &AdjustConfig::default());
    assert_relative_eq!(pass.deltas[0], 0.8);
    assert_eq!(pass.deltas[1], 0.0);
    assert_eq!(pass.deltas[2], 0.0);
}

#[test]
fn groupmate_scenario_reconciles_baselines() {
    let runs = vec![vertex(1, 0, 20.0, 20.0, 3.0)];
    let baseline_c = 0.25;
    let baseline_c2 = -0.05;
    let connections = vec![
        vertex(9, 0, 20.0, 20.0, 3.0).with_group(9).with_baseline(baseline_c),
        vertex(9, 1, 20.0, 20.002, 3.0).with_group(9).with_baseline(baseline_c2),
    ];
    let pass = propagate(&runs, &[-1.2], &connections, &AdjustConfig::default());
    assert_relative_eq!(pass.deltas[1], (baseline_c + -1.2) - baseline_c2);
}

#[test]
fn adjust_records_chains_both_passes() {
    let (runs, refs) = straight_run(&[7.0, 6.5, 5.0]);
    let connections = vec![
        vertex(3, 0, 5.0, 0.0, 6.5).with_group(3),
        vertex(3, 1, 5.0, 0.001, 6.5).with_group(3),
    ];
    let config = AdjustConfig::default();
    let adjustment = Pipeline::new(&config)
        .unwrap()
        .adjust_records(&runs, &connections, &refs);
    assert_relative_eq!(adjustment.connections.deltas[0], 2.5);
    assert_relative_eq!(adjustment.connections.deltas[1], 2.5);
}
