// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Advisory warnings, per-pass statistics and stage timings.

use std::time::{Duration, Instant};

use serde::Serialize;

/// Why a run could not be interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The run has fewer than two vertices.
    DegenerateRun,
    /// No reference matches the run's first vertex.
    StartReferenceNotFound,
    /// No reference matches the run's last vertex.
    EndReferenceNotFound,
    /// Both endpoints resolve to references at the same planar position.
    ZeroSpan,
}

impl WarningKind {
    pub fn message(&self) -> &'static str {
        match self {
            WarningKind::DegenerateRun => "run has fewer than two vertices",
            WarningKind::StartReferenceNotFound => "start point has no matching reference",
            WarningKind::EndReferenceNotFound => "end point has no matching reference",
            WarningKind::ZeroSpan => "start and end references coincide",
        }
    }
}

/// An operator-visible advisory about one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub run_id: i64,
    /// Input position of the run's first vertex.
    pub vertex_index: usize,
    pub kind: WarningKind,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "run {} (vertex {}): {}",
            self.run_id,
            self.vertex_index,
            self.kind.message()
        )
    }
}

/// Counters for the run interpolation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub vertices: usize,
    pub runs: usize,
    pub resolved_runs: usize,
    /// Vertices whose delta is nonzero after interpolation.
    pub adjusted_vertices: usize,
    /// Vertices given a delta by sub-interpolation.
    pub sub_interpolated: usize,
}

/// Counters for the connection propagation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CascadeStats {
    pub vertices: usize,
    pub exact_matches: usize,
    pub group_snaps: usize,
    pub cross_group_snaps: usize,
    pub final_snaps: usize,
    /// Vertices whose delta is nonzero after propagation.
    pub adjusted_vertices: usize,
}

/// Wall-clock duration of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageTiming {
    pub stage: String,
    pub millis: f64,
}

/// Summary of one adjustment invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdjustReport {
    pub label: String,
    pub runs: RunStats,
    pub connections: CascadeStats,
    pub warnings: Vec<Warning>,
    pub timings: Vec<StageTiming>,
}

impl AdjustReport {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    /// Serializes the report to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Measures one stage and logs its duration when finished.
pub(crate) struct StageTimer {
    stage: &'static str,
    started: Instant,
}

impl StageTimer {
    pub(crate) fn start(stage: &'static str) -> Self {
        tracing::debug!(stage, "Stage started");
        Self {
            stage,
            started: Instant::now(),
        }
    }

    pub(crate) fn finish(self, report: &mut AdjustReport) -> Duration {
        let elapsed = self.started.elapsed();
        let millis = elapsed.as_secs_f64() * 1000.0;
        tracing::info!(stage = self.stage, elapsed_ms = millis, "Stage complete");
        report.timings.push(StageTiming {
            stage: self.stage.to_string(),
            millis,
        });
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_display_names_run_and_vertex() {
        let w = Warning {
            run_id: 12,
            vertex_index: 40,
            kind: WarningKind::EndReferenceNotFound,
        };
        assert_eq!(w.to_string(), "run 12 (vertex 40): end point has no matching reference");
    }

    #[test]
    fn timer_records_stage() {
        let mut report = AdjustReport::new("test");
        StageTimer::start("setup").finish(&mut report);
        assert_eq!(report.timings.len(), 1);
        assert_eq!(report.timings[0].stage, "setup");
        assert!(report.timings[0].millis >= 0.0);
    }

    #[test]
    fn report_serializes_warning_kinds_in_snake_case() {
        let mut report = AdjustReport::new("job");
        report.warnings.push(Warning {
            run_id: 1,
            vertex_index: 0,
            kind: WarningKind::StartReferenceNotFound,
        });
        let json = report.to_json().unwrap();
        assert!(json.contains("start_reference_not_found"));
        assert!(json.contains("\"label\": \"job\""));
    }
}
