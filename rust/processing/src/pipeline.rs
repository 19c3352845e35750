// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end adjustment: copy, explode, interpolate, propagate, rebuild.
//!
//! Stages run strictly in order and each is timed:
//!
//! 1. copy the three inputs to their output names
//! 2. explode run and connection lines into vertex points
//! 3. interpolate run vertices against the chambers (plus sub-interpolation)
//! 4. propagate run corrections onto connection vertices
//! 5. rebuild lines from the adjusted points
//!
//! Deltas are written back only after a whole pass is computed.

use sewer_lite_core::{fields, FieldMapping, ReferenceRecord, VertexRecord};

use crate::cascade::{propagate, CascadePass};
use crate::config::{AdjustConfig, PassVariant};
use crate::engine::GeometryEngine;
use crate::error::Result;
use crate::interpolate::{interpolate_runs, RunPass};
use crate::legacy;
use crate::report::{AdjustReport, StageTimer};
use crate::sub_interpolate::sub_interpolate;

/// Key attribute written onto run vertex points.
pub const RUN_KEY_FIELD: &str = "r_XY";
/// Key attribute written onto connection vertex points.
pub const CONNECTION_KEY_FIELD: &str = "c_XY";

/// Names of the three input feature classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputNames {
    pub runs: String,
    pub connections: String,
    pub references: String,
}

/// Names of every feature class the pipeline creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    pub runs: String,
    pub connections: String,
    pub references: String,
    pub run_points: String,
    pub connection_points: String,
    pub run_lines: String,
    pub connection_lines: String,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            runs: "runs_out".into(),
            connections: "connections_out".into(),
            references: "references_out".into(),
            run_points: "runs_out_points".into(),
            connection_points: "connections_out_points".into(),
            run_lines: "runs_out_lines".into(),
            connection_lines: "connections_out_lines".into(),
        }
    }
}

impl OutputNames {
    /// Every output class name.
    pub fn names(&self) -> [&str; 7] {
        [
            self.runs.as_str(),
            self.connections.as_str(),
            self.references.as_str(),
            self.run_points.as_str(),
            self.connection_points.as_str(),
            self.run_lines.as_str(),
            self.connection_lines.as_str(),
        ]
    }
}

/// Result of adjusting in-memory records.
#[derive(Debug, Clone, Default)]
pub struct Adjustment {
    pub runs: RunPass,
    pub connections: CascadePass,
}

/// Drives one adjustment invocation.
#[derive(Debug)]
pub struct Pipeline<'a> {
    config: &'a AdjustConfig,
    outputs: OutputNames,
}

impl<'a> Pipeline<'a> {
    /// Validates `config`; malformed configurations fail here, before any work.
    pub fn new(config: &'a AdjustConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            outputs: OutputNames::default(),
        })
    }

    pub fn with_outputs(mut self, outputs: OutputNames) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn outputs(&self) -> &OutputNames {
        &self.outputs
    }

    /// Field that receives computed values.
    ///
    /// The legacy pass overwrites the z attribute itself.
    pub fn delta_field(&self) -> &'static str {
        match self.config.variant {
            PassVariant::Improved => fields::DELTA_Z,
            PassVariant::Legacy => fields::POINT_Z,
        }
    }

    /// Interpolates run vertices, with sub-interpolation when enabled.
    pub fn adjust_runs(&self, runs: &[VertexRecord], references: &[ReferenceRecord]) -> RunPass {
        match self.config.variant {
            PassVariant::Improved => {
                let mut pass = interpolate_runs(runs, references, self.config);
                if self.config.enable_sub_interpolation {
                    sub_interpolate(&mut pass);
                }
                pass
            }
            PassVariant::Legacy => legacy::interpolate_runs(runs, references, self.config),
        }
    }

    /// Carries run deltas (aligned with `runs`) onto connection vertices.
    pub fn adjust_connections(
        &self,
        runs: &[VertexRecord],
        run_deltas: &[f64],
        connections: &[VertexRecord],
    ) -> CascadePass {
        match self.config.variant {
            PassVariant::Improved => propagate(runs, run_deltas, connections, self.config),
            PassVariant::Legacy => legacy::transfer_by_key(runs, run_deltas, connections),
        }
    }

    /// Runs both passes on already extracted records.
    pub fn adjust_records(
        &self,
        runs: &[VertexRecord],
        connections: &[VertexRecord],
        references: &[ReferenceRecord],
    ) -> Adjustment {
        let run_pass = self.adjust_runs(runs, references);
        let cascade = self.adjust_connections(runs, &run_pass.deltas, connections);
        Adjustment {
            runs: run_pass,
            connections: cascade,
        }
    }

    /// Runs every stage against `engine`.
    pub fn run<E: GeometryEngine>(&self, engine: &mut E, inputs: &InputNames) -> Result<AdjustReport> {
        let config = self.config;
        let out = &self.outputs;
        let mut report = AdjustReport::new(&config.label);
        tracing::info!(
            label = %config.label,
            variant = ?config.variant,
            key_mode = %config.key_mode,
            sub_interpolation = config.enable_sub_interpolation,
            "Starting elevation adjustment"
        );

        let timer = StageTimer::start("setup");
        engine.copy_feature(&inputs.runs, &out.runs)?;
        engine.copy_feature(&inputs.connections, &out.connections)?;
        engine.copy_feature(&inputs.references, &out.references)?;
        timer.finish(&mut report);

        let timer = StageTimer::start("convert to points");
        engine.vertices_to_points(&out.runs, &out.run_points, RUN_KEY_FIELD)?;
        engine.vertices_to_points(&out.connections, &out.connection_points, CONNECTION_KEY_FIELD)?;
        timer.finish(&mut report);

        let run_table = engine.read_attributes(&out.run_points)?;
        let connection_table = engine.read_attributes(&out.connection_points)?;
        let reference_table = engine.read_attributes(&out.references)?;

        let runs = run_table.vertex_records(&FieldMapping::vertex_points(RUN_KEY_FIELD), config.key_mode)?;
        let mut connection_fields = FieldMapping::vertex_points(CONNECTION_KEY_FIELD)
            .with_group(&config.connection_group_field);
        if config.variant == PassVariant::Improved {
            connection_fields = connection_fields.with_baseline(fields::DELTA_Z);
        }
        let connections = connection_table.vertex_records(&connection_fields, config.key_mode)?;
        let references = reference_table.reference_records(&config.reference_fields, config.key_mode)?;

        let timer = StageTimer::start("adjust runs");
        let run_pass = self.adjust_runs(&runs, &references);
        engine.write_column(&out.run_points, self.delta_field(), &run_pass.deltas)?;
        let moved = engine.shift_z(&out.run_points, self.delta_field())?;
        tracing::debug!(moved, "Applied run deltas");
        timer.finish(&mut report);

        let timer = StageTimer::start("adjust connections");
        let cascade = self.adjust_connections(&runs, &run_pass.deltas, &connections);
        engine.write_column(&out.connection_points, self.delta_field(), &cascade.deltas)?;
        let moved = engine.shift_z(&out.connection_points, self.delta_field())?;
        tracing::debug!(moved, "Applied connection deltas");
        timer.finish(&mut report);

        let timer = StageTimer::start("convert to lines");
        engine.points_to_lines(&out.run_points, &out.run_lines, fields::ORIG_FID, fields::FID)?;
        engine.points_to_lines(&out.connection_points, &out.connection_lines, fields::ORIG_FID, fields::FID)?;
        timer.finish(&mut report);

        report.runs = run_pass.stats;
        report.warnings = run_pass.warnings;
        report.connections = cascade.stats;
        tracing::info!(
            runs_adjusted = report.runs.adjusted_vertices,
            connections_adjusted = report.connections.adjusted_vertices,
            warnings = report.warnings.len(),
            "Elevation adjustment complete"
        );
        Ok(report)
    }
}
