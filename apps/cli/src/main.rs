// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sewer-Lite CLI - adjust run and connection elevations to chamber inverts.
//!
//! Reads three JSON feature classes (runs, connections, chamber points),
//! runs the adjustment pipeline in memory and writes every derived class
//! plus `report.json` into the output directory.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use sewer_lite_core::{fields, KeyMode, ReferenceMapping};
use sewer_lite_processing::{
    AdjustConfig, AdjustReport, InputNames, MemoryGeometryEngine, OutputNames, PassVariant,
    Pipeline,
};

mod config;
mod store;

use config::EnvDefaults;
use store::JsonFeatureStore;

#[derive(Parser, Debug)]
#[command(name = "sewer-lite")]
#[command(about = "Adjust sewer run and connection elevations to chamber invert levels", long_about = None)]
struct Cli {
    /// Run (Haltung) polylines, JSON feature class
    #[arg(long)]
    runs: PathBuf,

    /// Connection (Anschlussleitung) polylines, JSON feature class
    #[arg(long)]
    connections: PathBuf,

    /// Chamber reference points, JSON feature class
    #[arg(long)]
    references: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Operator label for logs and the report (falls back to SEWER_LITE_LABEL)
    #[arg(long)]
    label: Option<String>,

    /// Report runs that could not be resolved
    #[arg(long)]
    warnings: bool,

    /// Fill zero deltas between corrected neighbours
    #[arg(long)]
    sub_interpolate: bool,

    /// Use the first-generation pass (no noise floor, exact-key connections)
    #[arg(long, conflicts_with = "sub_interpolate")]
    legacy: bool,

    /// Spatial key construction: composite or additive
    #[arg(long, default_value = "composite")]
    key_mode: KeyMode,

    /// Chamber field holding the x coordinate
    #[arg(long, default_value = fields::POINT_X)]
    ref_x: String,

    /// Chamber field holding the y coordinate
    #[arg(long, default_value = fields::POINT_Y)]
    ref_y: String,

    /// Chamber field holding the invert level
    #[arg(long, default_value = fields::POINT_Z)]
    ref_z: String,

    /// Chamber field holding a stored x + y key (read with --key-mode additive)
    #[arg(long)]
    ref_key: Option<String>,
}

impl Cli {
    fn into_config(self, env: EnvDefaults) -> Result<(AdjustConfig, Paths)> {
        let label = match self.label.or(env.label) {
            Some(label) => label,
            None => bail!("a label is required (--label or SEWER_LITE_LABEL)"),
        };
        let variant = if self.legacy {
            PassVariant::Legacy
        } else {
            PassVariant::Improved
        };
        // Sub-interpolation has no meaning in the legacy pass.
        let sub_interpolate = !self.legacy && (self.sub_interpolate || env.sub_interpolation);

        let config = AdjustConfig::default()
            .with_label(&label)
            .with_warnings(self.warnings || env.warnings)
            .with_sub_interpolation(sub_interpolate)
            .with_variant(variant)
            .with_key_mode(self.key_mode)
            .with_reference_fields(ReferenceMapping {
                x: self.ref_x,
                y: self.ref_y,
                z: self.ref_z,
                key: self.ref_key,
            });

        let paths = Paths {
            runs: self.runs,
            connections: self.connections,
            references: self.references,
            output: self.output,
        };
        Ok((config, paths))
    }
}

struct Paths {
    runs: PathBuf,
    connections: PathBuf,
    references: PathBuf,
    output: PathBuf,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sewer_lite=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let (config, paths) = cli.into_config(EnvDefaults::from_env())?;

    tracing::info!(
        label = %config.label,
        variant = ?config.variant,
        key_mode = %config.key_mode,
        warnings = config.emit_warnings,
        sub_interpolation = config.enable_sub_interpolation,
        output = %paths.output.display(),
        "Starting Sewer-Lite"
    );

    let report = run(&config, &paths)?;
    print_summary(&report);
    Ok(())
}

fn run(config: &AdjustConfig, paths: &Paths) -> Result<AdjustReport> {
    let mut engine = MemoryGeometryEngine::new();
    let inputs = InputNames {
        runs: load_into(&mut engine, &paths.runs)?,
        connections: load_into(&mut engine, &paths.connections)?,
        references: load_into(&mut engine, &paths.references)?,
    };
    let pipeline = Pipeline::new(config).context("invalid configuration")?;
    check_input_names(&inputs, pipeline.outputs())?;
    let report = pipeline
        .run(&mut engine, &inputs)
        .context("adjustment pipeline failed")?;

    let store = JsonFeatureStore::new(&paths.output);
    let skip = [
        inputs.runs.as_str(),
        inputs.connections.as_str(),
        inputs.references.as_str(),
    ];
    let written = store.save_engine(&engine, &skip)?;
    let report_path = store.save_report(&report)?;

    tracing::info!(
        classes = written.len(),
        dir = %store.root().display(),
        report = %report_path.display(),
        "Wrote outputs"
    );
    Ok(report)
}

/// Input classes are named after their files; they must not shadow each
/// other or any class the pipeline writes.
fn check_input_names(inputs: &InputNames, outputs: &OutputNames) -> Result<()> {
    let names = [&inputs.runs, &inputs.connections, &inputs.references];
    for (i, name) in names.iter().enumerate() {
        if names[i + 1..].contains(name) {
            bail!("input files must have distinct file names ({name})");
        }
        if outputs.names().contains(&name.as_str()) {
            bail!("input file name {name} collides with an output class");
        }
    }
    Ok(())
}

fn load_into(engine: &mut MemoryGeometryEngine, path: &Path) -> Result<String> {
    let class = JsonFeatureStore::load(path)?;
    let name = class.name.clone();
    engine.insert(class);
    Ok(name)
}

fn print_summary(report: &AdjustReport) {
    println!("{}", report.label);
    println!(
        "  runs:        {} resolved of {} ({} vertices adjusted, {} sub-interpolated)",
        report.runs.resolved_runs,
        report.runs.runs,
        report.runs.adjusted_vertices,
        report.runs.sub_interpolated
    );
    println!(
        "  connections: {} exact, {} group, {} cross-group, {} final ({} vertices adjusted)",
        report.connections.exact_matches,
        report.connections.group_snaps,
        report.connections.cross_group_snaps,
        report.connections.final_snaps,
        report.connections.adjusted_vertices
    );
    for timing in &report.timings {
        println!("  {:<20} {:>8.1} ms", timing.stage, timing.millis);
    }
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
}
