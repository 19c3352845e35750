// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Sewer-Lite Processing
//!
//! Elevation interpolation and propagation for sewer networks.
//!
//! Run vertices are matched to chamber invert levels at their two ends and
//! re-levelled by linear interpolation along the run. An optional second
//! pass fills vertices left at zero from their corrected neighbours. The run
//! corrections are then carried onto connection lines: exact key matches
//! seed a cascade that spreads through coincident connection vertices.
//!
//! All results are deltas against each vertex's original z; applying them
//! and rebuilding lines is left to a [`GeometryEngine`].
//!
//! ```rust,ignore
//! use sewer_lite_processing::{AdjustConfig, InputNames, MemoryGeometryEngine, Pipeline};
//!
//! let config = AdjustConfig::default().with_label("Neustadt").with_warnings(true);
//! let report = Pipeline::new(&config)?.run(&mut engine, &inputs)?;
//! ```

pub mod cascade;
pub mod config;
pub mod endpoints;
pub mod engine;
pub mod error;
pub mod interpolate;
pub mod legacy;
pub mod matcher;
pub mod pipeline;
pub mod report;
pub mod sub_interpolate;

pub use cascade::{propagate, CascadePass};
pub use config::{AdjustConfig, PassVariant, DEFAULT_NOISE_FLOOR, DEFAULT_TOLERANCE};
pub use endpoints::{group_runs, resolve_endpoints, Endpoints, Run};
pub use engine::{GeometryEngine, MemoryGeometryEngine};
pub use error::{Error, Result};
pub use interpolate::{interpolate_elevation, interpolate_runs, PointInfo, RunPass};
pub use matcher::{find_reference, KeyIndex, ReferenceMatcher};
pub use pipeline::{Adjustment, InputNames, OutputNames, Pipeline};
pub use report::{AdjustReport, CascadeStats, RunStats, StageTiming, Warning, WarningKind};
pub use sub_interpolate::sub_interpolate;
