// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Sewer-Lite Core
//!
//! Data model for adjusting the elevations of sewer network lines against
//! chamber invert levels.
//!
//! - [`VertexRecord`] / [`ReferenceRecord`]: typed vertex and chamber samples
//! - [`SpatialKey`]: coordinate-derived identity joining vertices to chambers
//! - [`AttributeTable`]: ordered attribute rows with positional field lookup
//! - [`SpatialGrid`]: planar hash grid for tolerance queries
//! - [`FeatureClass`]: named line/point collections with the vertex-to-point,
//!   z-shift and point-to-line conversions used around the elevation engine
//!
//! Geometry is planar `(x, y)` plus scalar `z`; there is no coordinate
//! reference system handling.

pub mod error;
pub mod feature;
pub mod keys;
pub mod record;
pub mod serialization;
pub mod spatial;
pub mod store;

// Re-export nalgebra types for convenience
pub use nalgebra::Point3;

pub use error::{Error, Result};
pub use feature::{FeatureClass, GeometryKind};
pub use keys::{KeyMode, SpatialKey};
pub use record::{planar_distance_sq, ReferenceRecord, VertexRecord};
pub use spatial::SpatialGrid;
pub use store::{fields, AttributeTable, FieldMapping, FieldValue, ReferenceMapping};
