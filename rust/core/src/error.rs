// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for point-record and feature-class operations.

use crate::feature::GeometryKind;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing point records.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A field name was not present in the schema.
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// A value could not be read as the requested type.
    #[error("field {field} in row {row} is not {expected}")]
    FieldType {
        field: String,
        row: usize,
        expected: &'static str,
    },

    /// A row does not have one value per schema field.
    #[error("row {row} has {actual} values, schema has {expected} fields")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A named feature class does not exist.
    #[error("feature class not found: {0}")]
    FeatureClassNotFound(String),

    /// An operation was applied to the wrong kind of geometry.
    #[error("feature class {name} has {actual} geometry, expected {expected}")]
    GeometryKind {
        name: String,
        expected: GeometryKind,
        actual: GeometryKind,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
