// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the adjustment pipeline.
//!
//! Unresolved runs are not errors; they surface as
//! [`Warning`](crate::report::Warning)s in the report.

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort an adjustment invocation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration is malformed. Raised before any work starts.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A point record or feature class operation failed.
    #[error(transparent)]
    Core(#[from] sewer_lite_core::Error),

    /// The geometry engine backend failed (I/O, storage).
    #[error("geometry engine error: {0}")]
    Engine(String),
}
