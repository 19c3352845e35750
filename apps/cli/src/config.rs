// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Defaults loaded from environment variables.
//!
//! Command-line flags override these; they exist so batch jobs can set a
//! label and switches once for many invocations.

/// Environment-provided defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvDefaults {
    /// Operator label for log lines and the report.
    pub label: Option<String>,
    /// Emit warnings for unresolved runs.
    pub warnings: bool,
    /// Run the sub-interpolation pass.
    pub sub_interpolation: bool,
}

impl EnvDefaults {
    /// Load defaults from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            label: lookup("SEWER_LITE_LABEL").filter(|s| !s.trim().is_empty()),
            warnings: lookup("SEWER_LITE_WARNINGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            sub_interpolation: lookup("SEWER_LITE_SUB_INTERPOLATION")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
