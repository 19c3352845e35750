// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adjustment configuration, passed explicitly into every pass.

use serde::{Deserialize, Serialize};
use sewer_lite_core::{KeyMode, ReferenceMapping};

use crate::error::{Error, Result};

/// Maximum planar distance for two connection vertices to count as coincident.
pub const DEFAULT_TOLERANCE: f64 = 0.003;

/// Deltas whose magnitude is at or below this value are treated as noise and dropped.
pub const DEFAULT_NOISE_FLOOR: f64 = 0.2;

/// Which generation of the adjustment pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassVariant {
    /// Delta write-back, noise floor, optional sub-interpolation and the
    /// multi-hop connection cascade.
    #[default]
    Improved,
    /// The first-generation pass: results overwrite the z attribute (zero for
    /// unresolved runs), no noise floor, connections copy exact key matches only.
    Legacy,
}

/// Configuration for one adjustment invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustConfig {
    /// Operator-facing label for this invocation. Required.
    pub label: String,
    /// Report unresolved runs as warnings.
    pub emit_warnings: bool,
    /// Run the sub-interpolation pass after linear interpolation.
    pub enable_sub_interpolation: bool,
    pub variant: PassVariant,
    pub key_mode: KeyMode,
    pub tolerance: f64,
    pub noise_floor: f64,
    /// Fields of the reference (chamber) point class.
    pub reference_fields: ReferenceMapping,
    /// Connection point field used for cascade grouping.
    pub connection_group_field: String,
}

impl Default for AdjustConfig {
    fn default() -> Self {
        Self {
            label: "sewer-lite".to_string(),
            emit_warnings: false,
            enable_sub_interpolation: false,
            variant: PassVariant::Improved,
            key_mode: KeyMode::Composite,
            tolerance: DEFAULT_TOLERANCE,
            noise_floor: DEFAULT_NOISE_FLOOR,
            reference_fields: ReferenceMapping::default(),
            connection_group_field: sewer_lite_core::fields::ORIG_FID.to_string(),
        }
    }
}

impl AdjustConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_warnings(mut self, emit: bool) -> Self {
        self.emit_warnings = emit;
        self
    }

    pub fn with_sub_interpolation(mut self, enable: bool) -> Self {
        self.enable_sub_interpolation = enable;
        self
    }

    pub fn with_variant(mut self, variant: PassVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_key_mode(mut self, mode: KeyMode) -> Self {
        self.key_mode = mode;
        self
    }

    pub fn with_reference_fields(mut self, fields: ReferenceMapping) -> Self {
        self.reference_fields = fields;
        self
    }

    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(Error::InvalidConfig("label must not be empty".into()));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        if !self.noise_floor.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "noise floor must be finite, got {}",
                self.noise_floor
            )));
        }
        if self.variant == PassVariant::Legacy && self.enable_sub_interpolation {
            return Err(Error::InvalidConfig(
                "sub-interpolation is not available in the legacy pass".into(),
            ));
        }
        let refs = &self.reference_fields;
        if [&refs.x, &refs.y, &refs.z].iter().any(|f| f.is_empty()) {
            return Err(Error::InvalidConfig("reference coordinate fields must be named".into()));
        }
        if self.connection_group_field.is_empty() {
            return Err(Error::InvalidConfig("connection group field must be named".into()));
        }
        Ok(())
    }

    /// Drops corrections within the noise floor band `[-floor, floor]`.
    /// Large downward corrections pass through.
    pub fn apply_noise_floor(&self, delta: f64) -> f64 {
        if delta <= self.noise_floor && delta >= -self.noise_floor {
            0.0
        } else {
            delta
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AdjustConfig::default();
        config.validate().unwrap();
        assert_eq!(config.tolerance, 0.003);
        assert_eq!(config.noise_floor, 0.2);
        assert_eq!(config.key_mode, KeyMode::Composite);
    }

    #[test]
    fn blank_label_is_fatal() {
        let err = AdjustConfig::default().with_label("  ").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn legacy_rejects_sub_interpolation() {
        let config = AdjustConfig::default()
            .with_variant(PassVariant::Legacy)
            .with_sub_interpolation(true);
        assert!(config.validate().is_err());
    }

    #[test]
    fn unnamed_reference_field_is_fatal() {
        let mut fields = ReferenceMapping::default();
        fields.z.clear();
        let config = AdjustConfig::default().with_reference_fields(fields);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn noise_floor_drops_small_corrections_only() {
        let config = AdjustConfig::default();
        assert_eq!(config.apply_noise_floor(0.2), 0.0);
        assert_eq!(config.apply_noise_floor(0.1), 0.0);
        assert_eq!(config.apply_noise_floor(-0.15), 0.0);
        assert_eq!(config.apply_noise_floor(0.25), 0.25);
        assert_eq!(config.apply_noise_floor(-3.0), -3.0);
    }
}
