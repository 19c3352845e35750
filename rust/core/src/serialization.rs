// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON serialization for feature classes.
//!
//! The format is the serde shape of [`FeatureClass`]: name, geometry kind,
//! the attribute table (`fields` plus positional `rows`) and one vertex list
//! per row. Loaded classes are validated so later positional lookups can
//! index rows without bounds surprises.

use crate::error::{Error, Result};
use crate::feature::FeatureClass;

impl FeatureClass {
    /// Serializes the feature class to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Parses and validates a feature class from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let class: FeatureClass =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        class.validate()?;
        Ok(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::GeometryKind;
    use crate::store::FieldValue;

    #[test]
    fn json_preserves_values_and_kind() {
        let mut class = FeatureClass::new(
            "chambers",
            GeometryKind::Point,
            vec!["POINT_X".into(), "POINT_Y".into(), "POINT_Z".into(), "label".into()],
        );
        class
            .push(
                vec![[1.0, 2.0, 3.5]],
                vec![1.0.into(), 2.0.into(), 3.5.into(), FieldValue::Null],
            )
            .unwrap();

        let json = class.to_json().unwrap();
        assert!(json.contains("\"point\""));
        let parsed = FeatureClass::from_json(&json).unwrap();
        assert_eq!(parsed, class);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let json = r#"{
            "name": "bad",
            "kind": "point",
            "attributes": { "fields": ["a", "b"], "rows": [[1]] },
            "geometries": [[[0.0, 0.0, 0.0]]]
        }"#;
        assert!(matches!(
            FeatureClass::from_json(json),
            Err(Error::RowWidth { row: 0, .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(
            FeatureClass::from_json("{ not json"),
            Err(Error::Serialization(_))
        ));
    }
}
