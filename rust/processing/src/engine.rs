// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The geometry engine seam.
//!
//! The pipeline never touches storage directly. Everything it needs from the
//! GIS side goes through [`GeometryEngine`]: copying inputs, exploding lines
//! into vertex points, reading and writing attribute columns, applying z
//! shifts and reassembling lines. [`MemoryGeometryEngine`] keeps feature
//! classes in memory and is what file-backed front ends load into.

use rustc_hash::FxHashMap;
use sewer_lite_core::{AttributeTable, FeatureClass};

use crate::error::Result;

/// Feature class operations the adjustment pipeline depends on.
pub trait GeometryEngine {
    /// Copies feature class `input` to `output`, replacing any existing class.
    fn copy_feature(&mut self, input: &str, output: &str) -> Result<()>;

    /// Explodes a polyline class into one point per vertex with coordinate
    /// attributes and the additive key in `key_field`.
    fn vertices_to_points(&mut self, input: &str, output: &str, key_field: &str) -> Result<()>;

    /// Returns a copy of a feature class's attribute rows.
    fn read_attributes(&self, feature: &str) -> Result<AttributeTable>;

    /// Writes one numeric value per row into `field`.
    fn write_column(&mut self, feature: &str, field: &str, values: &[f64]) -> Result<()>;

    /// Adds the numeric attribute `field` to each point's z. Returns the number moved.
    fn shift_z(&mut self, feature: &str, field: &str) -> Result<usize>;

    /// Reassembles lines from points grouped by `group_field`, ordered by `sort_field`.
    fn points_to_lines(&mut self, input: &str, output: &str, group_field: &str, sort_field: &str) -> Result<()>;
}

/// Feature classes held in memory, keyed by name.
#[derive(Debug, Default)]
pub struct MemoryGeometryEngine {
    classes: FxHashMap<String, FeatureClass>,
}

impl MemoryGeometryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a feature class under its own name.
    pub fn insert(&mut self, class: FeatureClass) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn get(&self, name: &str) -> Option<&FeatureClass> {
        self.classes.get(name)
    }

    /// Feature class names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn class(&self, name: &str) -> Result<&FeatureClass> {
        self.classes
            .get(name)
            .ok_or_else(|| sewer_lite_core::Error::FeatureClassNotFound(name.to_string()).into())
    }

    fn class_mut(&mut self, name: &str) -> Result<&mut FeatureClass> {
        self.classes
            .get_mut(name)
            .ok_or_else(|| sewer_lite_core::Error::FeatureClassNotFound(name.to_string()).into())
    }
}

impl GeometryEngine for MemoryGeometryEngine {
    fn copy_feature(&mut self, input: &str, output: &str) -> Result<()> {
        let copy = self.class(input)?.copy_as(output);
        self.insert(copy);
        Ok(())
    }

    fn vertices_to_points(&mut self, input: &str, output: &str, key_field: &str) -> Result<()> {
        let points = self.class(input)?.vertices_to_points(output, key_field)?;
        self.insert(points);
        Ok(())
    }

    fn read_attributes(&self, feature: &str) -> Result<AttributeTable> {
        Ok(self.class(feature)?.attributes.clone())
    }

    fn write_column(&mut self, feature: &str, field: &str, values: &[f64]) -> Result<()> {
        self.class_mut(feature)?.attributes.write_column(field, values)?;
        Ok(())
    }

    fn shift_z(&mut self, feature: &str, field: &str) -> Result<usize> {
        Ok(self.class_mut(feature)?.shift_z_by_field(field)?)
    }

    fn points_to_lines(&mut self, input: &str, output: &str, group_field: &str, sort_field: &str) -> Result<()> {
        let lines = self.class(input)?.points_to_lines(output, group_field, sort_field)?;
        self.insert(lines);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use sewer_lite_core::GeometryKind;

    #[test]
    fn copy_and_missing_class() {
        let mut engine = MemoryGeometryEngine::new();
        engine.insert(FeatureClass::new("a", GeometryKind::Point, vec![]));
        engine.copy_feature("a", "b").unwrap();
        assert_eq!(engine.names(), vec!["a", "b"]);
        assert_eq!(engine.get("b").map(|c| c.name.as_str()), Some("b"));

        let err = engine.copy_feature("missing", "c").unwrap_err();
        assert!(matches!(
            err,
            Error::Core(sewer_lite_core::Error::FeatureClassNotFound(_))
        ));
    }
}
