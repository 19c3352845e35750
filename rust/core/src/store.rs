// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point record store: ordered attribute rows with positional field lookup.
//!
//! An [`AttributeTable`] holds one row of typed [`FieldValue`]s per feature.
//! Fields are addressed by position; [`AttributeTable::field_index`] resolves
//! a name to its position once so hot loops index rows directly. Typed
//! records are extracted through a [`FieldMapping`] that names the fields
//! carrying coordinates, keys, run ids and ordering.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keys::{KeyMode, SpatialKey};
use crate::record::{ReferenceRecord, VertexRecord};

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Int(i64),
    Double(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            FieldValue::Int(v) => Some(v as f64),
            FieldValue::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Integer view; doubles are accepted only when integral.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            FieldValue::Int(v) => Some(v),
            FieldValue::Double(v) if v.fract() == 0.0 && v.is_finite() => Some(v as i64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Double(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// Ordered rows sharing one field schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeTable {
    fields: Vec<String>,
    rows: Vec<Vec<FieldValue>>,
}

impl AttributeTable {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            rows: Vec::new(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn rows(&self) -> &[Vec<FieldValue>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[FieldValue]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a field in the schema.
    pub fn field_index(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f == name)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    /// Returns the field position, adding the field if it is missing.
    pub fn ensure_field(&mut self, name: &str, default: FieldValue) -> usize {
        match self.field_index(name) {
            Ok(idx) => idx,
            Err(_) => {
                self.fields.push(name.to_string());
                for row in &mut self.rows {
                    row.push(default.clone());
                }
                self.fields.len() - 1
            }
        }
    }

    pub fn push_row(&mut self, values: Vec<FieldValue>) -> Result<()> {
        if values.len() != self.fields.len() {
            return Err(Error::RowWidth {
                row: self.rows.len(),
                expected: self.fields.len(),
                actual: values.len(),
            });
        }
        self.rows.push(values);
        Ok(())
    }

    /// Checks that every row matches the schema width.
    pub fn validate(&self) -> Result<()> {
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.fields.len() {
                return Err(Error::RowWidth {
                    row: i,
                    expected: self.fields.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, row: usize, field: usize) -> Option<&FieldValue> {
        self.rows.get(row).and_then(|r| r.get(field))
    }

    pub fn get_f64(&self, row: usize, field: usize) -> Result<f64> {
        self.get(row, field)
            .and_then(FieldValue::as_f64)
            .ok_or_else(|| self.type_error(row, field, "numeric"))
    }

    pub fn get_i64(&self, row: usize, field: usize) -> Result<i64> {
        self.get(row, field)
            .and_then(FieldValue::as_i64)
            .ok_or_else(|| self.type_error(row, field, "an integer"))
    }

    pub fn set(&mut self, row: usize, field: usize, value: FieldValue) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(field)) {
            *slot = value;
        }
    }

    /// Writes one `Double` per row into `name`, creating the field if needed.
    pub fn write_column(&mut self, name: &str, values: &[f64]) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(Error::RowWidth {
                row: values.len().min(self.rows.len()),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        let idx = self.ensure_field(name, FieldValue::Double(0.0));
        for (row, &v) in self.rows.iter_mut().zip(values) {
            row[idx] = FieldValue::Double(v);
        }
        Ok(())
    }

    /// Reads one numeric column.
    pub fn read_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.field_index(name)?;
        (0..self.rows.len()).map(|r| self.get_f64(r, idx)).collect()
    }

    fn type_error(&self, row: usize, field: usize, expected: &'static str) -> Error {
        Error::FieldType {
            field: self.fields.get(field).cloned().unwrap_or_default(),
            row,
            expected,
        }
    }

    /// Extracts vertex records using `mapping`.
    pub fn vertex_records(&self, mapping: &FieldMapping, mode: KeyMode) -> Result<Vec<VertexRecord>> {
        let x = self.field_index(&mapping.x)?;
        let y = self.field_index(&mapping.y)?;
        let z = self.field_index(&mapping.z)?;
        let run = self.field_index(&mapping.run)?;
        let seq = self.field_index(&mapping.sequence)?;
        let key = self.key_field(mapping.key.as_deref(), mode)?;
        let group = mapping.group.as_deref().map(|g| self.field_index(g)).transpose()?;
        let baseline = mapping
            .baseline
            .as_deref()
            .filter(|b| self.has_field(b))
            .map(|b| self.field_index(b))
            .transpose()?;

        let mut records = Vec::with_capacity(self.rows.len());
        for r in 0..self.rows.len() {
            let position = Point3::new(self.get_f64(r, x)?, self.get_f64(r, y)?, self.get_f64(r, z)?);
            let key = match key {
                Some(k) => SpatialKey::from_scalar(self.get_f64(r, k)?),
                None => SpatialKey::derive(mode, position.x, position.y),
            };
            let mut record = VertexRecord::new(position, key, self.get_i64(r, run)?, self.get_i64(r, seq)?);
            if let Some(g) = group {
                record.group_id = Some(self.get_i64(r, g)?);
            }
            if let Some(b) = baseline {
                // Unset delta fields read as no prior correction.
                record.baseline = self.get(r, b).and_then(FieldValue::as_f64).unwrap_or(0.0);
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Extracts reference records using `mapping`.
    pub fn reference_records(
        &self,
        mapping: &ReferenceMapping,
        mode: KeyMode,
    ) -> Result<Vec<ReferenceRecord>> {
        let x = self.field_index(&mapping.x)?;
        let y = self.field_index(&mapping.y)?;
        let z = self.field_index(&mapping.z)?;
        let key = self.key_field(mapping.key.as_deref(), mode)?;

        (0..self.rows.len())
            .map(|r| {
                let position = Point3::new(self.get_f64(r, x)?, self.get_f64(r, y)?, self.get_f64(r, z)?);
                let key = match key {
                    Some(k) => SpatialKey::from_scalar(self.get_f64(r, k)?),
                    None => SpatialKey::derive(mode, position.x, position.y),
                };
                Ok(ReferenceRecord::new(position, key))
            })
            .collect()
    }

    /// Stored scalar keys are only meaningful in additive mode.
    fn key_field(&self, name: Option<&str>, mode: KeyMode) -> Result<Option<usize>> {
        match (name, mode) {
            (Some(name), KeyMode::Additive) => self.field_index(name).map(Some),
            _ => Ok(None),
        }
    }
}

/// Field names used to read vertex records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub x: String,
    pub y: String,
    pub z: String,
    /// Stored scalar key field, read in additive mode.
    pub key: Option<String>,
    pub run: String,
    pub sequence: String,
    pub group: Option<String>,
    /// Field holding the prior delta, read as the baseline.
    pub baseline: Option<String>,
}

impl FieldMapping {
    /// Mapping for a point class produced by vertex extraction.
    pub fn vertex_points(key_field: &str) -> Self {
        Self {
            x: fields::POINT_X.to_string(),
            y: fields::POINT_Y.to_string(),
            z: fields::POINT_Z.to_string(),
            key: Some(key_field.to_string()),
            run: fields::ORIG_FID.to_string(),
            sequence: fields::FID.to_string(),
            group: None,
            baseline: None,
        }
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn with_baseline(mut self, baseline: &str) -> Self {
        self.baseline = Some(baseline.to_string());
        self
    }
}

/// Field names used to read reference records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMapping {
    pub x: String,
    pub y: String,
    pub z: String,
    pub key: Option<String>,
}

impl Default for ReferenceMapping {
    fn default() -> Self {
        Self {
            x: fields::POINT_X.to_string(),
            y: fields::POINT_Y.to_string(),
            z: fields::POINT_Z.to_string(),
            key: None,
        }
    }
}

/// Well-known field names written by vertex extraction.
pub mod fields {
    pub const FID: &str = "FID";
    pub const ORIG_FID: &str = "ORIG_FID";
    pub const POINT_X: &str = "POINT_X";
    pub const POINT_Y: &str = "POINT_Y";
    pub const POINT_Z: &str = "POINT_Z";
    pub const DELTA_Z: &str = "DELTA_Z";
}
