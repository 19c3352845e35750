// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature classes and the geometry primitives the adjustment pipeline needs.
//!
//! A [`FeatureClass`] is a named set of features of one [`GeometryKind`], each
//! with a vertex list and an attribute row. The conversions here mirror the
//! steps a GIS performs around the elevation engine: explode lines into
//! vertex points with coordinate attributes, shift point z by an attribute,
//! and reassemble lines from points.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keys::{KeyMode, SpatialKey};
use crate::store::{fields, AttributeTable, FieldValue};

/// Geometry type of a feature class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Polyline,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::Polyline => "polyline",
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named collection of features sharing a geometry kind and schema.
///
/// `geometries[i]` belongs to attribute row `i`. Point features hold exactly
/// one vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureClass {
    pub name: String,
    pub kind: GeometryKind,
    pub attributes: AttributeTable,
    pub geometries: Vec<Vec<[f64; 3]>>,
}

impl FeatureClass {
    pub fn new(name: &str, kind: GeometryKind, fields: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            attributes: AttributeTable::new(fields),
            geometries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn push(&mut self, geometry: Vec<[f64; 3]>, attributes: Vec<FieldValue>) -> Result<()> {
        self.attributes.push_row(attributes)?;
        self.geometries.push(geometry);
        Ok(())
    }

    /// Checks schema widths and that every row has a geometry.
    pub fn validate(&self) -> Result<()> {
        self.attributes.validate()?;
        if self.attributes.len() != self.geometries.len() {
            return Err(Error::RowWidth {
                row: self.geometries.len().min(self.attributes.len()),
                expected: self.attributes.len(),
                actual: self.geometries.len(),
            });
        }
        Ok(())
    }

    /// Returns a copy under another name.
    pub fn copy_as(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.name = name.to_string();
        copy
    }

    fn expect_kind(&self, expected: GeometryKind) -> Result<()> {
        if self.kind != expected {
            return Err(Error::GeometryKind {
                name: self.name.clone(),
                expected,
                actual: self.kind,
            });
        }
        Ok(())
    }

    /// Explodes every polyline vertex into a point feature.
    ///
    /// Output rows carry `FID` (point ordinal), `ORIG_FID` (source feature
    /// index), the source attributes, `POINT_X/Y/Z` and `key_field` holding
    /// the additive key `x + y`. Points are emitted line by line in vertex
    /// order, so `FID` orders the vertices of each line from start to end.
    pub fn vertices_to_points(&self, name: &str, key_field: &str) -> Result<FeatureClass> {
        self.expect_kind(GeometryKind::Polyline)?;

        let mut out_fields = vec![fields::FID.to_string(), fields::ORIG_FID.to_string()];
        let passthrough: Vec<usize> = self
            .attributes
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| !is_generated_field(f, key_field))
            .map(|(i, f)| {
                out_fields.push(f.clone());
                i
            })
            .collect();
        for f in [fields::POINT_X, fields::POINT_Y, fields::POINT_Z, key_field] {
            out_fields.push(f.to_string());
        }

        let mut points = FeatureClass::new(name, GeometryKind::Point, out_fields);
        let mut fid = 0i64;
        for (orig_fid, (geometry, row)) in self
            .geometries
            .iter()
            .zip(self.attributes.rows())
            .enumerate()
        {
            for &[x, y, z] in geometry {
                let mut values = Vec::with_capacity(passthrough.len() + 6);
                values.push(FieldValue::Int(fid));
                values.push(FieldValue::Int(orig_fid as i64));
                values.extend(passthrough.iter().map(|&i| row[i].clone()));
                values.push(FieldValue::Double(x));
                values.push(FieldValue::Double(y));
                values.push(FieldValue::Double(z));
                let key = SpatialKey::derive(KeyMode::Additive, x, y);
                values.push(FieldValue::Double(key.plane_coords().0));
                points.push(vec![[x, y, z]], values)?;
                fid += 1;
            }
        }
        Ok(points)
    }

    /// Adds the numeric attribute `field` to each point's z.
    ///
    /// Returns the number of points that moved.
    pub fn shift_z_by_field(&mut self, field: &str) -> Result<usize> {
        self.expect_kind(GeometryKind::Point)?;
        let shifts = self.attributes.read_column(field)?;
        let mut moved = 0;
        for (geometry, shift) in self.geometries.iter_mut().zip(shifts) {
            if shift == 0.0 {
                continue;
            }
            for vertex in geometry.iter_mut() {
                vertex[2] += shift;
            }
            moved += 1;
        }
        Ok(moved)
    }

    /// Reassembles polylines from points grouped by `group_field`.
    ///
    /// Points within a group are ordered by `sort_field` (stable, so ties
    /// keep input order). Groups appear in first-seen order; groups with
    /// fewer than two points produce no line.
    pub fn points_to_lines(&self, name: &str, group_field: &str, sort_field: &str) -> Result<FeatureClass> {
        self.expect_kind(GeometryKind::Point)?;
        let group_idx = self.attributes.field_index(group_field)?;
        let sort_idx = self.attributes.field_index(sort_field)?;

        let mut order: Vec<i64> = Vec::new();
        let mut groups: FxHashMap<i64, Vec<(f64, [f64; 3])>> = FxHashMap::default();
        for (row, geometry) in self.geometries.iter().enumerate() {
            let group = self.attributes.get_i64(row, group_idx)?;
            let sort = self.attributes.get_f64(row, sort_idx)?;
            let Some(&vertex) = geometry.first() else {
                continue;
            };
            groups
                .entry(group)
                .or_insert_with(|| {
                    order.push(group);
                    Vec::new()
                })
                .push((sort, vertex));
        }

        let mut lines = FeatureClass::new(name, GeometryKind::Polyline, vec![group_field.to_string()]);
        for group in order {
            let Some(mut members) = groups.remove(&group) else {
                continue;
            };
            if members.len() < 2 {
                continue;
            }
            members.sort_by(|a, b| a.0.total_cmp(&b.0));
            let vertices = members.into_iter().map(|(_, v)| v).collect();
            lines.push(vertices, vec![FieldValue::Int(group)])?;
        }
        Ok(lines)
    }
}

/// Fields that vertex extraction writes itself and must not duplicate.
fn is_generated_field(name: &str, key_field: &str) -> bool {
    name == key_field
        || matches!(
            name,
            fields::FID | fields::ORIG_FID | fields::POINT_X | fields::POINT_Y | fields::POINT_Z
        )
}
