// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Directory of feature classes, one JSON file per class.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sewer_lite_core::FeatureClass;
use sewer_lite_processing::{AdjustReport, MemoryGeometryEngine};

/// File name of the run report inside the output directory.
pub const REPORT_FILE: &str = "report.json";

/// Reads feature classes into a [`MemoryGeometryEngine`] and writes them back out.
pub struct JsonFeatureStore {
    root: PathBuf,
}

impl JsonFeatureStore {
    /// Store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads a feature class and names it after the file stem.
    pub fn load(path: &Path) -> Result<FeatureClass> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut class = FeatureClass::from_json(&json)
            .with_context(|| format!("failed to parse feature class {}", path.display()))?;
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            class.name = stem.to_string();
        }
        tracing::debug!(
            name = %class.name,
            features = class.len(),
            kind = %class.kind,
            "Loaded feature class"
        );
        Ok(class)
    }

    /// Writes one class to `<root>/<name>.json`.
    pub fn save(&self, class: &FeatureClass) -> Result<PathBuf> {
        self.ensure_root()?;
        let path = self.root.join(format!("{}.json", class.name));
        let json = class.to_json()?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Writes every class in `engine` except those named in `skip`.
    /// Returns the written paths in name order.
    pub fn save_engine(&self, engine: &MemoryGeometryEngine, skip: &[&str]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for name in engine.names() {
            if skip.contains(&name) {
                continue;
            }
            if let Some(class) = engine.get(name) {
                written.push(self.save(class)?);
            }
        }
        Ok(written)
    }

    /// Writes the run report to `<root>/report.json`.
    pub fn save_report(&self, report: &AdjustReport) -> Result<PathBuf> {
        self.ensure_root()?;
        let path = self.root.join(REPORT_FILE);
        fs::write(&path, report.to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sewer_lite_core::GeometryKind;
    use tempfile::tempdir;

    #[test]
    fn class_name_follows_file_stem() {
        let dir = tempdir().unwrap();
        let class = FeatureClass::new("whatever", GeometryKind::Polyline, vec![]);
        let path = dir.path().join("haltungen.json");
        fs::write(&path, class.to_json().unwrap()).unwrap();

        let loaded = JsonFeatureStore::load(&path).unwrap();
        assert_eq!(loaded.name, "haltungen");
        assert_eq!(loaded.kind, GeometryKind::Polyline);
    }

    #[test]
    fn save_engine_skips_inputs_and_creates_root() {
        let dir = tempdir().unwrap();
        let mut engine = MemoryGeometryEngine::new();
        engine.insert(FeatureClass::new("input", GeometryKind::Point, vec![]));
        engine.insert(FeatureClass::new("input_out", GeometryKind::Point, vec![]));

        let store = JsonFeatureStore::new(dir.path().join("out"));
        let written = store.save_engine(&engine, &["input"]).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("input_out.json"));
        assert!(store.root().join("input_out.json").exists());
    }

    #[test]
    fn report_lands_next_to_classes() {
        let dir = tempdir().unwrap();
        let store = JsonFeatureStore::new(dir.path());
        let path = store.save_report(&AdjustReport::new("test")).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("\"label\": \"test\""));
    }

    #[test]
    fn missing_file_has_context() {
        let err = JsonFeatureStore::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
