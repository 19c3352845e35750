// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial key matching between vertices and reference records.
//!
//! Duplicate keys resolve to the first record in input order. Not-found is
//! an ordinary `None`; callers decide the fallback.

use rustc_hash::FxHashMap;
use sewer_lite_core::{ReferenceRecord, SpatialKey};

/// Linear scan with early exit on the first matching key.
pub fn find_reference<'a>(
    key: &SpatialKey,
    references: &'a [ReferenceRecord],
) -> Option<(usize, &'a ReferenceRecord)> {
    references.iter().enumerate().find(|(_, r)| r.key == *key)
}

/// Hash index from key to the position of its first occurrence.
#[derive(Debug, Default)]
pub struct KeyIndex {
    first: FxHashMap<SpatialKey, usize>,
}

impl KeyIndex {
    pub fn build<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a SpatialKey>,
    {
        let mut first = FxHashMap::default();
        for (i, key) in keys.into_iter().enumerate() {
            first.entry(*key).or_insert(i);
        }
        Self { first }
    }

    pub fn get(&self, key: &SpatialKey) -> Option<usize> {
        self.first.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.first.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }
}

/// Reference records with an index over their keys.
#[derive(Debug)]
pub struct ReferenceMatcher<'a> {
    references: &'a [ReferenceRecord],
    index: KeyIndex,
}

impl<'a> ReferenceMatcher<'a> {
    pub fn new(references: &'a [ReferenceRecord]) -> Self {
        Self {
            references,
            index: KeyIndex::build(references.iter().map(|r| &r.key)),
        }
    }

    /// The reference whose key equals `key`, first in input order on ties.
    pub fn find(&self, key: &SpatialKey) -> Option<&'a ReferenceRecord> {
        self.index.get(key).map(|i| &self.references[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sewer_lite_core::{KeyMode, Point3};

    fn reference(x: f64, y: f64, z: f64, mode: KeyMode) -> ReferenceRecord {
        ReferenceRecord::new(Point3::new(x, y, z), SpatialKey::derive(mode, x, y))
    }

    #[test]
    fn finds_matching_reference() {
        let refs = vec![
            reference(0.0, 0.0, 10.0, KeyMode::Composite),
            reference(10.0, 0.0, 8.0, KeyMode::Composite),
        ];
        let matcher = ReferenceMatcher::new(&refs);
        let key = SpatialKey::derive(KeyMode::Composite, 10.0, 0.0);
        assert_eq!(matcher.find(&key).map(|r| r.z()), Some(8.0));

        let missing = SpatialKey::derive(KeyMode::Composite, 3.0, 3.0);
        assert!(matcher.find(&missing).is_none());
    }

    #[test]
    fn duplicate_keys_resolve_to_first_in_input_order() {
        // (1, 2) and (2, 1) share the additive key 3.
        let refs = vec![
            reference(1.0, 2.0, 5.0, KeyMode::Additive),
            reference(2.0, 1.0, 7.0, KeyMode::Additive),
        ];
        let key = SpatialKey::derive(KeyMode::Additive, 2.0, 1.0);

        let matcher = ReferenceMatcher::new(&refs);
        assert_eq!(matcher.find(&key).map(|r| r.z()), Some(5.0));

        let (pos, scanned) = find_reference(&key, &refs).unwrap();
        assert_eq!(pos, 0);
        assert_eq!(scanned.z(), 5.0);
    }

    #[test]
    fn index_agrees_with_linear_scan() {
        let refs: Vec<_> = (0..20)
            .map(|i| reference((i % 7) as f64, (i % 5) as f64, i as f64, KeyMode::Additive))
            .collect();
        let matcher = ReferenceMatcher::new(&refs);
        for sum in 0..15 {
            let key = SpatialKey::from_scalar(sum as f64);
            let scanned = find_reference(&key, &refs).map(|(_, r)| r.z());
            assert_eq!(matcher.find(&key).map(|r| r.z()), scanned);
        }
    }
}
