// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar grid index for tolerance-based key lookup.
//!
//! Uses a grid-based spatial hash for O(1) average-case neighbour queries.
//! Entries are positions in some caller-owned slice; queries return them in
//! ascending order so results follow input order regardless of bucket layout.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::keys::SpatialKey;

/// A spatial hash grid over [`SpatialKey`] plane coordinates.
///
/// The grid divides the plane into square cells of side `cell_size`. Lookups
/// check the 3x3 neighbourhood, so `tolerance` must not exceed `cell_size`.
#[derive(Debug)]
pub struct SpatialGrid {
    cell_size: f64,
    grid: FxHashMap<(i64, i64), SmallVec<[usize; 4]>>,
    keys: Vec<SpatialKey>,
}

impl SpatialGrid {
    /// Creates an empty grid. Non-positive cell sizes are raised to a tiny epsilon.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(1e-10),
            grid: FxHashMap::default(),
            keys: Vec::new(),
        }
    }

    /// Builds a grid holding every key, indexed by its position in `keys`.
    pub fn from_keys<'a, I>(keys: I, cell_size: f64) -> Self
    where
        I: IntoIterator<Item = &'a SpatialKey>,
    {
        let mut index = Self::new(cell_size);
        for key in keys {
            index.insert(*key);
        }
        index
    }

    /// Inserts a key and returns its entry index.
    pub fn insert(&mut self, key: SpatialKey) -> usize {
        let idx = self.keys.len();
        let cell = self.cell_coords(&key);
        self.grid.entry(cell).or_default().push(idx);
        self.keys.push(key);
        idx
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Finds all entries within `tolerance` (inclusive) of `key`, ascending.
    pub fn find_all_near(&self, key: &SpatialKey, tolerance: f64) -> Vec<usize> {
        let (cx, cy) = self.cell_coords(key);
        let mut result = Vec::new();

        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(entries) = self.grid.get(&(cx + dx, cy + dy)) {
                    for &idx in entries {
                        if self.keys[idx].within(key, tolerance) {
                            result.push(idx);
                        }
                    }
                }
            }
        }

        result.sort_unstable();
        result
    }

    fn cell_coords(&self, key: &SpatialKey) -> (i64, i64) {
        let (x, y) = key.plane_coords();
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }
}
