//! # Attribute Map
//!
//! A sparse store from voxel coordinate to a small integer value. Every chunk
//! owns one map per voxel attribute (block id, extra flags, light, shape,
//! transform).
//!
//! Keys are packed relative to the map's origin, which for chunk maps is the
//! chunk's minimum corner minus one voxel of padding. Each axis gets 8 bits of
//! local offset, so a map can address a 256x256x256 window above its origin.
//! Coordinates outside that window are never stored: `get` reports the default
//! and `set` is a no-op.
//!
//! Clones are deep copies with no shared state, so a cloned map can be moved to
//! a worker thread while the original keeps being edited on the main thread.

use std::collections::HashMap;

use cgmath::Point3;

/// Number of local positions addressable per axis.
const WINDOW: i32 = 256;

/// Sparse voxel attribute storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeMap {
    origin: Point3<i32>,
    entries: HashMap<u32, i32>,
}

impl AttributeMap {
    /// Creates an empty map whose local window starts at `origin`.
    pub fn new(origin: Point3<i32>) -> Self {
        Self {
            origin,
            entries: HashMap::new(),
        }
    }

    /// The world coordinate of local offset (0, 0, 0).
    pub fn origin(&self) -> Point3<i32> {
        self.origin
    }

    /// Returns the stored value, or 0 when nothing is stored at the position.
    pub fn get(&self, x: i32, y: i32, z: i32) -> i32 {
        self.key(x, y, z)
            .and_then(|key| self.entries.get(&key).copied())
            .unwrap_or(0)
    }

    /// Stores `value` at the position and reports whether anything changed.
    ///
    /// Writing 0 removes the entry. Writing the value already present, or
    /// writing outside the map's window, returns `false`.
    pub fn set(&mut self, x: i32, y: i32, z: i32, value: i32) -> bool {
        let Some(key) = self.key(x, y, z) else {
            return false;
        };
        if value == 0 {
            return self.entries.remove(&key).is_some();
        }
        match self.entries.insert(key, value) {
            Some(previous) => previous != value,
            None => true,
        }
    }

    /// Number of non-default entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry, keeping the origin.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates over every stored `(position, value)` pair in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Point3<i32>, i32)> + '_ {
        self.entries
            .iter()
            .map(|(&key, &value)| (self.unpack(key), value))
    }

    /// Like [`AttributeMap::iter`], but ordered by y, then x, then z.
    ///
    /// Used wherever output must not depend on hash order.
    pub fn sorted_entries(&self) -> Vec<(Point3<i32>, i32)> {
        let mut keys: Vec<(u32, i32)> = self.entries.iter().map(|(&k, &v)| (k, v)).collect();
        keys.sort_unstable_by_key(|&(key, _)| {
            let (lx, ly, lz) = (key & 0xff, (key >> 8) & 0xff, key >> 16);
            (ly, lx, lz)
        });
        keys.into_iter()
            .map(|(key, value)| (self.unpack(key), value))
            .collect()
    }

    fn key(&self, x: i32, y: i32, z: i32) -> Option<u32> {
        let lx = x - self.origin.x;
        let ly = y - self.origin.y;
        let lz = z - self.origin.z;
        let in_window = |v: i32| (0..WINDOW).contains(&v);
        if in_window(lx) && in_window(ly) && in_window(lz) {
            Some(lx as u32 | (ly as u32) << 8 | (lz as u32) << 16)
        } else {
            None
        }
    }

    fn unpack(&self, key: u32) -> Point3<i32> {
        Point3::new(
            self.origin.x + (key & 0xff) as i32,
            self.origin.y + ((key >> 8) & 0xff) as i32,
            self.origin.z + (key >> 16) as i32,
        )
    }
}
