//! # Door Index
//!
//! Every door and gate drawn into a chunk's block buffer gets an entry here
//! recording where its vertices live and everything needed to redraw them.
//! Opening or closing then rewrites that sub-range of the buffer instead of
//! remeshing the whole chunk.

use std::collections::HashMap;
use std::mem::size_of;

use cgmath::Point3;

use crate::engine_state::rendering::meshing::occlusion::CornerShading;
use crate::engine_state::rendering::vertex::Vertex;
use crate::engine_state::voxels::block::shape::{Shape, EXTRA_OPEN};

/// Geometry bookkeeping for one door half or gate.
#[derive(Clone, Debug, PartialEq)]
pub struct DoorEntry {
    /// Block id, for tiles.
    pub w: i32,
    /// Door half or gate.
    pub shape: Shape,
    /// Extra flags at mesh time; [`EXTRA_OPEN`] decides the drawn pose.
    pub extra: i32,
    /// Transform id at mesh time.
    pub transform: i32,
    /// Which faces were visible.
    pub faces: [bool; 6],
    /// Per-corner occlusion and light.
    pub shading: CornerShading,
    /// Index of the first vertex in the chunk's block buffer.
    pub offset: usize,
    /// Number of vertices written.
    pub vertex_count: usize,
}

impl DoorEntry {
    /// Whether the door is drawn open.
    pub fn is_open(&self) -> bool {
        self.extra & EXTRA_OPEN != 0
    }

    /// Byte offset of the first vertex in the block buffer.
    pub fn byte_offset(&self) -> usize {
        self.offset * size_of::<Vertex>()
    }

    /// Byte length of the entry's vertices.
    pub fn byte_len(&self) -> usize {
        self.vertex_count * size_of::<Vertex>()
    }
}

/// Door entries of one chunk, keyed by voxel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DoorMap {
    entries: HashMap<Point3<i32>, DoorEntry>,
}

impl DoorMap {
    /// Records or replaces the entry of a voxel.
    pub fn set(&mut self, position: Point3<i32>, entry: DoorEntry) {
        self.entries.insert(position, entry);
    }

    /// The entry of a voxel.
    pub fn get(&self, position: Point3<i32>) -> Option<&DoorEntry> {
        self.entries.get(&position)
    }

    /// Mutable entry of a voxel.
    pub fn get_mut(&mut self, position: Point3<i32>) -> Option<&mut DoorEntry> {
        self.entries.get_mut(&position)
    }

    /// Forgets a voxel's entry.
    pub fn clear(&mut self, position: Point3<i32>) -> bool {
        self.entries.remove(&position).is_some()
    }

    /// Keeps only entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(Point3<i32>, &DoorEntry) -> bool) {
        self.entries.retain(|&position, entry| keep(position, entry));
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Point3<i32>, &DoorEntry)> {
        self.entries.iter().map(|(&position, entry)| (position, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(offset: usize) -> DoorEntry {
        DoorEntry {
            w: 8,
            shape: Shape::LowerDoor,
            extra: 0,
            transform: 0,
            faces: [true; 6],
            shading: CornerShading::default(),
            offset,
            vertex_count: 36,
        }
    }

    #[test]
    fn byte_ranges_scale_with_vertex_size() {
        let e = entry(12);
        assert_eq!(e.byte_offset(), 12 * size_of::<Vertex>());
        assert_eq!(e.byte_len(), 36 * size_of::<Vertex>());
    }

    #[test]
    fn open_flag_comes_from_extra() {
        let mut e = entry(0);
        assert!(!e.is_open());
        e.extra |= EXTRA_OPEN;
        assert!(e.is_open());
    }

    #[test]
    fn clear_removes_one_voxel() {
        let mut doors = DoorMap::default();
        doors.set(Point3::new(1, 2, 3), entry(0));
        doors.set(Point3::new(1, 3, 3), entry(36));
        assert!(doors.clear(Point3::new(1, 2, 3)));
        assert!(!doors.clear(Point3::new(1, 2, 3)));
        assert_eq!(doors.len(), 1);
        assert_eq!(doors.get(Point3::new(1, 3, 3)).map(|e| e.offset), Some(36));
    }
}
