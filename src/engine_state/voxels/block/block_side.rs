//! # Block Side Module
//!
//! The six faces of a voxel, in the order used by every per-face table in the
//! mesher: -x, +x, +y, -y, -z, +z.

use cgmath::Vector3;

/// One of the six axis-aligned faces of a voxel.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// Facing negative X.
    LEFT = 0,
    /// Facing positive X.
    RIGHT = 1,
    /// Facing positive Y.
    TOP = 2,
    /// Facing negative Y.
    BOTTOM = 3,
    /// Facing negative Z.
    BACK = 4,
    /// Facing positive Z.
    FRONT = 5,
}

impl BlockSide {
    /// All six faces in table order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::LEFT,
            BlockSide::RIGHT,
            BlockSide::TOP,
            BlockSide::BOTTOM,
            BlockSide::BACK,
            BlockSide::FRONT,
        ]
    }

    /// Integer step from a voxel to the neighbor this face looks at.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            BlockSide::LEFT => (-1, 0, 0),
            BlockSide::RIGHT => (1, 0, 0),
            BlockSide::TOP => (0, 1, 0),
            BlockSide::BOTTOM => (0, -1, 0),
            BlockSide::BACK => (0, 0, -1),
            BlockSide::FRONT => (0, 0, 1),
        }
    }

    /// Outward unit normal.
    pub fn normal(self) -> Vector3<f32> {
        let (x, y, z) = self.offset();
        Vector3::new(x as f32, y as f32, z as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_matches_discriminants() {
        for (index, side) in BlockSide::all().into_iter().enumerate() {
            assert_eq!(side as usize, index);
        }
    }

    #[test]
    fn opposite_faces_have_opposite_normals() {
        let sides = BlockSide::all();
        for pair in sides.chunks(2) {
            assert_eq!(pair[0].normal(), -pair[1].normal());
        }
    }
}
