//! # Block Shapes
//!
//! The shape layer turns a full cube into a slab, a door half, a fence piece or
//! a gate. Unknown ids fall back to a plain cube instead of failing.

/// Highest slab id; slab `n` is `n / 16` of a block tall.
pub const MAX_SLAB: i32 = 15;
/// Shape id of the upper half of a door.
pub const UPPER_DOOR_ID: i32 = 16;
/// Shape id of the lower half of a door.
pub const LOWER_DOOR_ID: i32 = 17;
/// First fence id.
pub const FENCE_ID: i32 = 18;
/// Shape id of a gate.
pub const GATE_ID: i32 = 23;

/// Extra-layer bit marking a block as a control (opens a menu when used).
pub const EXTRA_CONTROL: i32 = 0x1;
/// Extra-layer bit marking a door or gate as open.
pub const EXTRA_OPEN: i32 = 0x2;

/// How a fence connects to its neighbors, before the transform is applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FenceKind {
    /// A lone post.
    Post,
    /// Post with arms towards +x and +z.
    Corner,
    /// Post with arms towards +x, -x and +z.
    Tee,
    /// Post with arms in all four directions.
    Cross,
    /// Post with one arm towards +x.
    Half,
}

impl FenceKind {
    /// Direction of every rail arm, as quarter turns from +x towards +z.
    pub fn arms(self) -> &'static [u8] {
        match self {
            FenceKind::Post => &[],
            FenceKind::Corner => &[0, 1],
            FenceKind::Tee => &[0, 1, 2],
            FenceKind::Cross => &[0, 1, 2, 3],
            FenceKind::Half => &[0],
        }
    }
}

/// A decoded shape id.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// A full block.
    Cube,
    /// A partial-height block; the payload is its height in sixteenths.
    Slab(u8),
    /// Upper half of a door.
    UpperDoor,
    /// Lower half of a door.
    LowerDoor,
    /// A fence piece.
    Fence(FenceKind),
    /// A gate.
    Gate,
}

impl Shape {
    /// Decodes a raw shape id. Ids the engine does not know become [`Shape::Cube`].
    pub fn from_id(id: i32) -> Self {
        match id {
            1..=MAX_SLAB => Shape::Slab(id as u8),
            UPPER_DOOR_ID => Shape::UpperDoor,
            LOWER_DOOR_ID => Shape::LowerDoor,
            18 => Shape::Fence(FenceKind::Post),
            19 => Shape::Fence(FenceKind::Corner),
            20 => Shape::Fence(FenceKind::Tee),
            21 => Shape::Fence(FenceKind::Cross),
            22 => Shape::Fence(FenceKind::Half),
            GATE_ID => Shape::Gate,
            _ => Shape::Cube,
        }
    }

    /// The raw id stored in the shape layer.
    pub fn id(self) -> i32 {
        match self {
            Shape::Cube => 0,
            Shape::Slab(n) => n as i32,
            Shape::UpperDoor => UPPER_DOOR_ID,
            Shape::LowerDoor => LOWER_DOOR_ID,
            Shape::Fence(kind) => {
                FENCE_ID
                    + match kind {
                        FenceKind::Post => 0,
                        FenceKind::Corner => 1,
                        FenceKind::Tee => 2,
                        FenceKind::Cross => 3,
                        FenceKind::Half => 4,
                    }
            }
            Shape::Gate => GATE_ID,
        }
    }

    /// Height of the drawn geometry as a fraction of a block.
    pub fn height(self) -> f32 {
        match self {
            Shape::Slab(n) => n as f32 / 16.0,
            _ => 1.0,
        }
    }

    /// Doors and gates get a door index entry so they can be opened in place.
    pub fn is_openable(self) -> bool {
        matches!(self, Shape::UpperDoor | Shape::LowerDoor | Shape::Gate)
    }

    /// Whether this is either half of a door.
    pub fn is_door(self) -> bool {
        matches!(self, Shape::UpperDoor | Shape::LowerDoor)
    }

    /// Fixed face count of fence and gate geometry, which skips hidden-face culling.
    ///
    /// Every box is drawn with all six faces: a fence is one post plus two
    /// rails per arm, a gate is two posts and two rails.
    pub fn fence_face_count(self) -> Option<usize> {
        match self {
            Shape::Fence(kind) => Some(6 * (1 + 2 * kind.arms().len())),
            Shape::Gate => Some(24),
            _ => None,
        }
    }
}

/// Decoded transform id: quarter turns around +y, optionally mirrored along x.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Transform {
    /// Quarter turns, 0..=3.
    pub quarter_turns: u8,
    /// Mirror along x before rotating.
    pub mirrored: bool,
}

impl Transform {
    /// Decodes a transform id. Ids outside 0..=7 become the identity.
    pub fn from_id(id: i32) -> Self {
        if !(0..8).contains(&id) {
            return Transform::default();
        }
        Transform {
            quarter_turns: (id % 4) as u8,
            mirrored: id >= 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_for_known_shapes() {
        for id in 0..=GATE_ID {
            assert_eq!(Shape::from_id(id).id(), id);
        }
    }

    #[test]
    fn unknown_ids_fall_back_to_cube() {
        assert_eq!(Shape::from_id(-4), Shape::Cube);
        assert_eq!(Shape::from_id(24), Shape::Cube);
        assert_eq!(Shape::from_id(1000), Shape::Cube);
    }

    #[test]
    fn fence_face_counts_follow_arm_count() {
        assert_eq!(Shape::from_id(18).fence_face_count(), Some(6));
        assert_eq!(Shape::from_id(21).fence_face_count(), Some(54));
        assert_eq!(Shape::from_id(22).fence_face_count(), Some(18));
        assert_eq!(Shape::Gate.fence_face_count(), Some(24));
        assert_eq!(Shape::Slab(3).fence_face_count(), None);
    }

    #[test]
    fn transforms_clamp_to_identity() {
        assert_eq!(Transform::from_id(9), Transform::default());
        let t = Transform::from_id(6);
        assert_eq!(t.quarter_turns, 2);
        assert!(t.mirrored);
    }
}
