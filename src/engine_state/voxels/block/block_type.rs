//! # Block Type Module
//!
//! The block catalogue. Block ids are stored as plain integers in attribute
//! maps; this enum gives the known ones names and properties.

use num_derive::FromPrimitive;

/// Every block id the engine knows how to draw.
///
/// The discriminants are the ids stored in the block attribute map. The
/// `FromPrimitive` derive converts raw ids back into the enum.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Air. Never stored: writing it removes the entry.
    EMPTY = 0,
    /// Grass-topped dirt.
    GRASS = 1,
    /// Sand.
    SAND = 2,
    /// Stone.
    STONE = 3,
    /// Brick.
    BRICK = 4,
    /// Tree trunk.
    WOOD = 5,
    /// Cement.
    CEMENT = 6,
    /// Dirt.
    DIRT = 7,
    /// Wooden planks.
    PLANK = 8,
    /// Snow-topped dirt.
    SNOW = 9,
    /// Glass, transparent.
    GLASS = 10,
    /// Cobblestone.
    COBBLE = 11,
    /// Light stone.
    LIGHT_STONE = 12,
    /// Dark stone.
    DARK_STONE = 13,
    /// Chest.
    CHEST = 14,
    /// Leaves, transparent.
    LEAVES = 15,
    /// Cloud.
    CLOUD = 16,
    /// Tall grass, drawn as a plant.
    TALL_GRASS = 17,
    /// Yellow flower, drawn as a plant.
    YELLOW_FLOWER = 18,
    /// Red flower, drawn as a plant.
    RED_FLOWER = 19,
    /// Purple flower, drawn as a plant.
    PURPLE_FLOWER = 20,
    /// Sunflower, drawn as a plant.
    SUN_FLOWER = 21,
    /// White flower, drawn as a plant.
    WHITE_FLOWER = 22,
    /// Blue flower, drawn as a plant.
    BLUE_FLOWER = 23,
}

impl BlockType {
    /// Looks up a raw block id, ignoring the sign used for padding copies.
    ///
    /// Returns `None` for ids outside the catalogue.
    pub fn from_id(w: i32) -> Option<Self> {
        num::FromPrimitive::from_i32(w.abs())
    }

    /// The raw id stored in attribute maps.
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Picks a random placeable block (no air, no plants).
    pub fn get_random_type() -> Self {
        num::FromPrimitive::from_i32(fastrand::i32(1..17)).unwrap_or(BlockType::STONE)
    }

    /// Whether this block is drawn as a cross-quad plant.
    pub fn is_plant(self) -> bool {
        (BlockType::TALL_GRASS as i32..=BlockType::BLUE_FLOWER as i32).contains(&(self as i32))
    }
}
