//! # Block Module
//!
//! Block ids, per-face tile lookup, transparency rules and shape decoding.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;
pub mod shape;

/// Tile index of each face of every catalogued block, in
/// [`block_side::BlockSide`] order: -x, +x, +y, -y, -z, +z.
///
/// Plants use a single tile for every quad.
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: [[u32; 6]; 24] = [
    [0, 0, 0, 0, 0, 0],       // EMPTY
    [16, 16, 32, 0, 16, 16],  // GRASS
    [1, 1, 1, 1, 1, 1],       // SAND
    [2, 2, 2, 2, 2, 2],       // STONE
    [3, 3, 3, 3, 3, 3],       // BRICK
    [20, 20, 36, 4, 20, 20],  // WOOD
    [5, 5, 5, 5, 5, 5],       // CEMENT
    [6, 6, 6, 6, 6, 6],       // DIRT
    [7, 7, 7, 7, 7, 7],       // PLANK
    [24, 24, 40, 8, 24, 24],  // SNOW
    [9, 9, 9, 9, 9, 9],       // GLASS
    [10, 10, 10, 10, 10, 10], // COBBLE
    [11, 11, 11, 11, 11, 11], // LIGHT_STONE
    [12, 12, 12, 12, 12, 12], // DARK_STONE
    [13, 13, 13, 13, 13, 13], // CHEST
    [14, 14, 14, 14, 14, 14], // LEAVES
    [15, 15, 15, 15, 15, 15], // CLOUD
    [48, 48, 48, 48, 48, 48], // TALL_GRASS
    [49, 49, 49, 49, 49, 49], // YELLOW_FLOWER
    [50, 50, 50, 50, 50, 50], // RED_FLOWER
    [51, 51, 51, 51, 51, 51], // PURPLE_FLOWER
    [52, 52, 52, 52, 52, 52], // SUN_FLOWER
    [53, 53, 53, 53, 53, 53], // WHITE_FLOWER
    [54, 54, 54, 54, 54, 54], // BLUE_FLOWER
];

/// Gets the tile index of every face of a raw block id.
///
/// Ids outside the catalogue use their own value, wrapped to the 256-tile
/// atlas, on every face.
pub fn get_texture_indices_from_int(w: i32) -> [u32; 6] {
    match BlockType::from_id(w) {
        Some(block) => BLOCK_TYPE_TO_TEXTURE_INDICES[block as usize],
        None => [w.unsigned_abs() % 256; 6],
    }
}

/// Whether light and sight pass through the block.
///
/// Padding copies are stored negated, so the sign is ignored.
pub fn is_transparent(w: i32) -> bool {
    match BlockType::from_id(w) {
        Some(BlockType::EMPTY) | Some(BlockType::GLASS) | Some(BlockType::LEAVES) => true,
        Some(block) => block.is_plant(),
        None => false,
    }
}

/// Whether the block is drawn as a cross-quad plant.
pub fn is_plant(w: i32) -> bool {
    BlockType::from_id(w).is_some_and(BlockType::is_plant)
}
