//! # World Generation
//!
//! Procedural fill of a freshly created chunk. Generators run on worker
//! threads, so they only see the chunk's own layers and must be `Send + Sync`.
//!
//! ## Padding
//!
//! Generators write the one-voxel border around the chunk as well, negated,
//! so the chunk is meshed correctly before its neighbors exist.
//!
//! ## Terrain
//!
//! [`TerrainGenerator`] builds rolling hills from two layers of fractal
//! simplex noise, with sand below the waterline, snow on the peaks, plants and
//! trees on grass, and a cloud layer between y 64 and 72.

use noise::{Fbm, MultiFractal, NoiseFn, Simplex};

use super::block::block_type::BlockType;
use super::chunk::{signs::SignList, ChunkCoord, ChunkLayers, CHUNK_SIZE};

/// Fractal simplex noise remapped to `0..=1`.
pub struct FractalNoise {
    fbm: Fbm<Simplex>,
}

impl FractalNoise {
    /// Noise summed over `octaves` octaves, each `lacunarity` times the
    /// frequency and `persistence` times the amplitude of the previous one.
    pub fn new(seed: u32, octaves: usize, persistence: f64, lacunarity: f64) -> Self {
        let fbm = Fbm::<Simplex>::new(seed)
            .set_octaves(octaves)
            .set_persistence(persistence)
            .set_lacunarity(lacunarity);
        Self { fbm }
    }

    /// Samples the 2-D noise.
    pub fn sample2(&self, x: f64, z: f64) -> f64 {
        Self::remap(self.fbm.get([x, z]))
    }

    /// Samples the 3-D noise.
    pub fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        Self::remap(self.fbm.get([x, y, z]))
    }

    fn remap(value: f64) -> f64 {
        ((value + 1.0) / 2.0).clamp(0.0, 1.0)
    }
}

/// Fills the layers of a new chunk.
pub trait WorldGenerator: Send + Sync {
    /// Writes the generated content of `coord` into `layers` and `signs`.
    ///
    /// The layers arrive empty and anchored at `coord`'s map origin.
    fn generate(&self, coord: ChunkCoord, layers: &mut ChunkLayers, signs: &mut SignList);
}

/// Every column a generator writes for `coord`, with the sign to store
/// blocks under: 1 inside the chunk, -1 in the padding.
fn padded_columns(coord: ChunkCoord) -> impl Iterator<Item = (i32, i32, i32, i32, i32)> {
    (-1..CHUNK_SIZE + 1).flat_map(move |dx| {
        (-1..CHUNK_SIZE + 1).map(move |dz| {
            let inside = (0..CHUNK_SIZE).contains(&dx) && (0..CHUNK_SIZE).contains(&dz);
            let flag = if inside { 1 } else { -1 };
            (
                coord.p * CHUNK_SIZE + dx,
                coord.q * CHUNK_SIZE + dz,
                dx,
                dz,
                flag,
            )
        })
    })
}

/// Noise-driven terrain.
pub struct TerrainGenerator {
    show_plants: bool,
    height: FractalNoise,
    range: FractalNoise,
    cover: FractalNoise,
    trees: FractalNoise,
    clouds: FractalNoise,
}

/// Terrain never dips below this height; lower ground becomes sand.
const SEA_LEVEL: i32 = 12;
/// Terrain above this height is capped with snow.
const SNOW_LINE: i32 = 38;

impl TerrainGenerator {
    /// Terrain for `seed`. Plants are skipped when `show_plants` is off.
    pub fn new(seed: u32, show_plants: bool) -> Self {
        Self {
            show_plants,
            height: FractalNoise::new(seed, 4, 0.5, 2.0),
            range: FractalNoise::new(seed.wrapping_add(1), 2, 0.9, 2.0),
            cover: FractalNoise::new(seed.wrapping_add(2), 4, 0.8, 2.0),
            trees: FractalNoise::new(seed.wrapping_add(3), 6, 0.5, 2.0),
            clouds: FractalNoise::new(seed.wrapping_add(4), 8, 0.5, 2.0),
        }
    }

    /// Surface height and top block of column (x, z).
    pub fn surface(&self, x: i32, z: i32) -> (i32, BlockType) {
        let (fx, fz) = (f64::from(x), f64::from(z));
        let f = self.height.sample2(fx * 0.01, fz * 0.01);
        let g = self.range.sample2(-fx * 0.01, -fz * 0.01);
        let mh = g * 32.0 + 16.0;
        let h = (f * mh) as i32;
        if h <= SEA_LEVEL {
            (SEA_LEVEL, BlockType::SAND)
        } else if h > SNOW_LINE {
            (h, BlockType::SNOW)
        } else {
            (h, BlockType::GRASS)
        }
    }

    fn plant_at(&self, x: i32, z: i32) -> Option<BlockType> {
        let (fx, fz) = (f64::from(x), f64::from(z));
        let mut plant = None;
        if self.cover.sample2(-fx * 0.1, fz * 0.1) > 0.6 {
            plant = Some(BlockType::TALL_GRASS);
        }
        if self.cover.sample2(fx * 0.05, -fz * 0.05) > 0.7 {
            let kind = self.cover.sample2(fx * 0.1, fz * 0.1) * 7.0;
            let id = BlockType::YELLOW_FLOWER.id() + kind as i32;
            plant = BlockType::from_id(id.min(BlockType::BLUE_FLOWER.id()));
        }
        plant
    }

    fn plant_tree(&self, layers: &mut ChunkLayers, x: i32, h: i32, z: i32) {
        for y in h + 3..h + 8 {
            for ox in -3..=3 {
                for oz in -3..=3 {
                    let d = ox * ox + oz * oz + (y - (h + 4)) * (y - (h + 4));
                    if d < 11 {
                        layers.block.set(x + ox, y, z + oz, BlockType::LEAVES.id());
                    }
                }
            }
        }
        for y in h..h + 7 {
            layers.block.set(x, y, z, BlockType::WOOD.id());
        }
    }
}

impl WorldGenerator for TerrainGenerator {
    fn generate(&self, coord: ChunkCoord, layers: &mut ChunkLayers, _signs: &mut SignList) {
        for (x, z, dx, dz, flag) in padded_columns(coord) {
            let (h, top) = self.surface(x, z);
            for y in 0..h {
                layers.block.set(x, y, z, top.id() * flag);
            }
            if top == BlockType::GRASS {
                if self.show_plants {
                    if let Some(plant) = self.plant_at(x, z) {
                        layers.block.set(x, h, z, plant.id() * flag);
                    }
                }
                let room = dx - 4 >= 0 && dz - 4 >= 0 && dx + 4 < CHUNK_SIZE && dz + 4 < CHUNK_SIZE;
                if room && self.trees.sample2(f64::from(x), f64::from(z)) > 0.84 {
                    self.plant_tree(layers, x, h, z);
                }
            }
            for y in 64..72 {
                let c = self
                    .clouds
                    .sample3(f64::from(x) * 0.01, f64::from(y) * 0.1, f64::from(z) * 0.01);
                if c > 0.75 {
                    layers.block.set(x, y, z, BlockType::CLOUD.id() * flag);
                }
            }
        }
    }
}

/// A flat world: every column filled with one block up to a fixed height.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FlatGenerator {
    /// Number of filled layers.
    pub height: i32,
    /// Block id used for every filled voxel.
    pub block: i32,
}

impl Default for FlatGenerator {
    fn default() -> Self {
        Self {
            height: 8,
            block: BlockType::STONE.id(),
        }
    }
}

impl WorldGenerator for FlatGenerator {
    fn generate(&self, coord: ChunkCoord, layers: &mut ChunkLayers, _signs: &mut SignList) {
        for (x, z, _, _, flag) in padded_columns(coord) {
            for y in 0..self.height {
                layers.block.set(x, y, z, self.block * flag);
            }
        }
    }
}
