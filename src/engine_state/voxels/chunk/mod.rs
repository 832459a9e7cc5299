//! # Chunk Module
//!
//! A chunk is a `CHUNK_SIZE` x `WORLD_HEIGHT` x `CHUNK_SIZE` column of voxels.
//! It owns one [`AttributeMap`] per voxel attribute, its signs, the door index
//! derived from its last mesh, and the buffer handles of that mesh.
//!
//! ## Padding
//!
//! All five maps share one origin: the chunk's minimum corner minus one voxel on
//! x and z. Voxels in that one-voxel border belong to the neighboring chunk and
//! are stored negated, which keeps them opaque for occlusion while the mesher
//! skips them as geometry.
//!
//! ## Dirty Flags
//!
//! `dirty` marks stale block geometry and `dirty_signs` stale sign geometry.
//! They are separate because sign text changes far more often than terrain.

use cgmath::Point3;

use super::attribute_map::AttributeMap;
use crate::engine_state::buffer_state::{BufferHandle, BufferOwner};

pub mod doors;
pub mod neighborhood;
pub mod signs;

use doors::DoorMap;
use signs::SignList;

/// Edge length of a chunk in voxels.
pub const CHUNK_SIZE: i32 = 16;
/// Number of voxel layers; valid y is `0..WORLD_HEIGHT`.
pub const WORLD_HEIGHT: i32 = 256;

/// Chunk coordinate along one axis of a world-space position.
pub fn chunked(x: f32) -> i32 {
    (x.round() / CHUNK_SIZE as f32).floor() as i32
}

/// Chunk coordinate along one axis of a voxel coordinate.
pub fn chunk_of(x: i32) -> i32 {
    x.div_euclid(CHUNK_SIZE)
}

/// Horizontal position of a chunk in the chunk grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Chunk index along x.
    pub p: i32,
    /// Chunk index along z.
    pub q: i32,
}

impl ChunkCoord {
    /// Creates a chunk coordinate.
    pub fn new(p: i32, q: i32) -> Self {
        Self { p, q }
    }

    /// The chunk owning voxel column (x, z).
    pub fn containing(x: i32, z: i32) -> Self {
        Self::new(chunk_of(x), chunk_of(z))
    }

    /// The chunk containing a world-space position.
    pub fn from_position(x: f32, z: f32) -> Self {
        Self::new(chunked(x), chunked(z))
    }

    /// This coordinate shifted by (dp, dq).
    pub fn offset(self, dp: i32, dq: i32) -> Self {
        Self::new(self.p + dp, self.q + dq)
    }

    /// Chebyshev distance in chunks.
    pub fn distance(self, other: ChunkCoord) -> i32 {
        (self.p - other.p).abs().max((self.q - other.q).abs())
    }

    /// Origin shared by every attribute map of this chunk.
    pub fn map_origin(self) -> Point3<i32> {
        Point3::new(self.p * CHUNK_SIZE - 1, 0, self.q * CHUNK_SIZE - 1)
    }

    /// Whether voxel column (x, z) lies in this chunk's own maps, padding included.
    pub fn covers(self, x: i32, z: i32) -> bool {
        let lo_x = self.p * CHUNK_SIZE - 1;
        let lo_z = self.q * CHUNK_SIZE - 1;
        (lo_x..=lo_x + CHUNK_SIZE + 1).contains(&x) && (lo_z..=lo_z + CHUNK_SIZE + 1).contains(&z)
    }

    /// This chunk and its eight neighbors, row by row.
    pub fn neighborhood(self) -> impl Iterator<Item = ChunkCoord> {
        (-1..=1).flat_map(move |dp| (-1..=1).map(move |dq| self.offset(dp, dq)))
    }
}

/// One voxel attribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Material id; 0 is air.
    Block,
    /// Bit flags such as control and open.
    Extra,
    /// Emitted light, 0..=15.
    Light,
    /// Shape id; 0 is a full cube.
    Shape,
    /// Rotation and mirroring, 0..=7.
    Transform,
}

impl Layer {
    /// Every layer, in storage order.
    pub const ALL: [Layer; 5] = [
        Layer::Block,
        Layer::Extra,
        Layer::Light,
        Layer::Shape,
        Layer::Transform,
    ];
}

/// The attribute maps of one chunk, all sharing one origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkLayers {
    /// Block ids.
    pub block: AttributeMap,
    /// Extra flags.
    pub extra: AttributeMap,
    /// Light emitters.
    pub light: AttributeMap,
    /// Shape ids.
    pub shape: AttributeMap,
    /// Transform ids.
    pub transform: AttributeMap,
}

impl ChunkLayers {
    /// Empty maps anchored at `coord`'s map origin.
    pub fn new(coord: ChunkCoord) -> Self {
        let origin = coord.map_origin();
        Self {
            block: AttributeMap::new(origin),
            extra: AttributeMap::new(origin),
            light: AttributeMap::new(origin),
            shape: AttributeMap::new(origin),
            transform: AttributeMap::new(origin),
        }
    }

    /// The map backing `layer`.
    pub fn get(&self, layer: Layer) -> &AttributeMap {
        match layer {
            Layer::Block => &self.block,
            Layer::Extra => &self.extra,
            Layer::Light => &self.light,
            Layer::Shape => &self.shape,
            Layer::Transform => &self.transform,
        }
    }

    /// Mutable access to the map backing `layer`.
    pub fn get_mut(&mut self, layer: Layer) -> &mut AttributeMap {
        match layer {
            Layer::Block => &mut self.block,
            Layer::Extra => &mut self.extra,
            Layer::Light => &mut self.light,
            Layer::Shape => &mut self.shape,
            Layer::Transform => &mut self.transform,
        }
    }
}

/// Read access to a chunk's voxel data, either borrowed or snapshotted.
pub trait VoxelSource {
    /// The chunk's attribute maps.
    fn layers(&self) -> &ChunkLayers;
    /// The chunk's door index.
    fn doors(&self) -> &DoorMap;
}

/// A borrowed view of a live chunk, for main-thread meshing.
#[derive(Copy, Clone, Debug)]
pub struct ChunkView<'a> {
    layers: &'a ChunkLayers,
    doors: &'a DoorMap,
}

impl VoxelSource for ChunkView<'_> {
    fn layers(&self) -> &ChunkLayers {
        self.layers
    }

    fn doors(&self) -> &DoorMap {
        self.doors
    }
}

/// A deep copy of a chunk's voxel data that a worker thread can own.
///
/// Dropping the snapshot frees the copy.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkSnapshot {
    /// Copied attribute maps.
    pub layers: ChunkLayers,
    /// Copied door index.
    pub doors: DoorMap,
}

impl VoxelSource for ChunkSnapshot {
    fn layers(&self) -> &ChunkLayers {
        &self.layers
    }

    fn doors(&self) -> &DoorMap {
        &self.doors
    }
}

/// A loaded column of the world.
#[derive(Debug)]
pub struct Chunk {
    /// Position in the chunk grid.
    pub coord: ChunkCoord,
    /// Voxel attributes.
    pub layers: ChunkLayers,
    /// Signs, in insertion order.
    pub signs: SignList,
    /// Door and gate geometry ranges from the last mesh.
    pub doors: DoorMap,
    /// Faces in the block buffer.
    pub faces: usize,
    /// Glyph quads in the sign buffer.
    pub sign_faces: usize,
    /// Lowest y with geometry; greater than `maxy` when there is none.
    pub miny: i32,
    /// Highest y with geometry.
    pub maxy: i32,
    /// Block geometry is stale.
    pub dirty: bool,
    /// Sign geometry is stale.
    pub dirty_signs: bool,
    /// Block geometry buffer.
    pub buffer: Option<BufferHandle>,
    /// Sign geometry buffer.
    pub sign_buffer: Option<BufferHandle>,
}

impl Chunk {
    /// An empty chunk with both dirty flags set and no buffers.
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            layers: ChunkLayers::new(coord),
            signs: SignList::default(),
            doors: DoorMap::default(),
            faces: 0,
            sign_faces: 0,
            miny: WORLD_HEIGHT,
            maxy: 0,
            dirty: true,
            dirty_signs: true,
            buffer: None,
            sign_buffer: None,
        }
    }

    /// Borrows the chunk's voxel data.
    pub fn view(&self) -> ChunkView<'_> {
        ChunkView {
            layers: &self.layers,
            doors: &self.doors,
        }
    }

    /// Deep-copies the chunk's voxel data.
    pub fn snapshot(&self) -> ChunkSnapshot {
        ChunkSnapshot {
            layers: self.layers.clone(),
            doors: self.doors.clone(),
        }
    }

    /// Releases both buffers back to their owner.
    pub fn release<B: BufferOwner + ?Sized>(&mut self, buffers: &mut B) {
        if let Some(handle) = self.buffer.take() {
            buffers.destroy(handle);
        }
        if let Some(handle) = self.sign_buffer.take() {
            buffers.destroy(handle);
        }
        self.faces = 0;
        self.sign_faces = 0;
    }
}
