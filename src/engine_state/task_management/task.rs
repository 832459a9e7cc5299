//! # Task System Core Traits
//!
//! This module defines the unit of work executed by the worker pool and the
//! one job the engine actually runs: loading and meshing a chunk.
//!
//! ## Task Lifecycle
//! 1. A `Task` is built on the main thread and handed to an idle worker
//! 2. The task's `process()` method is called on the worker thread
//! 3. The output is parked in the worker's slot until the main thread
//!    collects it
//!
//! ## Thread Safety
//! - A task owns everything it reads; nothing is shared with the main thread
//!   while it runs
//! - The context is shared by all workers and must be `Sync`

use crate::engine_state::rendering::meshing::{compute_chunk, ChunkMesh, MeshSettings};
use crate::engine_state::voxels::chunk::{
    doors::DoorMap, neighborhood::Neighborhood, signs::SignList, ChunkCoord, ChunkLayers,
    ChunkSnapshot,
};
use crate::engine_state::voxels::storage::ChunkLoader;

/// A unit of work run on a worker thread.
///
/// # Implementation Guidelines
/// - Should own all the data it needs
/// - Should be coarse-grained; each task costs a lock round trip
pub trait Task: Send + 'static {
    /// Shared, read-only state every worker receives.
    type Context: Send + Sync + 'static;
    /// What the task hands back to the main thread.
    type Output: Send + 'static;

    /// Runs the task.
    ///
    /// # Arguments
    /// * `context` - The pool's shared context
    fn process(self, context: &Self::Context) -> Self::Output;
}

/// Loads (when asked) and meshes one chunk from a private snapshot.
#[derive(Debug)]
pub struct MeshJob {
    /// The chunk to mesh.
    pub coord: ChunkCoord,
    /// Whether the chunk's voxels must be generated and replayed first.
    pub load: bool,
    /// Deep copies of the chunk and its neighbors.
    pub neighborhood: Neighborhood<ChunkSnapshot>,
    /// Meshing options.
    pub settings: MeshSettings,
}

/// Voxel data produced by the load path.
#[derive(Debug)]
pub struct LoadedChunk {
    /// Generated layers with stored edits replayed over them.
    pub layers: ChunkLayers,
    /// Generated and stored signs.
    pub signs: SignList,
}

/// The result of a [`MeshJob`].
#[derive(Debug)]
pub struct MeshJobOutput {
    /// The chunk that was meshed.
    pub coord: ChunkCoord,
    /// Present only when the job loaded the chunk.
    pub loaded: Option<LoadedChunk>,
    /// The chunk's block geometry.
    pub mesh: ChunkMesh,
}

impl Task for MeshJob {
    type Context = ChunkLoader;
    type Output = MeshJobOutput;

    fn process(mut self, loader: &ChunkLoader) -> MeshJobOutput {
        let loaded = self.load.then(|| {
            let mut layers = ChunkLayers::new(self.coord);
            let mut signs = SignList::default();
            loader.load(self.coord, &mut layers, &mut signs);
            self.neighborhood.replace_center(ChunkSnapshot {
                layers: layers.clone(),
                doors: DoorMap::default(),
            });
            LoadedChunk { layers, signs }
        });
        let mesh = compute_chunk(&self.neighborhood, &self.settings);
        MeshJobOutput {
            coord: self.coord,
            loaded,
            mesh,
        }
    }
}
