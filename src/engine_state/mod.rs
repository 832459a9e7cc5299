//! # Engine State Module
//!
//! The coordinator tying the world, the worker pool, the scheduler and the
//! edit queue together.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `buffer_state` - The contract with whoever owns geometry buffers
//! * `camera_state` - Viewpoints and frustum tests
//! * `rendering` - Vertex formats and the mesh compute engine
//! * `task_management` - Worker threads and the jobs they run
//! * `voxels` - Voxel data, chunks, world generation and storage
//!
//! ## Frame Order
//!
//! Each call to [`EngineState::tick`] runs, in order:
//! 1. Drain the edit queue into the world
//! 2. For every viewpoint: merge finished jobs, force the chunks around it,
//!    dispatch work to idle workers
//! 3. Delete chunks far from every viewpoint
//! 4. Rebuild sign geometry of chunks whose signs changed

use std::sync::Arc;

use log::{debug, info};

use crate::config::{EngineConfig, ViewRadii};
use crate::error::EngineError;
use crate::scheduler::{refresh_signs, ChunkScheduler};
use buffer_state::BufferOwner;
use camera_state::Viewpoint;
use rendering::meshing::MeshSettings;
use task_management::{task::MeshJob, WorkerPool};
use voxels::chunk::ChunkCoord;
use voxels::edit_queue::EditQueue;
use voxels::generation::{TerrainGenerator, WorldGenerator};
use voxels::storage::{ChunkLoader, ChunkStore, MemoryStore};
use voxels::world::World;

pub mod buffer_state;
pub mod camera_state;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// What one [`EngineState::tick`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Edits applied from the queue.
    pub edits_applied: usize,
    /// Finished jobs merged into the world.
    pub completed: usize,
    /// Chunks meshed on the main thread.
    pub forced: usize,
    /// Jobs handed to workers.
    pub dispatched: usize,
    /// Chunks freed.
    pub deleted: usize,
    /// Chunks whose sign geometry was rebuilt.
    pub signs_rebuilt: usize,
}

/// The main state container for the voxel world.
///
/// Owns every subsystem; other threads reach it only through the
/// [`EditQueue`] handle returned by [`EngineState::edit_queue`].
pub struct EngineState<B: BufferOwner> {
    config: EngineConfig,
    world: World,
    loader: ChunkLoader,
    pool: WorkerPool<MeshJob>,
    scheduler: ChunkScheduler,
    edit_queue: EditQueue,
    buffers: B,
    settings: MeshSettings,
    radii: ViewRadii,
    viewpoint_count: usize,
}

impl<B: BufferOwner> EngineState<B> {
    /// Creates an engine and starts its workers.
    ///
    /// # Arguments
    /// * `config` - Engine tunables; sanitized before use
    /// * `generator` - Fills new chunks
    /// * `store` - Receives every edit and replays it on load
    /// * `buffers` - Receives finished geometry
    ///
    /// # Returns
    /// The engine, or [`EngineError::WorkerSpawn`] when a worker could not start.
    pub fn new(
        config: EngineConfig,
        generator: Arc<dyn WorldGenerator>,
        store: Arc<dyn ChunkStore>,
        buffers: B,
    ) -> Result<Self, EngineError> {
        let config = config.sanitized();
        let loader = ChunkLoader::new(generator, Arc::clone(&store));
        let pool = WorkerPool::new(config.worker_count, Arc::new(loader.clone()))?;
        let world = World::new(config.max_chunks, config.show_lights, store);
        let radii = ViewRadii::derive(&config, 1);
        info!(
            "Engine started with {} workers, radii {:?}",
            pool.worker_count(),
            radii
        );
        Ok(Self {
            edit_queue: EditQueue::new(config.edit_queue_capacity),
            settings: MeshSettings {
                show_lights: config.show_lights,
            },
            config,
            world,
            loader,
            pool,
            scheduler: ChunkScheduler::new(),
            buffers,
            radii,
            viewpoint_count: 1,
        })
    }

    /// Creates an engine over noise terrain with an in-memory store.
    pub fn with_terrain(config: EngineConfig, buffers: B) -> Result<Self, EngineError> {
        let generator = Arc::new(TerrainGenerator::new(config.seed, config.show_plants));
        Self::new(config, generator, Arc::new(MemoryStore::new()), buffers)
    }

    /// Advances the engine by one frame.
    ///
    /// # Arguments
    /// * `viewpoints` - Every viewer the world is streamed around
    pub fn tick(&mut self, viewpoints: &[Viewpoint]) -> TickStats {
        let mut stats = TickStats {
            edits_applied: self.edit_queue.drain(
                &mut self.world,
                self.config.edit_drain_max_items,
                self.config.edit_drain_budget(),
            ),
            ..TickStats::default()
        };

        if !viewpoints.is_empty() && viewpoints.len() != self.viewpoint_count {
            self.viewpoint_count = viewpoints.len();
            self.radii = ViewRadii::derive(&self.config, self.viewpoint_count);
            info!(
                "{} viewpoints, radii now {:?}",
                self.viewpoint_count, self.radii
            );
        }

        if viewpoints.is_empty() {
            stats.completed += self.collect_finished();
        }
        for viewpoint in viewpoints {
            stats.completed += self.collect_finished();
            let center = viewpoint.chunk();
            stats.forced += self.scheduler.force(
                &mut self.world,
                &self.loader,
                &mut self.buffers,
                &self.settings,
                center,
            );
            stats.dispatched += self.scheduler.dispatch(
                &mut self.world,
                &self.pool,
                &viewpoint.frustum(),
                center,
                self.radii.create,
                &self.settings,
            );
        }

        if !viewpoints.is_empty() {
            let centers: Vec<ChunkCoord> = viewpoints.iter().map(Viewpoint::chunk).collect();
            stats.deleted = self.scheduler.delete(
                &mut self.world,
                &mut self.buffers,
                &centers,
                self.radii.delete,
            );
        }

        for chunk in self.world.chunks_mut() {
            if refresh_signs(chunk, &mut self.buffers) {
                stats.signs_rebuilt += 1;
            }
        }

        if stats != TickStats::default() {
            debug!("Tick: {:?}", stats);
        }
        stats
    }

    fn collect_finished(&mut self) -> usize {
        let mut completed = 0;
        for (_, output) in self.pool.collect_finished() {
            if self
                .scheduler
                .complete(&mut self.world, &mut self.buffers, output)
            {
                completed += 1;
            }
        }
        completed
    }

    /// Opens or closes the door or gate at a voxel, patching its geometry in
    /// place when possible.
    pub fn toggle_door(&mut self, x: i32, y: i32, z: i32) -> bool {
        self.world.toggle_door(x, y, z, &mut self.buffers)
    }

    /// Asks every worker to stop and waits for them.
    pub fn shutdown(&mut self) {
        self.pool.shutdown();
    }

    /// A producer handle to the edit queue, for other threads.
    pub fn edit_queue(&self) -> EditQueue {
        self.edit_queue.clone()
    }

    /// The world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for main-thread edits.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The buffer owner.
    pub fn buffers(&self) -> &B {
        &self.buffers
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current create and delete radii.
    pub fn radii(&self) -> ViewRadii {
        self.radii
    }

    /// Number of jobs outstanding on workers.
    pub fn pending_jobs(&self) -> usize {
        self.scheduler.in_flight()
    }
}

impl<B: BufferOwner> Drop for EngineState<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
