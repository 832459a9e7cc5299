//! # Chunk Scheduler
//!
//! Decides which chunk is created, loaded or remeshed next, and which chunks
//! are dropped, as viewpoints move.
//!
//! ## Paths
//!
//! * **force**: the 3x3 chunks around a viewpoint are created and meshed on
//!   the main thread, straight from the live chunks.
//! * **dispatch**: every idle worker gets the best candidate from its share of
//!   the create radius, meshed from a private snapshot.
//! * **complete**: finished jobs are merged back into the world.
//! * **delete**: chunks too far from every viewpoint are freed.
//!
//! ## Ranking
//!
//! Candidates are ranked by [`CandidateScore`]: visible chunks first, then
//! dirty chunks that are already on screen, then the nearest.
//!
//! A chunk is never the target of two jobs at once: dispatch clears the dirty
//! flag and remembers the chunk until its job comes back.

use std::collections::HashSet;

use log::{debug, trace};

use crate::engine_state::buffer_state::{BufferKind, BufferOwner};
use crate::engine_state::camera_state::Frustum;
use crate::engine_state::rendering::meshing::{
    compute_chunk, sign::sign_mesh, ChunkMesh, MeshSettings,
};
use crate::engine_state::task_management::task::{LoadedChunk, MeshJob, MeshJobOutput};
use crate::engine_state::task_management::WorkerPool;
use crate::engine_state::voxels::chunk::{Chunk, ChunkCoord, WORLD_HEIGHT};
use crate::engine_state::voxels::storage::ChunkLoader;
use crate::engine_state::voxels::world::World;

/// Ranking of a dispatch candidate; lower is better.
///
/// Fields compare in declaration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CandidateScore {
    /// The chunk is outside the view frustum.
    pub invisible: bool,
    /// The chunk is not a dirty chunk with geometry already on screen.
    pub not_refreshing_onscreen: bool,
    /// Chebyshev distance from the viewpoint's chunk.
    pub distance: i32,
}

/// Which worker owns a coordinate: `(|p| xor |q|) mod worker_count`.
pub fn worker_for(coord: ChunkCoord, worker_count: usize) -> usize {
    let hash = (coord.p.unsigned_abs() ^ coord.q.unsigned_abs()) as usize;
    hash % worker_count.max(1)
}

/// Streaming policy plus the set of chunks with a job outstanding.
#[derive(Debug, Default)]
pub struct ChunkScheduler {
    in_flight: HashSet<ChunkCoord>,
}

impl ChunkScheduler {
    /// A scheduler with nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `coord` has a job outstanding.
    pub fn is_in_flight(&self, coord: ChunkCoord) -> bool {
        self.in_flight.contains(&coord)
    }

    /// Number of jobs outstanding.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Creates, loads and meshes the chunks around `center` on this thread.
    ///
    /// Existing chunks are remeshed only when dirty. Chunks with a job
    /// outstanding are left to their worker.
    ///
    /// # Returns
    /// Number of chunks meshed.
    pub fn force<B: BufferOwner + ?Sized>(
        &mut self,
        world: &mut World,
        loader: &ChunkLoader,
        buffers: &mut B,
        settings: &MeshSettings,
        center: ChunkCoord,
    ) -> usize {
        let mut meshed = 0;
        for coord in center.neighborhood() {
            if self.in_flight.contains(&coord) {
                continue;
            }
            match world.chunk(coord).map(|c| c.dirty) {
                Some(false) => continue,
                Some(true) => {}
                None => {
                    let Some(chunk) = world.create_chunk(coord) else {
                        continue;
                    };
                    loader.load(coord, &mut chunk.layers, &mut chunk.signs);
                }
            }
            let mesh = compute_chunk(&world.view_neighborhood(coord), settings);
            if let Some(chunk) = world.chunk_mut(coord) {
                chunk.dirty = false;
                upload_mesh(chunk, mesh, buffers);
                meshed += 1;
            }
        }
        if meshed > 0 {
            trace!("Forced {} chunks around ({}, {})", meshed, center.p, center.q);
        }
        meshed
    }

    /// Hands every idle worker its best candidate around `center`.
    ///
    /// # Arguments
    /// * `world` - Chunks are created here for new candidates
    /// * `pool` - Workers to feed
    /// * `frustum` - The viewpoint's frustum, for ranking
    /// * `center` - The viewpoint's chunk
    /// * `radius` - Create radius
    /// * `settings` - Meshing options passed to each job
    ///
    /// # Returns
    /// Number of jobs dispatched.
    pub fn dispatch(
        &mut self,
        world: &mut World,
        pool: &WorkerPool<MeshJob>,
        frustum: &Frustum,
        center: ChunkCoord,
        radius: i32,
        settings: &MeshSettings,
    ) -> usize {
        let worker_count = pool.worker_count();
        let mut dispatched = 0;
        for index in pool.idle_workers() {
            let Some(coord) = self.best_candidate(world, frustum, center, radius, index, worker_count)
            else {
                continue;
            };
            let load = world.chunk(coord).is_none();
            if load && world.create_chunk(coord).is_none() {
                continue;
            }
            let neighborhood = world.snapshot_neighborhood(coord);
            if let Some(chunk) = world.chunk_mut(coord) {
                chunk.dirty = false;
            }
            let job = MeshJob {
                coord,
                load,
                neighborhood,
                settings: *settings,
            };
            match pool.submit(index, job) {
                Ok(()) => {
                    debug!(
                        "Dispatched chunk ({}, {}) to worker {} (load: {})",
                        coord.p, coord.q, index, load
                    );
                    self.in_flight.insert(coord);
                    dispatched += 1;
                }
                Err(_) => {
                    if let Some(chunk) = world.chunk_mut(coord) {
                        chunk.dirty = true;
                    }
                }
            }
        }
        dispatched
    }

    fn best_candidate(
        &self,
        world: &World,
        frustum: &Frustum,
        center: ChunkCoord,
        radius: i32,
        index: usize,
        worker_count: usize,
    ) -> Option<ChunkCoord> {
        let mut best: Option<(CandidateScore, ChunkCoord)> = None;
        for dp in -radius..=radius {
            for dq in -radius..=radius {
                let coord = center.offset(dp, dq);
                if worker_for(coord, worker_count) != index || self.in_flight.contains(&coord) {
                    continue;
                }
                let chunk = world.chunk(coord);
                if chunk.is_some_and(|c| !c.dirty) {
                    continue;
                }
                // Remeshes may grow a chunk upward, so rank on the whole column.
                let score = CandidateScore {
                    invisible: !frustum.chunk_visible(coord, 0, WORLD_HEIGHT),
                    not_refreshing_onscreen: !chunk.is_some_and(|c| c.buffer.is_some() && c.dirty),
                    distance: coord.distance(center),
                };
                if best.map_or(true, |(s, _)| score < s) {
                    best = Some((score, coord));
                }
            }
        }
        best.map(|(_, coord)| coord)
    }

    /// Merges a finished job into the world.
    ///
    /// A loaded job replaces the chunk's voxels. The store is replayed over
    /// them again; if that changes anything, an edit arrived while the job ran
    /// and the chunk is left dirty.
    /// Doors whose pose changed while the job ran also leave the chunk dirty.
    ///
    /// # Returns
    /// `false` when the chunk was deleted in the meantime.
    pub fn complete<B: BufferOwner + ?Sized>(
        &mut self,
        world: &mut World,
        buffers: &mut B,
        output: MeshJobOutput,
    ) -> bool {
        let MeshJobOutput { coord, loaded, mesh } = output;
        self.in_flight.remove(&coord);
        let store = world.store().clone();
        let Some(chunk) = world.chunk_mut(coord) else {
            trace!("Dropping job for deleted chunk ({}, {})", coord.p, coord.q);
            return false;
        };
        if let Some(loaded) = loaded {
            let LoadedChunk { layers, signs } = loaded;
            chunk.layers = layers.clone();
            chunk.signs = signs.clone();
            chunk.dirty_signs = true;
            store.replay(coord, &mut chunk.layers, &mut chunk.signs);
            if chunk.layers != layers || chunk.signs != signs {
                trace!("Chunk ({}, {}) was edited while loading", coord.p, coord.q);
                chunk.dirty = true;
            }
        }
        upload_mesh(chunk, mesh, buffers);
        let stale_door = chunk.doors.iter().any(|(position, entry)| {
            chunk.layers.extra.get(position.x, position.y, position.z) != entry.extra
        });
        if stale_door {
            chunk.dirty = true;
        }
        debug!(
            "Completed chunk ({}, {}): {} faces",
            coord.p, coord.q, chunk.faces
        );
        true
    }

    /// Frees every chunk at or beyond `radius` from all of `centers`.
    ///
    /// # Returns
    /// Number of chunks freed.
    pub fn delete<B: BufferOwner + ?Sized>(
        &self,
        world: &mut World,
        buffers: &mut B,
        centers: &[ChunkCoord],
        radius: i32,
    ) -> usize {
        let doomed: Vec<ChunkCoord> = world
            .coords()
            .into_iter()
            .filter(|&coord| centers.iter().all(|&c| coord.distance(c) >= radius))
            .collect();
        doomed
            .into_iter()
            .filter(|&coord| world.remove_chunk(coord, buffers))
            .count()
    }
}

/// Replaces a chunk's block geometry. Empty meshes get no buffer.
pub fn upload_mesh<B: BufferOwner + ?Sized>(chunk: &mut Chunk, mesh: ChunkMesh, buffers: &mut B) {
    if let Some(handle) = chunk.buffer.take() {
        buffers.destroy(handle);
    }
    if mesh.faces > 0 {
        chunk.buffer = Some(buffers.create_buffer(BufferKind::Blocks, mesh.bytes(), mesh.faces));
    }
    chunk.faces = mesh.faces;
    chunk.miny = mesh.miny;
    chunk.maxy = mesh.maxy;
    chunk.doors = mesh.doors;
}

/// Rebuilds the sign geometry of a chunk whose signs changed.
///
/// # Returns
/// `false` when the signs were already current.
pub fn refresh_signs<B: BufferOwner + ?Sized>(chunk: &mut Chunk, buffers: &mut B) -> bool {
    if !chunk.dirty_signs {
        return false;
    }
    chunk.dirty_signs = false;
    if let Some(handle) = chunk.sign_buffer.take() {
        buffers.destroy(handle);
    }
    let mesh = sign_mesh(&chunk.signs, &chunk.layers);
    if mesh.faces > 0 {
        chunk.sign_buffer = Some(buffers.create_buffer(
            BufferKind::Signs,
            bytemuck::cast_slice(&mesh.vertices),
            mesh.faces,
        ));
    }
    chunk.sign_faces = mesh.faces;
    true
}
