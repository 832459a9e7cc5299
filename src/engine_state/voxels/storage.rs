//! # Chunk Storage
//!
//! Every edit is written through to a [`ChunkStore`] keyed by chunk and voxel.
//! When a chunk is loaded, the generator runs first and the stored edits are
//! replayed over its output, so edits always win over generation.
//!
//! Padding mirrors are recorded under the neighboring chunk that holds them,
//! which keeps each chunk's replay self-contained.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use log::trace;

use super::chunk::{signs::Sign, signs::SignList, ChunkCoord, ChunkLayers, Layer};
use super::generation::WorldGenerator;

/// Persisted voxel edits. Called from the main thread for writes and from
/// worker threads for loads.
pub trait ChunkStore: Send + Sync {
    /// Records the value of one layer at one voxel, as stored in `coord`'s maps.
    fn record(&self, coord: ChunkCoord, layer: Layer, x: i32, y: i32, z: i32, value: i32);

    /// Records a sign, replacing any sign on the same voxel face.
    fn record_sign(&self, coord: ChunkCoord, sign: Sign);

    /// Forgets the sign on one voxel face.
    fn remove_sign(&self, coord: ChunkCoord, x: i32, y: i32, z: i32, face: i32);

    /// Forgets every sign on a voxel.
    fn remove_signs(&self, coord: ChunkCoord, x: i32, y: i32, z: i32);

    /// Replays everything recorded for `coord` over `layers` and `signs`.
    fn replay(&self, coord: ChunkCoord, layers: &mut ChunkLayers, signs: &mut SignList);
}

#[derive(Debug, Default)]
struct StoredChunk {
    values: HashMap<(Layer, i32, i32, i32), i32>,
    signs: SignList,
}

/// An in-process [`ChunkStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    chunks: Mutex<HashMap<ChunkCoord, StoredChunk>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded values for `coord`, signs excluded.
    pub fn recorded(&self, coord: ChunkCoord) -> usize {
        self.with_chunks(|chunks| chunks.get(&coord).map_or(0, |c| c.values.len()))
    }

    fn with_chunks<R>(&self, f: impl FnOnce(&mut HashMap<ChunkCoord, StoredChunk>) -> R) -> R {
        let mut chunks = self.chunks.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut chunks)
    }
}

impl ChunkStore for MemoryStore {
    fn record(&self, coord: ChunkCoord, layer: Layer, x: i32, y: i32, z: i32, value: i32) {
        self.with_chunks(|chunks| {
            chunks
                .entry(coord)
                .or_default()
                .values
                .insert((layer, x, y, z), value);
        });
    }

    fn record_sign(&self, coord: ChunkCoord, sign: Sign) {
        self.with_chunks(|chunks| chunks.entry(coord).or_default().signs.add(sign));
    }

    fn remove_sign(&self, coord: ChunkCoord, x: i32, y: i32, z: i32, face: i32) {
        self.with_chunks(|chunks| {
            if let Some(chunk) = chunks.get_mut(&coord) {
                chunk.signs.remove(x, y, z, face);
            }
        });
    }

    fn remove_signs(&self, coord: ChunkCoord, x: i32, y: i32, z: i32) {
        self.with_chunks(|chunks| {
            if let Some(chunk) = chunks.get_mut(&coord) {
                chunk.signs.remove_all(x, y, z);
            }
        });
    }

    fn replay(&self, coord: ChunkCoord, layers: &mut ChunkLayers, signs: &mut SignList) {
        self.with_chunks(|chunks| {
            let Some(stored) = chunks.get(&coord) else {
                return;
            };
            for (&(layer, x, y, z), &value) in &stored.values {
                layers.get_mut(layer).set(x, y, z, value);
            }
            for sign in stored.signs.iter() {
                signs.add(sign.clone());
            }
            trace!(
                "Replayed {} values and {} signs into chunk ({}, {})",
                stored.values.len(),
                stored.signs.len(),
                coord.p,
                coord.q
            );
        });
    }
}

/// The load path: generation followed by stored edits.
#[derive(Clone)]
pub struct ChunkLoader {
    generator: Arc<dyn WorldGenerator>,
    store: Arc<dyn ChunkStore>,
}

impl ChunkLoader {
    /// Combines a generator and a store.
    pub fn new(generator: Arc<dyn WorldGenerator>, store: Arc<dyn ChunkStore>) -> Self {
        Self { generator, store }
    }

    /// The store edits are written to.
    pub fn store(&self) -> &Arc<dyn ChunkStore> {
        &self.store
    }

    /// Fills freshly created layers for `coord`.
    pub fn load(&self, coord: ChunkCoord, layers: &mut ChunkLayers, signs: &mut SignList) {
        self.generator.generate(coord, layers, signs);
        self.store.replay(coord, layers, signs);
    }
}
