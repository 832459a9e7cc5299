//! # World Module
//!
//! This module provides the `World` struct, the explicit context owning every
//! resident chunk. All voxel reads and writes go through it; nothing about the
//! world lives in globals.
//!
//! ## Architecture
//!
//! The world uses a sparse storage approach where only chunks near a
//! viewpoint are resident, bounded by `max_chunks`. Edits to chunks that are
//! not resident go only to the [`ChunkStore`] and are replayed when the chunk
//! is loaded.
//!
//! ## Writes
//!
//! * Block, extra, shape and transform writes are mirrored, negated, into the
//!   padding of every neighboring chunk whose border covers the voxel.
//! * Light writes are clamped to `0..=15` and never mirrored.
//! * Clearing a block in its owning chunk also clears its signs, light, extra,
//!   shape, transform and door entry.
//! * A write that changes a resident chunk marks it dirty; when lights are
//!   around, the dirty flag spreads to the eight neighbors.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, trace, warn};

use super::block::shape::{Shape, EXTRA_OPEN};
use super::chunk::{
    chunk_of,
    neighborhood::Neighborhood,
    signs::Sign,
    Chunk, ChunkCoord, ChunkSnapshot, ChunkView, Layer,
};
use super::storage::ChunkStore;
use crate::engine_state::buffer_state::BufferOwner;
use crate::engine_state::rendering::meshing::{geometry::emit_openable, light::MAX_LIGHT};

/// Every resident chunk plus the store edits are written through to.
pub struct World {
    chunks: HashMap<ChunkCoord, Chunk>,
    max_chunks: usize,
    show_lights: bool,
    store: Arc<dyn ChunkStore>,
}

impl World {
    /// Creates a new, empty world.
    ///
    /// # Arguments
    /// * `max_chunks` - Most chunks resident at once
    /// * `show_lights` - Whether light emitters affect meshing and dirty propagation
    /// * `store` - Where edits are recorded
    pub fn new(max_chunks: usize, show_lights: bool, store: Arc<dyn ChunkStore>) -> Self {
        Self {
            chunks: HashMap::new(),
            max_chunks,
            show_lights,
            store,
        }
    }

    /// The store edits are written through to.
    pub fn store(&self) -> &Arc<dyn ChunkStore> {
        &self.store
    }

    /// Whether lights are shown.
    pub fn show_lights(&self) -> bool {
        self.show_lights
    }

    /// The resident chunk at `coord`.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Mutable access to the resident chunk at `coord`.
    pub fn chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    /// Every resident chunk, in unspecified order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Mutable access to every resident chunk.
    pub fn chunks_mut(&mut self) -> impl Iterator<Item = &mut Chunk> {
        self.chunks.values_mut()
    }

    /// Coordinates of every resident chunk.
    pub fn coords(&self) -> Vec<ChunkCoord> {
        self.chunks.keys().copied().collect()
    }

    /// Number of resident chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no more chunks can be created.
    pub fn is_full(&self) -> bool {
        self.chunks.len() >= self.max_chunks
    }

    /// Creates an empty, dirty chunk at `coord`.
    ///
    /// # Returns
    /// The new chunk, or `None` when the chunk already exists or the world is
    /// at capacity. Callers treat `None` as "not available yet".
    pub fn create_chunk(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        if self.chunks.contains_key(&coord) {
            return None;
        }
        if self.is_full() {
            warn!(
                "Chunk limit of {} reached, not creating chunk ({}, {})",
                self.max_chunks, coord.p, coord.q
            );
            return None;
        }
        debug!("Creating chunk ({}, {})", coord.p, coord.q);
        Some(self.chunks.entry(coord).or_insert_with(|| Chunk::new(coord)))
    }

    /// Drops the chunk at `coord` and releases its buffers.
    pub fn remove_chunk<B: BufferOwner + ?Sized>(&mut self, coord: ChunkCoord, buffers: &mut B) -> bool {
        match self.chunks.remove(&coord) {
            Some(mut chunk) => {
                debug!("Deleting chunk ({}, {})", coord.p, coord.q);
                chunk.release(buffers);
                true
            }
            None => false,
        }
    }

    /// Borrowed views of `coord` and its neighbors, for meshing on this thread.
    pub fn view_neighborhood(&self, coord: ChunkCoord) -> Neighborhood<ChunkView<'_>> {
        Neighborhood::build(coord, |c| self.chunks.get(&c).map(Chunk::view))
    }

    /// Deep copies of `coord` and its neighbors, for meshing on a worker.
    pub fn snapshot_neighborhood(&self, coord: ChunkCoord) -> Neighborhood<ChunkSnapshot> {
        Neighborhood::build(coord, |c| self.chunks.get(&c).map(Chunk::snapshot))
    }

    /// Whether `coord` or any neighbor holds a light emitter, with lights shown.
    pub fn has_lights(&self, coord: ChunkCoord) -> bool {
        self.show_lights
            && coord.neighborhood().any(|c| {
                self.chunks
                    .get(&c)
                    .is_some_and(|chunk| !chunk.layers.light.is_empty())
            })
    }

    /// Flags a chunk's block and sign geometry as stale.
    ///
    /// When [`World::has_lights`] holds, the eight neighbors' block geometry
    /// is flagged too, since light crosses chunk borders.
    pub fn mark_dirty(&mut self, coord: ChunkCoord) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        chunk.dirty = true;
        chunk.dirty_signs = true;
        if self.has_lights(coord) {
            for c in coord.neighborhood() {
                if let Some(other) = self.chunks.get_mut(&c) {
                    other.dirty = true;
                }
            }
        }
    }

    fn get_layer(&self, layer: Layer, x: i32, y: i32, z: i32) -> i32 {
        self.chunks
            .get(&ChunkCoord::containing(x, z))
            .map_or(0, |chunk| chunk.layers.get(layer).get(x, y, z))
    }

    /// Block id at a voxel; 0 when the owning chunk is not resident.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> i32 {
        self.get_layer(Layer::Block, x, y, z)
    }

    /// Extra flags at a voxel.
    pub fn get_extra(&self, x: i32, y: i32, z: i32) -> i32 {
        self.get_layer(Layer::Extra, x, y, z)
    }

    /// Light emitted at a voxel.
    pub fn get_light(&self, x: i32, y: i32, z: i32) -> i32 {
        self.get_layer(Layer::Light, x, y, z)
    }

    /// Shape id at a voxel.
    pub fn get_shape(&self, x: i32, y: i32, z: i32) -> i32 {
        self.get_layer(Layer::Shape, x, y, z)
    }

    /// Transform id at a voxel.
    pub fn get_transform(&self, x: i32, y: i32, z: i32) -> i32 {
        self.get_layer(Layer::Transform, x, y, z)
    }

    /// Text of the sign on one voxel face.
    pub fn get_sign(&self, x: i32, y: i32, z: i32, face: i32) -> Option<&str> {
        self.chunks
            .get(&ChunkCoord::containing(x, z))
            .and_then(|chunk| chunk.signs.get(x, y, z, face))
    }

    /// Sets the block at a voxel. Zero clears the voxel and everything on it.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, w: i32) {
        self.set_mirrored(Layer::Block, x, y, z, w, true);
    }

    /// Sets the extra flags at a voxel.
    pub fn set_extra(&mut self, x: i32, y: i32, z: i32, w: i32) {
        self.set_mirrored(Layer::Extra, x, y, z, w, true);
    }

    /// Sets the shape at a voxel.
    pub fn set_shape(&mut self, x: i32, y: i32, z: i32, w: i32) {
        self.set_mirrored(Layer::Shape, x, y, z, w, true);
    }

    /// Sets the transform at a voxel.
    pub fn set_transform(&mut self, x: i32, y: i32, z: i32, w: i32) {
        self.set_mirrored(Layer::Transform, x, y, z, w, true);
    }

    /// Sets the light emitted at a voxel, clamped to `0..=15`.
    ///
    /// # Returns
    /// The value actually stored.
    pub fn set_light(&mut self, x: i32, y: i32, z: i32, w: i32) -> i32 {
        self.set_light_in(ChunkCoord::containing(x, z), x, y, z, w)
    }

    /// Applies a write to any layer.
    pub fn set_layer(&mut self, layer: Layer, x: i32, y: i32, z: i32, value: i32) {
        match layer {
            Layer::Light => {
                self.set_light(x, y, z, value);
            }
            _ => self.set_mirrored(layer, x, y, z, value, true),
        }
    }

    /// Switches the light at a voxel between off and full brightness.
    pub fn toggle_light(&mut self, x: i32, y: i32, z: i32) {
        let coord = ChunkCoord::containing(x, z);
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        let w = if chunk.layers.light.get(x, y, z) != 0 {
            0
        } else {
            MAX_LIGHT
        };
        chunk.layers.light.set(x, y, z, w);
        self.store.record(coord, Layer::Light, x, y, z, w);
        self.mark_dirty(coord);
    }

    /// Puts text on a voxel face. Empty text removes the sign.
    pub fn set_sign(&mut self, x: i32, y: i32, z: i32, face: i32, text: &str) {
        if text.is_empty() {
            self.unset_sign_face(x, y, z, face);
            return;
        }
        let coord = ChunkCoord::containing(x, z);
        let sign = Sign {
            x,
            y,
            z,
            face,
            text: text.to_string(),
        };
        if let Some(chunk) = self.chunks.get_mut(&coord) {
            chunk.signs.add(sign.clone());
            chunk.dirty_signs = true;
        }
        self.store.record_sign(coord, sign);
    }

    /// Removes the sign on one voxel face.
    pub fn unset_sign_face(&mut self, x: i32, y: i32, z: i32, face: i32) {
        let coord = ChunkCoord::containing(x, z);
        self.store.remove_sign(coord, x, y, z, face);
        if let Some(chunk) = self.chunks.get_mut(&coord) {
            if chunk.signs.remove(x, y, z, face) {
                chunk.dirty_signs = true;
            }
        }
    }

    /// Removes every sign on a voxel.
    pub fn unset_sign(&mut self, x: i32, y: i32, z: i32) {
        let coord = ChunkCoord::containing(x, z);
        self.store.remove_signs(coord, x, y, z);
        if let Some(chunk) = self.chunks.get_mut(&coord) {
            if chunk.signs.remove_all(x, y, z) {
                chunk.dirty_signs = true;
            }
        }
    }

    /// Opens or closes the door or gate at a voxel.
    ///
    /// Both halves of a door move together. Each half whose geometry is in a
    /// live buffer is redrawn in place; otherwise its chunk is marked dirty.
    ///
    /// # Returns
    /// `false` when the voxel holds nothing that opens.
    pub fn toggle_door<B: BufferOwner + ?Sized>(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        buffers: &mut B,
    ) -> bool {
        let shape = Shape::from_id(self.get_shape(x, y, z));
        if !shape.is_openable() {
            return false;
        }
        let mut halves = vec![y];
        match shape {
            Shape::LowerDoor if Shape::from_id(self.get_shape(x, y + 1, z)) == Shape::UpperDoor => {
                halves.push(y + 1)
            }
            Shape::UpperDoor if Shape::from_id(self.get_shape(x, y - 1, z)) == Shape::LowerDoor => {
                halves.push(y - 1)
            }
            _ => {}
        }
        for y in halves {
            let extra = self.get_extra(x, y, z) ^ EXTRA_OPEN;
            self.set_mirrored(Layer::Extra, x, y, z, extra, false);
            if !self.patch_door(Point3::new(x, y, z), extra, buffers) {
                self.mark_dirty(ChunkCoord::containing(x, z));
            }
        }
        true
    }

    /// Redraws one door entry into its chunk's live buffer.
    fn patch_door<B: BufferOwner + ?Sized>(
        &mut self,
        position: Point3<i32>,
        extra: i32,
        buffers: &mut B,
    ) -> bool {
        let coord = ChunkCoord::containing(position.x, position.z);
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return false;
        };
        let Some(handle) = chunk.buffer else {
            return false;
        };
        let Some(entry) = chunk.doors.get_mut(position) else {
            return false;
        };
        entry.extra = extra;
        let mut vertices = Vec::with_capacity(entry.vertex_count);
        emit_openable(&mut vertices, position, entry);
        if vertices.len() != entry.vertex_count {
            return false;
        }
        buffers.write_buffer(
            handle,
            entry.byte_offset() as u64,
            bytemuck::cast_slice(&vertices),
        );
        trace!(
            "Patched door at ({}, {}, {}): {} vertices",
            position.x,
            position.y,
            position.z,
            vertices.len()
        );
        true
    }

    /// Writes `w` in the owning chunk and `-w` in every neighbor whose
    /// padding covers the voxel.
    fn set_mirrored(&mut self, layer: Layer, x: i32, y: i32, z: i32, w: i32, dirty: bool) {
        let owner = ChunkCoord::containing(x, z);
        self.set_in(owner, layer, x, y, z, w, dirty);
        for dx in -1..=1 {
            for dz in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                if dx != 0 && chunk_of(x + dx) == owner.p {
                    continue;
                }
                if dz != 0 && chunk_of(z + dz) == owner.q {
                    continue;
                }
                self.set_in(owner.offset(dx, dz), layer, x, y, z, -w, dirty);
            }
        }
    }

    /// Writes one value into one chunk's layer and records it.
    ///
    /// Every write is recorded, even when the resident layer already holds
    /// the value: a chunk whose load is in flight has empty layers, and the
    /// record is what survives the load. Only actual changes mark dirty.
    #[allow(clippy::too_many_arguments)]
    fn set_in(&mut self, coord: ChunkCoord, layer: Layer, x: i32, y: i32, z: i32, w: i32, dirty: bool) {
        self.store.record(coord, layer, x, y, z, w);
        let changed = self
            .chunks
            .get_mut(&coord)
            .is_some_and(|chunk| chunk.layers.get_mut(layer).set(x, y, z, w));
        if changed && dirty {
            self.mark_dirty(coord);
        }

        if layer == Layer::Block && w == 0 && ChunkCoord::containing(x, z) == coord {
            self.unset_sign(x, y, z);
            self.set_light_in(coord, x, y, z, 0);
            self.set_in(coord, Layer::Extra, x, y, z, 0, true);
            self.set_in(coord, Layer::Shape, x, y, z, 0, true);
            self.set_in(coord, Layer::Transform, x, y, z, 0, true);
            if let Some(chunk) = self.chunks.get_mut(&coord) {
                chunk.doors.clear(Point3::new(x, y, z));
            }
        }
    }

    fn set_light_in(&mut self, coord: ChunkCoord, x: i32, y: i32, z: i32, w: i32) -> i32 {
        let w = w.clamp(0, MAX_LIGHT);
        self.store.record(coord, Layer::Light, x, y, z, w);
        let changed = self
            .chunks
            .get_mut(&coord)
            .is_some_and(|chunk| chunk.layers.light.set(x, y, z, w));
        if changed {
            self.mark_dirty(coord);
        }
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::buffer_state::{BufferKind, HostBufferState};
    use crate::engine_state::voxels::block::shape::{GATE_ID, LOWER_DOOR_ID, UPPER_DOOR_ID};
    use crate::engine_state::voxels::chunk::{signs::SignList, ChunkLayers};
    use crate::engine_state::voxels::storage::MemoryStore;

    fn world_with(coords: &[(i32, i32)]) -> (World, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let mut world = World::new(64, true, store.clone());
        for &(p, q) in coords {
            world.create_chunk(ChunkCoord::new(p, q));
        }
        for chunk in world.chunks_mut() {
            chunk.dirty = false;
            chunk.dirty_signs = false;
        }
        (world, store)
    }

    fn dirty(world: &World, p: i32, q: i32) -> bool {
        world.chunk(ChunkCoord::new(p, q)).is_some_and(|c| c.dirty)
    }

    #[test]
    fn border_writes_are_mirrored_negated() {
        let (mut world, _) = world_with(&[(0, 0), (1, 0), (1, 1), (0, 1)]);
        world.set_block(15, 4, 15, 3);
        let at = |p, q| world.chunk(ChunkCoord::new(p, q)).map(|c| c.layers.block.get(15, 4, 15));
        assert_eq!(at(0, 0), Some(3));
        assert_eq!(at(1, 0), Some(-3));
        assert_eq!(at(0, 1), Some(-3));
        assert_eq!(at(1, 1), Some(-3));
        assert_eq!(world.get_block(15, 4, 15), 3);
    }

    #[test]
    fn interior_writes_stay_in_the_owner() {
        let (mut world, store) = world_with(&[(0, 0), (1, 0)]);
        world.set_block(8, 4, 8, 3);
        assert_eq!(world.get_block(8, 4, 8), 3);
        assert!(dirty(&world, 0, 0));
        assert!(!dirty(&world, 1, 0));
        assert_eq!(store.recorded(ChunkCoord::new(1, 0)), 0);
    }

    #[test]
    fn writes_to_absent_chunks_go_to_the_store() {
        let (mut world, store) = world_with(&[]);
        world.set_block(40, 3, 40, 5);
        assert_eq!(world.get_block(40, 3, 40), 0);
        assert_eq!(store.recorded(ChunkCoord::new(2, 2)), 1);
    }

    #[test]
    fn repeated_writes_keep_one_record() {
        let (mut world, store) = world_with(&[(0, 0)]);
        world.set_block(8, 4, 8, 3);
        world.set_block(8, 4, 8, 3);
        assert_eq!(store.recorded(ChunkCoord::new(0, 0)), 1);
    }

    #[test]
    fn writes_matching_empty_layers_are_still_recorded() {
        let (mut world, store) = world_with(&[(0, 0)]);
        world.set_extra(8, 4, 8, 0);
        assert_eq!(store.recorded(ChunkCoord::new(0, 0)), 1);
        assert!(!dirty(&world, 0, 0));

        // The record wins over whatever a later load generates.
        let mut layers = ChunkLayers::new(ChunkCoord::new(0, 0));
        let mut signs = SignList::default();
        layers.extra.set(8, 4, 8, EXTRA_OPEN);
        store.replay(ChunkCoord::new(0, 0), &mut layers, &mut signs);
        assert_eq!(layers.extra.get(8, 4, 8), 0);
    }

    #[test]
    fn clearing_a_block_clears_what_sits_on_it() {
        let (mut world, _) = world_with(&[(0, 0)]);
        world.set_block(8, 4, 8, 8);
        world.set_shape(8, 4, 8, LOWER_DOOR_ID);
        world.set_extra(8, 4, 8, EXTRA_OPEN);
        world.set_transform(8, 4, 8, 2);
        world.set_light(8, 4, 8, 9);
        world.set_sign(8, 4, 8, 1, "hello");
        world.set_block(8, 4, 8, 0);
        assert_eq!(world.get_shape(8, 4, 8), 0);
        assert_eq!(world.get_extra(8, 4, 8), 0);
        assert_eq!(world.get_transform(8, 4, 8), 0);
        assert_eq!(world.get_light(8, 4, 8), 0);
        assert_eq!(world.get_sign(8, 4, 8, 1), None);
    }

    #[test]
    fn light_is_clamped_and_not_mirrored() {
        let (mut world, _) = world_with(&[(0, 0), (1, 0)]);
        assert_eq!(world.set_light(15, 4, 4, 40), 15);
        assert_eq!(world.get_light(15, 4, 4), 15);
        let neighbor = world.chunk(ChunkCoord::new(1, 0)).map(|c| c.layers.light.len());
        assert_eq!(neighbor, Some(0));
        assert_eq!(world.set_light(15, 4, 4, -2), 0);
    }

    #[test]
    fn lights_spread_dirty_flags_to_neighbors() {
        let (mut world, _) = world_with(&[(0, 0), (1, 0), (-1, -1)]);
        world.set_block(8, 4, 8, 3);
        assert!(!dirty(&world, 1, 0));

        world.toggle_light(8, 5, 8);
        assert_eq!(world.get_light(8, 5, 8), 15);
        assert!(dirty(&world, 1, 0));
        assert!(dirty(&world, -1, -1));

        world.toggle_light(8, 5, 8);
        assert_eq!(world.get_light(8, 5, 8), 0);
    }

    #[test]
    fn hidden_lights_do_not_spread_dirty_flags() {
        let store = Arc::new(MemoryStore::new());
        let mut world = World::new(64, false, store);
        world.create_chunk(ChunkCoord::new(0, 0));
        world.create_chunk(ChunkCoord::new(1, 0));
        world.set_light(8, 5, 8, 15);
        if let Some(c) = world.chunk_mut(ChunkCoord::new(1, 0)) {
            c.dirty = false;
        }
        world.set_block(8, 4, 8, 3);
        assert!(!world.has_lights(ChunkCoord::new(0, 0)));
        assert!(!dirty(&world, 1, 0));
    }

    #[test]
    fn signs_replace_and_remove() {
        let (mut world, _) = world_with(&[(0, 0)]);
        world.set_sign(3, 4, 5, 2, "one");
        world.set_sign(3, 4, 5, 2, "two");
        assert_eq!(world.get_sign(3, 4, 5, 2), Some("two"));
        assert!(world.chunk(ChunkCoord::new(0, 0)).is_some_and(|c| c.dirty_signs));
        world.set_sign(3, 4, 5, 2, "");
        assert_eq!(world.get_sign(3, 4, 5, 2), None);
    }

    #[test]
    fn capacity_refuses_new_chunks() {
        let mut world = World::new(2, true, Arc::new(MemoryStore::new()));
        assert!(world.create_chunk(ChunkCoord::new(0, 0)).is_some());
        assert!(world.create_chunk(ChunkCoord::new(0, 0)).is_none());
        assert!(world.create_chunk(ChunkCoord::new(0, 1)).is_some());
        assert!(world.create_chunk(ChunkCoord::new(0, 2)).is_none());
        assert_eq!(world.chunk_count(), 2);
    }

    #[test]
    fn removing_a_chunk_releases_its_buffers() {
        let (mut world, _) = world_with(&[(0, 0)]);
        let mut buffers = HostBufferState::new();
        let handle = buffers.create_buffer(BufferKind::Blocks, &[0; 8], 0);
        if let Some(c) = world.chunk_mut(ChunkCoord::new(0, 0)) {
            c.buffer = Some(handle);
        }
        assert!(world.remove_chunk(ChunkCoord::new(0, 0), &mut buffers));
        assert_eq!(buffers.live_buffers(), 0);
        assert!(!world.remove_chunk(ChunkCoord::new(0, 0), &mut buffers));
    }

    #[test]
    fn toggling_without_geometry_marks_dirty() {
        let (mut world, _) = world_with(&[(0, 0)]);
        world.set_block(4, 4, 4, 8);
        world.set_shape(4, 4, 4, LOWER_DOOR_ID);
        world.set_block(4, 5, 4, 8);
        world.set_shape(4, 5, 4, UPPER_DOOR_ID);
        if let Some(c) = world.chunk_mut(ChunkCoord::new(0, 0)) {
            c.dirty = false;
        }
        let mut buffers = HostBufferState::new();
        assert!(world.toggle_door(4, 4, 4, &mut buffers));
        assert_eq!(world.get_extra(4, 4, 4), EXTRA_OPEN);
        assert_eq!(world.get_extra(4, 5, 4), EXTRA_OPEN);
        assert!(dirty(&world, 0, 0));
        assert!(!world.toggle_door(9, 9, 9, &mut buffers));
    }

    #[test]
    fn gates_toggle_alone() {
        let (mut world, _) = world_with(&[(0, 0)]);
        world.set_block(4, 4, 4, 5);
        world.set_shape(4, 4, 4, GATE_ID);
        world.set_block(4, 5, 4, 5);
        world.set_shape(4, 5, 4, GATE_ID);
        let mut buffers = HostBufferState::new();
        assert!(world.toggle_door(4, 4, 4, &mut buffers));
        assert_eq!(world.get_extra(4, 4, 4), EXTRA_OPEN);
        assert_eq!(world.get_extra(4, 5, 4), 0);
    }
}
