//! Worker pipeline and scheduling, end to end.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use cgmath::{Deg, Point3};

use voxel_world::engine_state::buffer_state::{BufferOwner, HostBufferState};
use voxel_world::engine_state::camera_state::Viewpoint;
use voxel_world::engine_state::rendering::meshing::MeshSettings;
use voxel_world::engine_state::task_management::task::{MeshJob, MeshJobOutput};
use voxel_world::engine_state::task_management::WorkerPool;
use voxel_world::engine_state::voxels::block::shape::{EXTRA_OPEN, LOWER_DOOR_ID, UPPER_DOOR_ID};
use voxel_world::engine_state::voxels::chunk::{signs::SignList, ChunkCoord, ChunkLayers};
use voxel_world::engine_state::voxels::generation::{FlatGenerator, WorldGenerator};
use voxel_world::engine_state::voxels::storage::{ChunkLoader, MemoryStore};
use voxel_world::engine_state::voxels::world::World;
use voxel_world::{EngineConfig, EngineState};

/// A flat generator that records every chunk it fills.
#[derive(Default)]
struct CountingGenerator {
    calls: AtomicUsize,
    coords: Mutex<Vec<ChunkCoord>>,
    height: i32,
    delay: Duration,
}

impl CountingGenerator {
    fn new(height: i32, delay: Duration) -> Self {
        Self {
            height,
            delay,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn coords(&self) -> Vec<ChunkCoord> {
        self.coords.lock().unwrap().clone()
    }
}

impl WorldGenerator for CountingGenerator {
    fn generate(&self, coord: ChunkCoord, layers: &mut ChunkLayers, signs: &mut SignList) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.coords.lock().unwrap().push(coord);
        thread::sleep(self.delay);
        FlatGenerator {
            height: self.height,
            block: 3,
        }
        .generate(coord, layers, signs);
    }
}

fn viewpoint() -> Viewpoint {
    Viewpoint::new(Point3::new(8.0, 40.0, 8.0), Deg(30.0), Deg(-20.0), Deg(60.0), 1.0, 0.1, 500.0)
}

fn config(workers: usize) -> EngineConfig {
    EngineConfig {
        worker_count: workers,
        gpu_memory_mb: 1024,
        create_radius: 3,
        delete_radius: 6,
        ..EngineConfig::default()
    }
}

fn settled<B: BufferOwner>(engine: &EngineState<B>) -> bool {
    let r = engine.radii().create;
    let center = viewpoint().chunk();
    engine.pending_jobs() == 0
        && (-r..=r).all(|dp| {
            (-r..=r).all(|dq| {
                engine
                    .world()
                    .chunk(center.offset(dp, dq))
                    .is_some_and(|c| !c.dirty)
            })
        })
}

fn settle<B: BufferOwner>(engine: &mut EngineState<B>) {
    for _ in 0..5000 {
        engine.tick(&[viewpoint()]);
        if settled(engine) {
            return;
        }
        thread::sleep(Duration::from_millis(1));
    }
    panic!("world never settled");
}

fn wait_for(pool: &WorkerPool<MeshJob>, index: usize) -> MeshJobOutput {
    for _ in 0..10_000 {
        if let Some(output) = pool.collect(index) {
            return output;
        }
        thread::sleep(Duration::from_millis(1));
    }
    panic!("worker {index} never finished");
}

#[test]
fn jobs_without_load_never_touch_the_load_path() {
    let generator = Arc::new(CountingGenerator::new(4, Duration::ZERO));
    let store = Arc::new(MemoryStore::new());
    let loader = ChunkLoader::new(generator.clone(), store.clone());
    let pool = WorkerPool::<MeshJob>::new(1, Arc::new(loader)).unwrap();

    let coord = ChunkCoord::new(0, 0);
    let mut world = World::new(64, true, store);
    world.create_chunk(coord);
    world.set_block(4, 4, 4, 3);

    let job = MeshJob {
        coord,
        load: false,
        neighborhood: world.snapshot_neighborhood(coord),
        settings: MeshSettings::default(),
    };
    pool.submit(0, job).unwrap();
    let output = wait_for(&pool, 0);
    assert!(output.loaded.is_none());
    assert_eq!(output.mesh.faces, 6);
    assert_eq!(generator.calls(), 0);

    let job = MeshJob {
        coord,
        load: true,
        neighborhood: world.snapshot_neighborhood(coord),
        settings: MeshSettings::default(),
    };
    pool.submit(0, job).unwrap();
    let output = wait_for(&pool, 0);
    assert_eq!(generator.calls(), 1);
    // Stored edits are replayed over the generated terrain.
    let loaded = output.loaded.expect("load requested");
    assert_eq!(loaded.layers.block.get(4, 4, 4), 3);
    assert_eq!(loaded.layers.block.get(4, 0, 4), 3);
}

#[test]
fn every_chunk_is_loaded_exactly_once() {
    let generator = Arc::new(CountingGenerator::new(6, Duration::from_millis(2)));
    let mut engine = EngineState::new(
        config(3),
        generator.clone(),
        Arc::new(MemoryStore::new()),
        HostBufferState::new(),
    )
    .unwrap();
    settle(&mut engine);

    let coords = generator.coords();
    let unique: HashSet<_> = coords.iter().copied().collect();
    assert_eq!(unique.len(), coords.len(), "a chunk was loaded twice");
    assert_eq!(coords.len(), engine.world().chunk_count());
    assert_eq!(engine.world().chunk_count(), 7 * 7);
    assert!(engine.world().chunks().all(|c| c.faces > 0 && c.buffer.is_some()));
}

#[test]
fn air_chunks_get_no_buffers() {
    let generator = Arc::new(CountingGenerator::new(0, Duration::ZERO));
    let mut engine = EngineState::new(
        config(2),
        generator,
        Arc::new(MemoryStore::new()),
        HostBufferState::new(),
    )
    .unwrap();
    settle(&mut engine);
    assert_eq!(engine.world().chunk_count(), 49);
    assert!(engine.world().chunks().all(|c| c.faces == 0 && c.buffer.is_none()));
    assert_eq!(engine.buffers().live_buffers(), 0);
}

#[test]
fn edits_to_unloaded_chunks_survive_loading() {
    let store = Arc::new(MemoryStore::new());
    let mut engine = EngineState::new(
        config(2),
        Arc::new(FlatGenerator::default()),
        store,
        HostBufferState::new(),
    )
    .unwrap();
    // Chunk (2, 2) is not resident yet.
    engine.world_mut().set_block(40, 30, 40, 11);
    assert_eq!(engine.world().get_block(40, 30, 40), 0);
    settle(&mut engine);
    assert_eq!(engine.world().get_block(40, 30, 40), 11);
}

#[test]
fn moving_away_deletes_old_chunks() {
    let mut engine = EngineState::new(
        config(2),
        Arc::new(FlatGenerator::default()),
        Arc::new(MemoryStore::new()),
        HostBufferState::new(),
    )
    .unwrap();
    settle(&mut engine);
    let far = Viewpoint::new(Point3::new(808.0, 40.0, 8.0), Deg(0.0), Deg(0.0), Deg(60.0), 1.0, 0.1, 500.0);
    engine.tick(&[far]);
    assert!(engine
        .world()
        .chunks()
        .all(|c| c.coord.distance(far.chunk()) < engine.radii().delete));
    assert!(engine.world().chunk(ChunkCoord::new(0, 0)).is_none());
}

#[test]
fn door_toggles_patch_the_buffer_in_place() {
    let mut engine = EngineState::new(
        config(1),
        Arc::new(FlatGenerator::default()),
        Arc::new(MemoryStore::new()),
        HostBufferState::new(),
    )
    .unwrap();
    settle(&mut engine);

    let world = engine.world_mut();
    world.set_block(8, 8, 8, 8);
    world.set_shape(8, 8, 8, LOWER_DOOR_ID);
    world.set_block(8, 9, 8, 8);
    world.set_shape(8, 9, 8, UPPER_DOOR_ID);
    settle(&mut engine);

    let coord = ChunkCoord::new(0, 0);
    let handle = engine.world().chunk(coord).and_then(|c| c.buffer).unwrap();
    let before = engine.buffers().contents(handle).unwrap().to_vec();

    assert!(engine.toggle_door(8, 8, 8));
    let chunk = engine.world().chunk(coord).unwrap();
    assert!(!chunk.dirty, "patched doors need no remesh");
    assert_eq!(chunk.buffer, Some(handle));
    assert_eq!(engine.world().get_extra(8, 9, 8), EXTRA_OPEN);
    let patched = engine.buffers().contents(handle).unwrap().to_vec();
    assert_ne!(before, patched);

    // A full remesh draws the same open door.
    engine.world_mut().mark_dirty(coord);
    settle(&mut engine);
    let handle = engine.world().chunk(coord).and_then(|c| c.buffer).unwrap();
    assert_eq!(engine.buffers().contents(handle).unwrap(), &patched[..]);
}

#[test]
fn edits_made_while_a_chunk_loads_are_kept() {
    let generator = Arc::new(CountingGenerator::new(6, Duration::from_millis(100)));
    let mut engine = EngineState::new(
        config(1),
        generator,
        Arc::new(MemoryStore::new()),
        HostBufferState::new(),
    )
    .unwrap();
    engine.tick(&[viewpoint()]);
    assert_eq!(engine.pending_jobs(), 1);
    let target = engine
        .world()
        .chunks()
        .find(|c| c.buffer.is_none())
        .map(|c| c.coord)
        .expect("one chunk is loading");

    let (x, z) = (target.p * 16 + 5, target.q * 16 + 5);
    engine.world_mut().set_block(x, 1, z, 0);
    engine.world_mut().set_block(x, 10, z, 7);

    for _ in 0..2000 {
        if engine.world().chunk(target).is_some_and(|c| c.buffer.is_some()) {
            break;
        }
        thread::sleep(Duration::from_millis(5));
        engine.tick(&[viewpoint()]);
    }
    let chunk = engine.world().chunk(target).unwrap();
    assert!(chunk.buffer.is_some(), "load never finished");
    assert_eq!(engine.world().get_block(x, 1, z), 0, "deletion was lost");
    assert_eq!(engine.world().get_block(x, 10, z), 7);
    assert_eq!(engine.world().get_block(x, 2, z), 3);
}
