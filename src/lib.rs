#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

//! # Voxel World
//!
//! The core of a streamed, mutable voxel world: chunked voxel storage,
//! background generation and meshing, streaming around moving viewpoints, and
//! a thread-safe edit path.
//!
//! ## Key Modules
//!
//! * `engine_state` - The world, its chunks, the mesh compute engine and the worker pool
//! * `scheduler` - Which chunk to create, mesh or drop next
//! * `config` - Engine tunables and view radii
//! * `error` - Errors raised while setting up an engine
//!
//! ## Architecture
//!
//! One main thread owns the [`engine_state::voxels::world::World`]. Worker
//! threads only ever see private snapshots of it. Other threads submit
//! changes through an [`engine_state::voxels::edit_queue::EditQueue`], which
//! the main thread drains once per frame. Geometry is handed to a
//! [`engine_state::buffer_state::BufferOwner`], so no graphics API is
//! involved.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(err) = voxel_world::run() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use std::thread;
use std::time::Duration;

use cgmath::{Deg, Point3};
use log::info;

pub mod config;
pub mod engine_state;
pub mod error;
pub mod scheduler;

pub use config::{EngineConfig, ViewRadii};
pub use engine_state::{EngineState, TickStats};
pub use error::EngineError;

use engine_state::buffer_state::HostBufferState;
use engine_state::camera_state::Viewpoint;
use engine_state::voxels::block::block_type::BlockType;
use engine_state::voxels::chunk::Layer;
use engine_state::voxels::edit_queue::{Edit, EditQueue};

/// Number of frames the demo runs.
const DEMO_FRAMES: usize = 240;

/// Runs a headless demo: a viewpoint flies over noise terrain while another
/// thread edits the world.
///
/// Logging is configured from `RUST_LOG`.
pub fn run() -> Result<(), EngineError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = EngineConfig {
        seed: fastrand::u32(..),
        ..EngineConfig::default()
    };
    let mut engine = EngineState::with_terrain(config, HostBufferState::new())?;

    let producer = spawn_editor(engine.edit_queue());

    for frame in 0..DEMO_FRAMES {
        let x = frame as f32 * 0.75;
        let viewpoint = Viewpoint::new(
            Point3::new(x, 48.0, 8.0),
            Deg(0.0),
            Deg(-15.0),
            Deg(60.0),
            16.0 / 9.0,
            0.1,
            500.0,
        );
        let stats = engine.tick(&[viewpoint]);
        if frame % 60 == 0 {
            info!("Frame {}: {:?}", frame, stats);
        }
        thread::sleep(Duration::from_millis(4));
    }

    if producer.join().is_err() {
        log::warn!("Edit producer panicked");
    }
    engine.tick(&[]);

    let world = engine.world();
    let faces: usize = world.chunks().map(|c| c.faces).sum();
    let sign_faces: usize = world.chunks().map(|c| c.sign_faces).sum();
    info!(
        "{} chunks resident, {} block faces, {} sign glyphs",
        world.chunk_count(),
        faces,
        sign_faces
    );
    info!(
        "{} buffers live, {} bytes allocated, {} destroyed",
        engine.buffers().live_buffers(),
        engine.buffers().get_total_allocated_memory(),
        engine.buffers().destroyed_buffers()
    );
    engine.shutdown();
    Ok(())
}

/// Pushes random edits near the origin from another thread.
fn spawn_editor(queue: EditQueue) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut dropped = 0;
        for i in 0..2000 {
            let (x, y, z) = (fastrand::i32(-24..24), fastrand::i32(20..60), fastrand::i32(-24..24));
            let edit = match i % 50 {
                0 => Edit::Sign {
                    x,
                    y,
                    z,
                    face: fastrand::i32(0..8),
                    text: format!("edit {i}"),
                },
                1 => Edit::Layer {
                    layer: Layer::Light,
                    x,
                    y,
                    z,
                    value: 15,
                },
                _ => Edit::block(x, y, z, BlockType::get_random_type().id()),
            };
            if !queue.push(edit) {
                dropped += 1;
            }
            if i % 100 == 0 {
                thread::sleep(Duration::from_millis(5));
            }
        }
        info!("Edit producer done, {} edits dropped", dropped);
    })
}
