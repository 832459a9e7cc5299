//! # Voxel World Core
//!
//! This module contains the voxel data model and everything that mutates it.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Attribute map**: sparse per-chunk store of one voxel property
//! * **Block**: voxel materials, shapes and transforms
//! * **Chunk**: a column of voxels with its signs, door index and buffers
//! * **World**: the explicit context owning every resident chunk
//! * **Edit queue**: deferred mutations from threads that do not own the world
//! * **Generation** and **storage**: the load path filling new chunks
//!
//! ## Data Flow
//!
//! 1. The scheduler creates a chunk and hands it to a worker with `load` set
//! 2. The worker generates the chunk, replays stored edits and meshes it
//! 3. Edits from any thread land in the edit queue and are applied on the
//!    main thread through the world's setters
//! 4. Setters write through to the store and mark chunks dirty for remeshing

pub mod attribute_map;
pub mod block;
pub mod chunk;
pub mod edit_queue;
pub mod generation;
pub mod storage;
pub mod world;
