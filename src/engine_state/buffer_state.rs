//! # Buffer State Module
//!
//! The engine never talks to a graphics API directly. Finished meshes are handed
//! to a [`BufferOwner`], which returns an opaque [`BufferHandle`] that the chunk
//! keeps until the geometry is replaced or the chunk is dropped.
//!
//! ## Contract
//!
//! * `create_buffer` receives vertex bytes plus a face count and returns a handle.
//! * `write_buffer` patches a byte range of an existing buffer in place; door
//!   toggles use this to redraw a few faces without a remesh.
//! * `destroy` is called exactly once for every handle that stops being referenced.
//!
//! [`HostBufferState`] keeps buffers in host memory and tracks per-buffer usage.
//! It backs the headless demo and the tests, and doubles as a reference for
//! GPU-side implementations.

use std::collections::HashMap;
use std::num::NonZeroU32;

use log::{error, warn};

/// Opaque reference to a buffer held by a [`BufferOwner`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(NonZeroU32);

impl BufferHandle {
    /// Wraps a raw id; zero is reserved for "no buffer".
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    /// The raw id.
    pub fn id(self) -> u32 {
        self.0.get()
    }
}

/// What a buffer holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferKind {
    /// Block geometry, [`crate::engine_state::rendering::vertex::Vertex`] records.
    Blocks,
    /// Sign glyphs, [`crate::engine_state::rendering::vertex::SignVertex`] records.
    Signs,
}

/// Receives generated geometry and owns the resulting buffers.
pub trait BufferOwner {
    /// Stores `data` (describing `faces` faces) and returns a handle to it.
    fn create_buffer(&mut self, kind: BufferKind, data: &[u8], faces: usize) -> BufferHandle;

    /// Overwrites `data.len()` bytes of an existing buffer starting at `offset`.
    fn write_buffer(&mut self, handle: BufferHandle, offset: u64, data: &[u8]);

    /// Releases a buffer. The handle is never used again.
    fn destroy(&mut self, handle: BufferHandle);
}

/// Usage numbers for one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes.
    pub allocated_memory: u64,
    /// Highest byte written so far.
    pub used_memory: u64,
    /// Number of writes, creation included.
    pub times_written: u64,
}

#[derive(Debug)]
struct HostBuffer {
    kind: BufferKind,
    faces: usize,
    data: Vec<u8>,
    analytics: BufferAnalytics,
}

/// A [`BufferOwner`] that keeps buffer contents in host memory.
#[derive(Debug, Default)]
pub struct HostBufferState {
    buffers: HashMap<BufferHandle, HostBuffer>,
    next_id: u32,
    destroyed: u64,
}

impl HostBufferState {
    /// An empty buffer registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes currently stored under `handle`.
    pub fn contents(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&handle).map(|b| b.data.as_slice())
    }

    /// Face count given when `handle` was created.
    pub fn faces(&self, handle: BufferHandle) -> Option<usize> {
        self.buffers.get(&handle).map(|b| b.faces)
    }

    /// What `handle` holds.
    pub fn kind(&self, handle: BufferHandle) -> Option<BufferKind> {
        self.buffers.get(&handle).map(|b| b.kind)
    }

    /// Usage numbers of `handle`.
    pub fn analytics(&self, handle: BufferHandle) -> Option<BufferAnalytics> {
        self.buffers.get(&handle).map(|b| b.analytics)
    }

    /// Number of live buffers.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Number of buffers destroyed so far.
    pub fn destroyed_buffers(&self) -> u64 {
        self.destroyed
    }

    /// Gets the total allocated memory across all buffers
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffers
            .values()
            .fold(0, |acc, b| acc + b.analytics.allocated_memory)
    }

    /// Gets the total used memory across all buffers
    pub fn get_total_used_memory(&self) -> u64 {
        self.buffers
            .values()
            .fold(0, |acc, b| acc + b.analytics.used_memory)
    }
}

impl BufferOwner for HostBufferState {
    fn create_buffer(&mut self, kind: BufferKind, data: &[u8], faces: usize) -> BufferHandle {
        let handle = loop {
            self.next_id = self.next_id.wrapping_add(1);
            if let Some(handle) = BufferHandle::new(self.next_id) {
                if !self.buffers.contains_key(&handle) {
                    break handle;
                }
            }
        };
        let size = data.len() as u64;
        self.buffers.insert(
            handle,
            HostBuffer {
                kind,
                faces,
                data: data.to_vec(),
                analytics: BufferAnalytics {
                    allocated_memory: size,
                    used_memory: size,
                    times_written: 1,
                },
            },
        );
        handle
    }

    fn write_buffer(&mut self, handle: BufferHandle, offset: u64, data: &[u8]) {
        let Some(buffer) = self.buffers.get_mut(&handle) else {
            warn!("Write to unknown buffer {}", handle.id());
            return;
        };
        let end = offset + data.len() as u64;
        if end > buffer.analytics.allocated_memory {
            error!(
                "Buffer write out of bounds for buffer {} ({}..{} of {})",
                handle.id(),
                offset,
                end,
                buffer.analytics.allocated_memory
            );
            return;
        }
        buffer.data[offset as usize..end as usize].copy_from_slice(data);
        buffer.analytics.used_memory = buffer.analytics.used_memory.max(end);
        buffer.analytics.times_written += 1;
    }

    fn destroy(&mut self, handle: BufferHandle) {
        if self.buffers.remove(&handle).is_some() {
            self.destroyed += 1;
        } else {
            warn!("Destroy of unknown buffer {}", handle.id());
        }
    }
}
