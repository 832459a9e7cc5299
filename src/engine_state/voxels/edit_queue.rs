//! # Edit Queue
//!
//! Threads that do not own the [`World`] (network, scripting, tooling) submit
//! mutations here. The main thread applies them once per frame, in order.
//!
//! Pushing onto a full queue drops the edit. Producers are expected to
//! resubmit world state they still care about, so nothing is retried.
//!
//! Draining never blocks: when a producer holds the lock, the drain is
//! skipped for this frame.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, TryLockError};
use std::time::Duration;

use log::{debug, trace};
use web_time::Instant;

use super::chunk::Layer;
use super::world::World;

/// One deferred world mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    /// Sets one attribute of a voxel.
    Layer {
        /// Which attribute.
        layer: Layer,
        /// Voxel x.
        x: i32,
        /// Voxel y.
        y: i32,
        /// Voxel z.
        z: i32,
        /// New value.
        value: i32,
    },
    /// Puts text on a voxel face; empty text removes the sign.
    Sign {
        /// Voxel x.
        x: i32,
        /// Voxel y.
        y: i32,
        /// Voxel z.
        z: i32,
        /// Face index.
        face: i32,
        /// Sign text.
        text: String,
    },
}

impl Edit {
    /// A block edit.
    pub fn block(x: i32, y: i32, z: i32, value: i32) -> Self {
        Edit::Layer {
            layer: Layer::Block,
            x,
            y,
            z,
            value,
        }
    }

    fn apply(self, world: &mut World) {
        match self {
            Edit::Layer {
                layer,
                x,
                y,
                z,
                value,
            } => world.set_layer(layer, x, y, z, value),
            Edit::Sign {
                x,
                y,
                z,
                face,
                text,
            } => world.set_sign(x, y, z, face, &text),
        }
    }
}

/// A bounded FIFO of [`Edit`]s shared between producers and the main thread.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Debug)]
pub struct EditQueue {
    items: Arc<Mutex<VecDeque<Edit>>>,
    capacity: usize,
}

impl EditQueue {
    /// An empty queue holding at most `capacity` edits.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Most edits held at once.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of edits waiting.
    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no edits are waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends an edit.
    ///
    /// # Returns
    /// `false` when the queue was full and the edit was dropped.
    pub fn push(&self, edit: Edit) -> bool {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        if items.len() >= self.capacity {
            debug!("Edit queue full ({} items), dropping {:?}", self.capacity, edit);
            return false;
        }
        items.push_back(edit);
        true
    }

    /// Applies waiting edits to `world` in FIFO order.
    ///
    /// Stops after `max_items` edits or once `budget` has elapsed, whichever
    /// comes first. The rest stay queued for the next frame.
    ///
    /// # Returns
    /// Number of edits applied; 0 when the lock was busy.
    pub fn drain(&self, world: &mut World, max_items: usize, budget: Duration) -> usize {
        let mut items = match self.items.try_lock() {
            Ok(items) => items,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                trace!("Edit queue busy, skipping drain");
                return 0;
            }
        };
        let start = Instant::now();
        let mut applied = 0;
        while applied < max_items && start.elapsed() < budget {
            let Some(edit) = items.pop_front() else {
                break;
            };
            edit.apply(world);
            applied += 1;
        }
        if applied > 0 {
            trace!("Applied {} edits, {} left", applied, items.len());
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::ChunkCoord;
    use crate::engine_state::voxels::storage::MemoryStore;

    const BUDGET: Duration = Duration::from_secs(5);

    fn world() -> World {
        let mut world = World::new(16, true, Arc::new(MemoryStore::new()));
        world.create_chunk(ChunkCoord::new(0, 0));
        world
    }

    #[test]
    fn edits_apply_in_order() {
        let queue = EditQueue::new(8);
        for value in 1..=3 {
            assert!(queue.push(Edit::block(2, 3, 4, value)));
        }
        let mut world = world();
        assert_eq!(queue.drain(&mut world, 100, BUDGET), 3);
        assert_eq!(world.get_block(2, 3, 4), 3);
        assert!(queue.is_empty());
    }

    #[test]
    fn full_queue_drops_new_edits() {
        let queue = EditQueue::new(2);
        assert!(queue.push(Edit::block(0, 0, 0, 1)));
        assert!(queue.push(Edit::block(0, 0, 0, 2)));
        assert!(!queue.push(Edit::block(0, 0, 0, 3)));
        let mut world = world();
        queue.drain(&mut world, 100, BUDGET);
        assert_eq!(world.get_block(0, 0, 0), 2);
    }

    #[test]
    fn drain_respects_item_cap() {
        let queue = EditQueue::new(8);
        for value in 1..=5 {
            queue.push(Edit::block(1, 1, 1, value));
        }
        let mut world = world();
        assert_eq!(queue.drain(&mut world, 2, BUDGET), 2);
        assert_eq!(world.get_block(1, 1, 1), 2);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn zero_budget_applies_nothing() {
        let queue = EditQueue::new(8);
        queue.push(Edit::block(1, 1, 1, 1));
        let mut world = world();
        assert_eq!(queue.drain(&mut world, 8, Duration::ZERO), 0);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn busy_lock_skips_the_drain() {
        let queue = EditQueue::new(8);
        queue.push(Edit::block(1, 1, 1, 1));
        let mut world = world();
        let guard = queue.items.lock();
        assert_eq!(queue.drain(&mut world, 8, BUDGET), 0);
        drop(guard);
        assert_eq!(queue.drain(&mut world, 8, BUDGET), 1);
    }

    #[test]
    fn sign_and_light_edits_use_their_setters() {
        let queue = EditQueue::new(8);
        queue.push(Edit::Layer {
            layer: Layer::Light,
            x: 5,
            y: 5,
            z: 5,
            value: 99,
        });
        queue.push(Edit::Sign {
            x: 5,
            y: 5,
            z: 5,
            face: 2,
            text: "hi".to_string(),
        });
        let mut world = world();
        queue.drain(&mut world, 8, BUDGET);
        assert_eq!(world.get_light(5, 5, 5), 15);
        assert_eq!(world.get_sign(5, 5, 5, 2), Some("hi"));
    }
}
