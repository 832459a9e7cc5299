//! # Engine Configuration
//!
//! [`EngineConfig`] is read from a JSON file or taken from `Default`. Missing
//! fields fall back to their defaults; out-of-range values are clamped with a
//! warning rather than rejected.
//!
//! [`ViewRadii`] turns the configured radii, the available GPU memory and the
//! number of viewpoints into the create and delete distances the scheduler
//! works with.

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Tunables of an engine.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Most chunks resident at once.
    pub max_chunks: usize,
    /// Number of worker threads.
    pub worker_count: usize,
    /// Chunks within this distance are created; 0 derives it.
    pub create_radius: i32,
    /// Chunks beyond this distance are deleted; 0 derives it.
    pub delete_radius: i32,
    /// GPU memory available for chunk geometry, in megabytes.
    pub gpu_memory_mb: u32,
    /// Use the requested radii regardless of memory.
    pub no_limiters: bool,
    /// Flood light from emitters.
    pub show_lights: bool,
    /// Generate plants on grass.
    pub show_plants: bool,
    /// Terrain seed.
    pub seed: u32,
    /// Most edits waiting at once.
    pub edit_queue_capacity: usize,
    /// Most edits applied per frame.
    pub edit_drain_max_items: usize,
    /// Time spent applying edits per frame, in milliseconds.
    pub edit_drain_budget_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chunks: 8192,
            worker_count: 4,
            create_radius: 0,
            delete_radius: 0,
            gpu_memory_mb: 256,
            no_limiters: false,
            show_lights: true,
            show_plants: true,
            seed: 0,
            edit_queue_capacity: 8192,
            edit_drain_max_items: 4096,
            edit_drain_budget_ms: 8,
        }
    }
}

impl EngineConfig {
    /// Reads a configuration file.
    ///
    /// # Arguments
    /// * `path` - A JSON file; unknown fields are ignored
    ///
    /// # Returns
    /// The sanitized configuration, or an error when the file cannot be read
    /// or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Clamps every field to a usable value.
    pub fn sanitized(mut self) -> Self {
        fn at_least(name: &str, value: &mut usize, min: usize) {
            if *value < min {
                warn!("{} of {} is too small, using {}", name, value, min);
                *value = min;
            }
        }

        at_least("max_chunks", &mut self.max_chunks, 9);
        at_least("worker_count", &mut self.worker_count, 1);
        at_least("edit_queue_capacity", &mut self.edit_queue_capacity, 1);
        at_least("edit_drain_max_items", &mut self.edit_drain_max_items, 1);
        if self.create_radius < 0 {
            warn!("Negative create_radius {}, deriving it", self.create_radius);
            self.create_radius = 0;
        }
        if self.delete_radius < 0 {
            warn!("Negative delete_radius {}, deriving it", self.delete_radius);
            self.delete_radius = 0;
        }
        self
    }

    /// Time spent applying edits per frame.
    pub fn edit_drain_budget(&self) -> Duration {
        Duration::from_millis(self.edit_drain_budget_ms)
    }
}

/// Create and delete distances, in chunks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ViewRadii {
    /// Chunks within this Chebyshev distance are created and meshed.
    pub create: i32,
    /// Chunks at or beyond this distance from every viewpoint are deleted.
    pub delete: i32,
}

impl ViewRadii {
    /// Derives radii for `viewpoints` simultaneous viewpoints.
    ///
    /// Less GPU memory or more viewpoints means shorter draw distance. Unless
    /// `no_limiters` is set, the configured radii only apply with plenty of
    /// memory.
    pub fn derive(config: &EngineConfig, viewpoints: usize) -> Self {
        let mut create = config.create_radius;
        let mut delete = config.delete_radius;
        if !config.no_limiters {
            let gpu = config.gpu_memory_mb;
            let n = viewpoints;
            if gpu < 48 || (gpu < 64 && n >= 2) || (gpu < 128 && n >= 4) {
                create = 1;
                delete = create + 1;
            } else if gpu < 64 || (gpu < 128 && n >= 3) {
                create = 2;
                delete = create + 1;
            } else if gpu < 128 && n >= 2 {
                create = 2;
                delete = create + 2;
            } else if gpu < 128 || (gpu < 256 && n >= 3) {
                create = 3;
                delete = create + 2;
            } else if gpu < 256 || create == 0 {
                create = 5;
                delete = create + 3;
            }
        }
        if create <= 0 {
            create = 5;
        }
        if delete < create {
            delete = create + 3;
        }
        Self { create, delete }
    }
}
