//! Errors surfaced by engine construction.
//!
//! The frame loop itself never fails: capacity limits, queue overflow and
//! unknown ids all degrade quietly. Only building an engine can go wrong.

use thiserror::Error;

/// Everything that can fail while setting up an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration file is not valid JSON for [`crate::config::EngineConfig`].
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// The configuration file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
