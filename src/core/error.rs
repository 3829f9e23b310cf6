//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Queue has no free slot and the caller asked not to wait.
    #[error("queue full: capacity {capacity}")]
    QueueFull {
        /// Configured queue capacity.
        capacity: usize,
    },
    /// Flight request rejected before it reached the queue.
    #[error("invalid flight: {0}")]
    InvalidFlight(String),
    /// The airfield was closed and accepts no more work.
    #[error("airfield closed")]
    Closed,
    /// Configuration could not be used to build the airfield.
    #[error("config invalid: {0}")]
    Config(String),
    /// Runtime facilities needed to start the engines are missing.
    #[error("setup failed: {0}")]
    Setup(String),
    /// Malformed line in a schedule file.
    #[error("schedule line {line}: {reason}")]
    Schedule {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },
    /// I/O failure while reading external input.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
