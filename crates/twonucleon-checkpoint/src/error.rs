//! Error types for checkpoint sinks.

use thiserror::Error;

/// Result type for checkpoint operations.
pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Errors that can occur while writing or finalizing a checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Write attempted while the checkpoint is closed.
    #[error("Checkpoint is closed")]
    Closed,

    /// Entry written below a directory that was never created.
    #[error("Checkpoint directory '{0}' does not exist")]
    MissingDirectory(String),

    /// Finalize requested before the run marked the checkpoint consistent.
    #[error("Checkpoint is not marked consistent; refusing to finalize")]
    Inconsistent,

    /// Any operation after finalize.
    #[error("Checkpoint has already been finalized")]
    Finalized,

    /// Filesystem error.
    #[error("Checkpoint I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON checkpoint.
    #[error("Checkpoint JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HDF5 library error.
    #[cfg(feature = "hdf5")]
    #[error("Checkpoint HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}
