//! Checkpoint sinks for timesliced correlator output.
//!
//! A measurement writes per-timeslice arrays under hierarchical string paths
//! through the [`CheckpointSink`] trait. Three sinks are provided:
//!
//! - [`MemoryCheckpoint`]: in-memory, for tests and dry runs
//! - [`JsonCheckpoint`]: JSON staging file renamed on finalize
//! - `Hdf5Checkpoint`: HDF5 staging file (cargo feature `hdf5`)
//!
//! File sinks stage their data in `<output>.NN_w.chk` and only rename it to
//! `<output>` once the run has marked the checkpoint consistent.

mod error;
#[cfg(feature = "hdf5")]
mod h5;
mod json;
mod sink;

pub use error::{CheckpointError, Result};
#[cfg(feature = "hdf5")]
pub use h5::Hdf5Checkpoint;
pub use json::{staging_path, JsonCheckpoint, STAGING_SUFFIX};
pub use sink::{CheckpointSink, CheckpointStore, MemoryCheckpoint};
