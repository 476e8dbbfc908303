//! Error types for two-nucleon contractions.
//!
//! Every error is fatal for the measurement: the driver reports it and the
//! run produces no finalized output.

use thiserror::Error;
use twonucleon_checkpoint::CheckpointError;
use twonucleon_lattice::LatticeError;

use crate::availability::MissingBlock;
use crate::block::BlockSign;
use crate::topology::{Channel, Mode};

/// Result type for contraction operations.
pub type Result<T> = std::result::Result<T, ContractError>;

/// Errors raised by the contraction engine and its orchestration.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Parallel input lists have different lengths.
    #[error("{what}: expected {expected} entries, got {actual}")]
    ListLengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Only a single zero boost is supported.
    #[error("Only a single boost of (0,0,0) is allowed, got {0:?}")]
    UnsupportedBoost(Vec<[i64; 3]>),

    /// A required parameter was not supplied.
    #[error("Missing required parameter '{0}'")]
    MissingParameter(&'static str),

    /// A propagator id has no recorded source position.
    #[error("Propagator '{0}' has no recorded position")]
    UnknownPropagator(String),

    /// A source-slot propagator does not sit at the configured origin.
    #[error("Propagator '{id}' at {position:?} is not located at the origin {origin:?}")]
    PropagatorNotAtOrigin {
        id: String,
        position: [i64; 4],
        origin: [i64; 4],
    },

    /// A named block source is not available.
    #[error("Block source '{0}' is not available")]
    UnknownBlockSource(String),

    /// Required blocks are absent; lists every missing key.
    #[error("{} required block(s) missing:\n{}", .0.len(), MissingBlock::listing(.0))]
    MissingBlocks(Vec<MissingBlock>),

    /// No topology loaded for a channel.
    #[error("No topology loaded for channel {0}")]
    MissingTopology(Channel),

    /// A topology lacks a displacement mode.
    #[error("Topology {channel} has no mode {mode}")]
    MissingMode { channel: Channel, mode: Mode },

    /// Blocks with different block signs were combined.
    #[error("Block sign mismatch: accumulator holds {expected} blocks, got {actual}")]
    BlockSignMismatch {
        expected: BlockSign,
        actual: BlockSign,
    },

    /// Malformed contraction-definition data.
    #[error("Invalid contraction definition: {0}")]
    InvalidDefinition(String),

    /// Malformed name (channel, mode, pattern, parity, ...).
    #[error("Cannot parse {what} from '{input}'")]
    Parse { what: &'static str, input: String },

    /// No factory registered under this name.
    #[error("Unknown measurement '{0}'")]
    UnknownMeasurement(String),

    /// A factory name was registered twice.
    #[error("Measurement '{0}' is already registered")]
    DuplicateMeasurement(String),

    #[error(transparent)]
    Lattice(#[from] LatticeError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ContractError {
    pub(crate) fn parse(what: &'static str, input: &str) -> Self {
        Self::Parse {
            what,
            input: input.to_string(),
        }
    }
}
