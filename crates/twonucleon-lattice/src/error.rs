//! Error types for lattice field operations.

use thiserror::Error;

/// Result type for lattice operations.
pub type Result<T> = std::result::Result<T, LatticeError>;

/// Errors that can occur in lattice geometry and field operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LatticeError {
    /// Every lattice extent must be at least 1.
    #[error("Lattice extent along axis {axis} must be at least 1")]
    ZeroExtent { axis: usize },

    /// Field data does not cover the lattice volume.
    #[error("Field data has {actual} sites, lattice volume is {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Two fields (or a field and an operator) live on different lattices.
    #[error("Geometry mismatch: expected {expected:?}, got {actual:?}")]
    GeometryMismatch {
        expected: [usize; 4],
        actual: [usize; 4],
    },

    /// Time shift built for a different temporal extent.
    #[error("Time extent mismatch: time shift built for {expected}, field has {actual}")]
    TimeExtentMismatch { expected: usize, actual: usize },

    /// A Fourier transform needs a direction.
    #[error("Fourier transform sign must be non-zero, got {0}")]
    InvalidFourierSign(i32),
}
