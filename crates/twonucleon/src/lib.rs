//! Two-nucleon lattice correlators.
//!
//! Umbrella crate re-exporting the workspace:
//!
//! - [`lattice`]: geometry, fields, spatial Fourier transforms, timeslices
//! - [`checkpoint`]: checkpoint sinks for correlator output
//! - the contraction engine and the `TWO_NUCLEONS` measurement at the root

pub use twonucleon_checkpoint as checkpoint;
pub use twonucleon_lattice as lattice;

// Re-export everything from the contraction engine
pub use twonucleon_core::*;
