//! Lattice geometry and lattice-valued fields for two-nucleon contractions.
//!
//! This crate is the field-arithmetic layer underneath the contraction engine.
//! It knows nothing about baryons; it provides:
//!
//! - [`Geometry`]: the 4D lattice extents with time as the last axis
//! - [`LatticeField`]: one value per site, generic over the per-site value
//! - [`SiteValue`]: per-site values made of complex components
//! - [`Momentum`]: integer lattice momenta and their phase fields
//! - [`SpatialFourier`]: per-timeslice 3D FFT and momentum reflection
//! - [`TimeShift`]: circular time shift and time-slice reduction
//!
//! # Example
//!
//! ```
//! use num_complex::Complex64;
//! use twonucleon_lattice::{Geometry, LatticeField, TimeShift};
//!
//! let geometry = Geometry::new([2, 2, 2, 4]).unwrap();
//! let field = LatticeField::from_fn(geometry, |site| {
//!     Complex64::new(geometry.timeslice(site) as f64, 0.0)
//! });
//!
//! // Source at t = 1: the reduced correlator starts at that timeslice.
//! let shift = TimeShift::new(1, geometry.time_extent()).unwrap();
//! let values = shift.reduce(&field).unwrap();
//! assert_eq!(values[0], Complex64::new(1.0, 0.0));
//! assert_eq!(values[3], Complex64::new(0.0, 0.0));
//! ```

mod error;
mod field;
mod fourier;
mod geometry;
mod momentum;
mod timeslice;

pub use error::{LatticeError, Result};
pub use field::{LatticeField, SiteValue};
pub use fourier::SpatialFourier;
pub use geometry::{direction_label, Geometry, AXIS_LABELS, ND, NO_DISPLACEMENT, T_DIR};
pub use momentum::Momentum;
pub use timeslice::TimeShift;
