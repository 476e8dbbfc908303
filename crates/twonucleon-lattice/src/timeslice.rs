//! Time-slice shift and reduction relative to the source timeslice.

use num_complex::Complex64;
use num_traits::Zero;

use crate::error::{LatticeError, Result};
use crate::field::LatticeField;

/// Circular time shift that moves the source timeslice `t0` to index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeShift {
    origin: usize,
    extent: usize,
}

impl TimeShift {
    /// `origin` may be any integer; it is taken modulo `extent`.
    pub fn new(origin: i64, extent: usize) -> Result<Self> {
        if extent == 0 {
            return Err(LatticeError::ZeroExtent { axis: 3 });
        }
        Ok(Self {
            origin: origin.rem_euclid(extent as i64) as usize,
            extent,
        })
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn extent(&self) -> usize {
        self.extent
    }

    /// Absolute timeslice of source-relative time `tau`.
    pub fn absolute(&self, tau: usize) -> usize {
        (tau + self.origin) % self.extent
    }

    fn check(&self, time_extent: usize) -> Result<()> {
        if time_extent != self.extent {
            return Err(LatticeError::TimeExtentMismatch {
                expected: self.extent,
                actual: time_extent,
            });
        }
        Ok(())
    }

    /// Full-lattice circular shift: timeslice `t0` of the input becomes
    /// timeslice 0 of the output.
    pub fn shift_field<T: Clone>(&self, field: &LatticeField<T>) -> Result<LatticeField<T>> {
        let g = *field.geometry();
        self.check(g.time_extent())?;
        let vs = g.spatial_volume();
        Ok(LatticeField::from_fn(g, |site| {
            let tau = site / vs;
            field[self.absolute(tau) * vs + site % vs].clone()
        }))
    }

    /// One value per source-relative timeslice: the mean over the spatial
    /// sites of timeslice `(tau + t0) mod Lt`.
    pub fn reduce(&self, field: &LatticeField<Complex64>) -> Result<Vec<Complex64>> {
        let g = field.geometry();
        self.check(g.time_extent())?;
        let vs = g.spatial_volume();
        let norm = 1.0 / vs as f64;
        Ok((0..self.extent)
            .map(|tau| {
                let t = self.absolute(tau);
                let slice = &field.as_slice()[t * vs..(t + 1) * vs];
                slice.iter().fold(Complex64::zero(), |acc, &v| acc + v) * norm
            })
            .collect())
    }
}
