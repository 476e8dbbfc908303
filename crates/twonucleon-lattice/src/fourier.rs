//! Spatial Fourier transform at fixed time.
//!
//! The transform is applied separately on every timeslice over the three
//! spatial axes, component by component:
//!
//! ```text
//! F(k, t) = Σ_x exp(i · sign · 2π k·x / L) f(x, t)
//! ```
//!
//! No normalization is applied in either direction, so a forward transform
//! followed by a backward one multiplies by the spatial volume.

use std::sync::Arc;

use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};

use crate::error::{LatticeError, Result};
use crate::field::{LatticeField, SiteValue};
use crate::geometry::{Geometry, T_DIR};

/// Planned per-timeslice 3D FFT for one lattice geometry.
pub struct SpatialFourier {
    geometry: Geometry,
    forward: Vec<Arc<dyn Fft<f64>>>,
    backward: Vec<Arc<dyn Fft<f64>>>,
}

impl SpatialFourier {
    pub fn new(geometry: Geometry) -> Self {
        let mut planner = FftPlanner::new();
        let forward = (0..T_DIR)
            .map(|axis| planner.plan_fft_forward(geometry.extent(axis)))
            .collect();
        let backward = (0..T_DIR)
            .map(|axis| planner.plan_fft_inverse(geometry.extent(axis)))
            .collect();
        Self {
            geometry,
            forward,
            backward,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Transform `field` in place. Negative `sign` is `exp(-i k·x)`, positive
    /// is `exp(+i k·x)`; zero is rejected.
    pub fn transform<T: SiteValue>(&self, field: &mut LatticeField<T>, sign: i32) -> Result<()> {
        field.ensure_geometry(&self.geometry)?;
        let plans = match sign {
            s if s < 0 => &self.forward,
            s if s > 0 => &self.backward,
            _ => return Err(LatticeError::InvalidFourierSign(sign)),
        };

        let vs = self.geometry.spatial_volume();
        let geometry = self.geometry;
        field.as_mut_slice().par_chunks_mut(vs).for_each(|slice| {
            let mut buffer = vec![Complex64::new(0.0, 0.0); vs];
            for c in 0..T::COMPONENTS {
                for (b, v) in buffer.iter_mut().zip(slice.iter()) {
                    *b = v.component(c);
                }
                for (axis, plan) in plans.iter().enumerate() {
                    transform_axis(&geometry, axis, plan.as_ref(), &mut buffer);
                }
                for (v, b) in slice.iter_mut().zip(buffer.iter()) {
                    *v.component_mut(c) = *b;
                }
            }
        });
        Ok(())
    }

    /// Spatial reflection `x -> -x (mod L)` on every timeslice.
    ///
    /// In momentum space this maps `k` to `-k`, which is how the exchange
    /// partner of a two-baryon correlator is obtained.
    pub fn reflect<T: Clone>(&self, field: &LatticeField<T>) -> Result<LatticeField<T>> {
        field.ensure_geometry(&self.geometry)?;
        let g = self.geometry;
        Ok(LatticeField::from_fn(g, |site| {
            let mut x = g.coords(site);
            for (axis, xd) in x.iter_mut().enumerate().take(T_DIR) {
                let l = g.extent(axis);
                *xd = (l - *xd) % l;
            }
            field[g.site_index(x)].clone()
        }))
    }
}

/// 1D FFT along every line of one spatial axis of a timeslice buffer.
fn transform_axis(geometry: &Geometry, axis: usize, plan: &dyn Fft<f64>, buffer: &mut [Complex64]) {
    let n = geometry.extent(axis);
    if n == 1 {
        return;
    }
    let stride = geometry.stride(axis);
    let mut line = vec![Complex64::new(0.0, 0.0); n];
    for start in 0..buffer.len() {
        if (start / stride) % n != 0 {
            continue;
        }
        for (i, l) in line.iter_mut().enumerate() {
            *l = buffer[start + i * stride];
        }
        plan.process(&mut line);
        for (i, l) in line.iter().enumerate() {
            buffer[start + i * stride] = *l;
        }
    }
}
