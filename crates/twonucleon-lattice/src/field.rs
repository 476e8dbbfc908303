//! Lattice-valued fields.

use std::ops::{Index, IndexMut};

use num_complex::Complex64;
use num_traits::Zero;
use rayon::prelude::*;

use crate::error::{LatticeError, Result};
use crate::geometry::Geometry;

/// A per-site value made of a fixed number of complex components.
///
/// Fourier transforms, reflections and phase multiplications act on each
/// component independently.
pub trait SiteValue: Clone + Default + Send + Sync {
    /// Number of complex components.
    const COMPONENTS: usize;

    /// Read component `c`.
    fn component(&self, c: usize) -> Complex64;

    /// Mutable access to component `c`.
    fn component_mut(&mut self, c: usize) -> &mut Complex64;

    /// Multiply every component by `factor`.
    fn scale(&mut self, factor: Complex64) {
        for c in 0..Self::COMPONENTS {
            *self.component_mut(c) *= factor;
        }
    }

    /// Add `factor * other` component-wise.
    fn add_scaled(&mut self, factor: Complex64, other: &Self) {
        for c in 0..Self::COMPONENTS {
            *self.component_mut(c) += factor * other.component(c);
        }
    }
}

impl SiteValue for Complex64 {
    const COMPONENTS: usize = 1;

    fn component(&self, _c: usize) -> Complex64 {
        *self
    }

    fn component_mut(&mut self, _c: usize) -> &mut Complex64 {
        self
    }
}

/// One value of type `T` per lattice site.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeField<T> {
    geometry: Geometry,
    data: Vec<T>,
}

impl<T: Clone + Default> LatticeField<T> {
    /// Field with the default value (zero) on every site.
    pub fn zeros(geometry: Geometry) -> Self {
        Self {
            geometry,
            data: vec![T::default(); geometry.volume()],
        }
    }

    /// Reset every site to the default value.
    pub fn set_zero(&mut self) {
        self.data.iter_mut().for_each(|v| *v = T::default());
    }
}

impl<T> LatticeField<T> {
    /// Build a field from a function of the site index.
    pub fn from_fn(geometry: Geometry, f: impl FnMut(usize) -> T) -> Self {
        Self {
            geometry,
            data: (0..geometry.volume()).map(f).collect(),
        }
    }

    /// Wrap existing per-site data.
    pub fn from_vec(geometry: Geometry, data: Vec<T>) -> Result<Self> {
        if data.len() != geometry.volume() {
            return Err(LatticeError::LengthMismatch {
                expected: geometry.volume(),
                actual: data.len(),
            });
        }
        Ok(Self { geometry, data })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Fail unless `other` lives on the same lattice.
    pub fn ensure_geometry(&self, other: &Geometry) -> Result<()> {
        if self.geometry != *other {
            return Err(LatticeError::GeometryMismatch {
                expected: self.geometry.extents(),
                actual: other.extents(),
            });
        }
        Ok(())
    }
}

impl<T: SiteValue> LatticeField<T> {
    /// `self += factor * other`, site by site.
    pub fn add_scaled(&mut self, factor: Complex64, other: &Self) -> Result<()> {
        self.ensure_geometry(other.geometry())?;
        self.data
            .par_iter_mut()
            .zip(other.data.par_iter())
            .for_each(|(a, b)| a.add_scaled(factor, b));
        Ok(())
    }

    /// Multiply each site by the corresponding value of a scalar field.
    pub fn mul_sitewise(&mut self, phases: &LatticeField<Complex64>) -> Result<()> {
        self.ensure_geometry(phases.geometry())?;
        self.data
            .par_iter_mut()
            .zip(phases.data.par_iter())
            .for_each(|(v, &p)| v.scale(p));
        Ok(())
    }

    /// Largest component modulus over the whole field.
    pub fn max_abs(&self) -> f64 {
        self.data
            .iter()
            .flat_map(|v| (0..T::COMPONENTS).map(move |c| v.component(c).norm()))
            .fold(0.0, f64::max)
    }
}

impl LatticeField<Complex64> {
    /// Sum over all sites.
    pub fn sum(&self) -> Complex64 {
        self.data.iter().fold(Complex64::zero(), |acc, &v| acc + v)
    }
}

impl<T> Index<usize> for LatticeField<T> {
    type Output = T;

    fn index(&self, site: usize) -> &T {
        &self.data[site]
    }
}

impl<T> IndexMut<usize> for LatticeField<T> {
    fn index_mut(&mut self, site: usize) -> &mut T {
        &mut self.data[site]
    }
}
