//! Integer lattice momenta and their phase fields.

use std::f64::consts::TAU;
use std::fmt;

use num_complex::Complex64;

use crate::field::LatticeField;
use crate::geometry::{direction_label, Geometry, T_DIR};

/// Total spatial momentum in lattice units (`p_d · 2π / L_d`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Momentum([i64; T_DIR]);

impl Momentum {
    pub fn new(components: [i64; T_DIR]) -> Self {
        Self(components)
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn components(&self) -> [i64; T_DIR] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&p| p == 0)
    }

    /// Checkpoint directory label, e.g. `boost_px0py0pz0`.
    pub fn label(&self) -> String {
        format!("boost_{}", direction_label(&self.0))
    }

    /// Phase field `exp(i · sign · 2π Σ_d p_d x_d / L_d)`.
    pub fn phases(&self, geometry: &Geometry, sign: i32) -> LatticeField<Complex64> {
        let s = f64::from(sign.signum());
        LatticeField::from_fn(*geometry, |site| {
            let x = geometry.coords(site);
            let arg: f64 = (0..T_DIR)
                .map(|d| self.0[d] as f64 * x[d] as f64 / geometry.extent(d) as f64)
                .sum();
            Complex64::from_polar(1.0, s * TAU * arg)
        })
    }
}

impl From<[i64; T_DIR]> for Momentum {
    fn from(components: [i64; T_DIR]) -> Self {
        Self(components)
    }
}

impl fmt::Display for Momentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}
