//! Half-spin matrices and two-baryon spin projectors.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

use num_complex::Complex64;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use twonucleon_lattice::SiteValue;

use crate::error::{ContractError, Result};

/// Number of half-spin components per baryon.
pub const NS_HALF: usize = 2;

/// A 2x2 complex matrix in the half-spin space of a two-baryon state.
///
/// Row index belongs to the first baryon, column index to the second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HalfSpinMatrix(pub [[Complex64; NS_HALF]; NS_HALF]);

impl HalfSpinMatrix {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Matrix from real entries.
    pub fn from_real(rows: [[f64; NS_HALF]; NS_HALF]) -> Self {
        let mut m = Self::zero();
        for (a, row) in rows.iter().enumerate() {
            for (b, &v) in row.iter().enumerate() {
                m.0[a][b] = Complex64::new(v, 0.0);
            }
        }
        m
    }

    pub fn get(&self, a: usize, b: usize) -> Complex64 {
        self.0[a][b]
    }

    pub fn trace(&self) -> Complex64 {
        self.0[0][0] + self.0[1][1]
    }

    /// Exchange the two baryons.
    pub fn transpose(&self) -> Self {
        let m = &self.0;
        Self([[m[0][0], m[1][0]], [m[0][1], m[1][1]]])
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> Self {
        let t = self.transpose();
        Self(t.0.map(|row| row.map(|v| v.conj())))
    }

    /// `trace(self * other)` without forming the product.
    pub fn trace_product(&self, other: &Self) -> Complex64 {
        let mut acc = Complex64::zero();
        for a in 0..NS_HALF {
            for b in 0..NS_HALF {
                acc += self.0[a][b] * other.0[b][a];
            }
        }
        acc
    }
}

impl Add for HalfSpinMatrix {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for HalfSpinMatrix {
    fn add_assign(&mut self, rhs: Self) {
        for a in 0..NS_HALF {
            for b in 0..NS_HALF {
                self.0[a][b] += rhs.0[a][b];
            }
        }
    }
}

impl Sub for HalfSpinMatrix {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        for a in 0..NS_HALF {
            for b in 0..NS_HALF {
                self.0[a][b] -= rhs.0[a][b];
            }
        }
        self
    }
}

impl Mul for HalfSpinMatrix {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = Self::zero();
        for a in 0..NS_HALF {
            for b in 0..NS_HALF {
                for k in 0..NS_HALF {
                    out.0[a][b] += self.0[a][k] * rhs.0[k][b];
                }
            }
        }
        out
    }
}

impl Mul<Complex64> for HalfSpinMatrix {
    type Output = Self;

    fn mul(mut self, rhs: Complex64) -> Self {
        self.scale(rhs);
        self
    }
}

impl SiteValue for HalfSpinMatrix {
    const COMPONENTS: usize = NS_HALF * NS_HALF;

    fn component(&self, c: usize) -> Complex64 {
        self.0[c / NS_HALF][c % NS_HALF]
    }

    fn component_mut(&mut self, c: usize) -> &mut Complex64 {
        &mut self.0[c / NS_HALF][c % NS_HALF]
    }
}

/// Spin multiplet of a two-nucleon state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Multiplet {
    Singlet,
    Triplet,
}

impl Multiplet {
    /// Label used in correlator names.
    pub fn label(self) -> &'static str {
        match self {
            Multiplet::Singlet => "SING",
            Multiplet::Triplet => "TRIP",
        }
    }
}

impl fmt::Display for Multiplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Two-nucleon spin state: multiplet plus spin projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpinState {
    #[serde(rename = "SING0")]
    Sing0,
    #[serde(rename = "TRIPP")]
    TripP,
    #[serde(rename = "TRIP0")]
    Trip0,
    #[serde(rename = "TRIPM")]
    TripM,
}

impl SpinState {
    pub const ALL: [SpinState; 4] = [
        SpinState::Sing0,
        SpinState::TripP,
        SpinState::Trip0,
        SpinState::TripM,
    ];

    pub fn multiplet(self) -> Multiplet {
        match self {
            SpinState::Sing0 => Multiplet::Singlet,
            _ => Multiplet::Triplet,
        }
    }

    /// Spin projection label: `0`, `P` or `M`.
    pub fn value_label(self) -> &'static str {
        match self {
            SpinState::Sing0 | SpinState::Trip0 => "0",
            SpinState::TripP => "P",
            SpinState::TripM => "M",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpinState::Sing0 => "SING0",
            SpinState::TripP => "TRIPP",
            SpinState::Trip0 => "TRIP0",
            SpinState::TripM => "TRIPM",
        }
    }

    /// Half-spin projector of this state.
    pub fn projector(self) -> HalfSpinMatrix {
        let r = std::f64::consts::FRAC_1_SQRT_2;
        match self {
            SpinState::Sing0 => HalfSpinMatrix::from_real([[0.0, r], [-r, 0.0]]),
            SpinState::TripP => HalfSpinMatrix::from_real([[1.0, 0.0], [0.0, 0.0]]),
            SpinState::Trip0 => HalfSpinMatrix::from_real([[0.0, r], [r, 0.0]]),
            SpinState::TripM => HalfSpinMatrix::from_real([[0.0, 0.0], [0.0, 1.0]]),
        }
    }
}

impl fmt::Display for SpinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SpinState {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        SpinState::ALL
            .into_iter()
            .find(|state| state.label() == s)
            .ok_or_else(|| ContractError::parse("spin state", s))
    }
}

/// Sink projectors keyed by spin state.
#[derive(Debug, Clone)]
pub struct ProjectorTable {
    projectors: BTreeMap<SpinState, HalfSpinMatrix>,
}

impl ProjectorTable {
    pub fn new() -> Self {
        Self {
            projectors: SpinState::ALL
                .into_iter()
                .map(|state| (state, state.projector()))
                .collect(),
        }
    }

    pub fn get(&self, state: SpinState) -> &HalfSpinMatrix {
        &self.projectors[&state]
    }

    /// Projectors of every state in `multiplet`, in table order.
    pub fn sink_projectors(
        &self,
        multiplet: Multiplet,
    ) -> impl Iterator<Item = (SpinState, &HalfSpinMatrix)> + '_ {
        self.projectors
            .iter()
            .filter(move |(state, _)| state.multiplet() == multiplet)
            .map(|(&state, p)| (state, p))
    }
}

impl Default for ProjectorTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projectors_orthonormal() {
        for a in SpinState::ALL {
            for b in SpinState::ALL {
                let overlap = a.projector().adjoint().trace_product(&b.projector());
                let expected = if a == b { 1.0 } else { 0.0 };
                assert_relative_eq!(overlap.re, expected, epsilon = 1e-14);
                assert_relative_eq!(overlap.im, 0.0, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_singlet_antisymmetric_triplets_symmetric() {
        for state in SpinState::ALL {
            let p = state.projector();
            let sign = match state.multiplet() {
                Multiplet::Singlet => -1.0,
                Multiplet::Triplet => 1.0,
            };
            assert_eq!(p.transpose(), p * Complex64::new(sign, 0.0));
        }
    }

    #[test]
    fn test_sink_projectors_by_multiplet() {
        let table = ProjectorTable::new();
        let sing: Vec<_> = table.sink_projectors(Multiplet::Singlet).map(|(s, _)| s).collect();
        assert_eq!(sing, vec![SpinState::Sing0]);
        let trip: Vec<_> = table.sink_projectors(Multiplet::Triplet).map(|(s, _)| s).collect();
        assert_eq!(trip, vec![SpinState::TripP, SpinState::Trip0, SpinState::TripM]);
    }

    #[test]
    fn test_trace_product_matches_mul() {
        let a = HalfSpinMatrix([
            [Complex64::new(1.0, 2.0), Complex64::new(0.5, 0.0)],
            [Complex64::new(-1.0, 1.0), Complex64::new(3.0, -1.0)],
        ]);
        let b = SpinState::Trip0.projector();
        assert_eq!(b.trace_product(&a), (b * a).trace());
    }

    #[test]
    fn test_parse_spin_state() {
        assert_eq!("TRIPM".parse::<SpinState>().unwrap(), SpinState::TripM);
        assert!("TRIPX".parse::<SpinState>().is_err());
        assert_eq!(SpinState::TripP.value_label(), "P");
        assert_eq!(SpinState::Sing0.multiplet().label(), "SING");
    }
}
