//! (Anti)symmetrization of displaced correlators under baryon exchange.
//!
//! Exchanging the two baryons maps relative momentum `k` to `-k`, transposes
//! the half-spin indices, and picks up the total-momentum phase. The exchange
//! partner of a momentum-space correlator `C` is therefore
//! `phases(k) · C(-k)ᵀ`.

use num_complex::Complex64;
use rayon::prelude::*;
use twonucleon_lattice::{LatticeField, SpatialFourier};

use crate::error::Result;
use crate::spin::HalfSpinMatrix;
use crate::topology::Symmetry;

/// Exchange partner `phases(k) · C(-k)ᵀ` of a correlator.
pub fn exchange_partner(
    correlator: &LatticeField<HalfSpinMatrix>,
    phases: &LatticeField<Complex64>,
    fft: &SpatialFourier,
) -> Result<LatticeField<HalfSpinMatrix>> {
    let mut partner = fft.reflect(correlator)?;
    partner
        .as_mut_slice()
        .par_iter_mut()
        .for_each(|m| *m = m.transpose());
    partner.mul_sitewise(phases)?;
    Ok(partner)
}

/// `C + partner` for symmetric channels, `C - partner` for antisymmetric.
pub fn combine(
    correlator: &LatticeField<HalfSpinMatrix>,
    partner: &LatticeField<HalfSpinMatrix>,
    symmetry: Symmetry,
) -> Result<LatticeField<HalfSpinMatrix>> {
    let mut out = correlator.clone();
    out.add_scaled(Complex64::new(symmetry.factor(), 0.0), partner)?;
    Ok(out)
}

/// Replace `correlator` by its (anti)symmetrized version.
pub fn symmetrize(
    correlator: &mut LatticeField<HalfSpinMatrix>,
    phases: &LatticeField<Complex64>,
    fft: &SpatialFourier,
    symmetry: Symmetry,
) -> Result<()> {
    let partner = exchange_partner(correlator, phases, fft)?;
    correlator.add_scaled(Complex64::new(symmetry.factor(), 0.0), &partner)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use twonucleon_lattice::{Geometry, Momentum};

    fn geometry() -> Geometry {
        Geometry::new([4, 3, 2, 2]).unwrap()
    }

    fn random_field(seed: u64) -> LatticeField<HalfSpinMatrix> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        LatticeField::from_fn(geometry(), |_| {
            let mut m = HalfSpinMatrix::zero();
            for row in m.0.iter_mut() {
                for v in row.iter_mut() {
                    *v = Complex64::new(rng.random(), rng.random());
                }
            }
            m
        })
    }

    #[test]
    fn test_fixed_points() {
        let c = random_field(1);
        for symmetry in [Symmetry::Symmetric, Symmetry::Antisymmetric] {
            let out = combine(&c, &c, symmetry).unwrap();
            for site in 0..c.len() {
                let expected = match symmetry {
                    Symmetry::Symmetric => c[site] * Complex64::new(2.0, 0.0),
                    Symmetry::Antisymmetric => HalfSpinMatrix::zero(),
                };
                assert_eq!(out[site], expected);
            }
        }
    }

    #[test]
    fn test_exchange_is_involution_at_zero_momentum() {
        let g = geometry();
        let c = random_field(2);
        let phases = Momentum::zero().phases(&g, 1);
        let fft = SpatialFourier::new(g);
        let partner = exchange_partner(&c, &phases, &fft).unwrap();
        let back = exchange_partner(&partner, &phases, &fft).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_exchange_even_field_is_projected_out() {
        // reflection- and transpose-invariant input
        let g = geometry();
        let fft = SpatialFourier::new(g);
        let phases = Momentum::zero().phases(&g, 1);
        let mut c = LatticeField::from_fn(g, |site| {
            let [x, y, z, t] = g.coords(site);
            let xr = (g.extent(0) - x) % g.extent(0);
            let yr = (g.extent(1) - y) % g.extent(1);
            let even = (x * xr + y * yr + z + t) as f64;
            HalfSpinMatrix([
                [Complex64::new(even, 0.0), Complex64::new(1.0, even)],
                [Complex64::new(1.0, even), Complex64::new(-even, 2.0)],
            ])
        });
        // z only takes values 0 and 1 on an extent-2 axis, which are their
        // own reflections
        let original = c.clone();
        symmetrize(&mut c, &phases, &fft, Symmetry::Antisymmetric).unwrap();
        assert!(c.max_abs() < 1e-12);

        let mut s = original.clone();
        symmetrize(&mut s, &phases, &fft, Symmetry::Symmetric).unwrap();
        assert_eq!(s, combine(&original, &original, Symmetry::Symmetric).unwrap());
    }
}
