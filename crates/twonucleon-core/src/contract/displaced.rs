use std::collections::HashMap;

use num_complex::Complex64;
use tracing::debug;
use twonucleon_lattice::{LatticeField, SpatialFourier};

use super::contract_fields;
use crate::block::{BaryonBlock, SiteBlock};
use crate::error::Result;
use crate::spin::HalfSpinMatrix;
use crate::topology::{ContractionTensor, FourierSign, Mode, SwapPolicy, Topology};

/// Operand order actually used by [`contract_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeOutcome {
    /// `(B0, B1)` through the requested mode.
    Direct,
    /// `(B1, B0)` through the swapped mode.
    Swapped,
}

type TransformPair = (LatticeField<SiteBlock>, LatticeField<SiteBlock>);

/// Displaced contractions of one pair of accumulated blocks.
///
/// Momentum-space copies of the blocks are computed on first use and reused
/// by every channel contracted from the same pair.
pub struct DisplacedContraction<'a> {
    left: &'a BaryonBlock,
    right: &'a BaryonBlock,
    phases: &'a LatticeField<Complex64>,
    fft: &'a SpatialFourier,
    transformed: HashMap<(bool, FourierSign), TransformPair>,
}

impl<'a> DisplacedContraction<'a> {
    pub fn new(
        left: &'a BaryonBlock,
        right: &'a BaryonBlock,
        phases: &'a LatticeField<Complex64>,
        fft: &'a SpatialFourier,
    ) -> Self {
        Self {
            left,
            right,
            phases,
            fft,
            transformed: HashMap::new(),
        }
    }

    /// Add one contraction to `acc`.
    ///
    /// For a non-zero sign the source operand is multiplied by the phases and
    /// transformed with `sign`, the sink operand is transformed with `-sign`,
    /// and the two are contracted momentum by momentum. A zero sign
    /// contracts in position space. `swapped` exchanges the operands.
    pub fn contract(
        &mut self,
        acc: &mut LatticeField<HalfSpinMatrix>,
        tensor: &ContractionTensor,
        sign: FourierSign,
        swapped: bool,
    ) -> Result<()> {
        let (l, r) = if swapped {
            (self.right, self.left)
        } else {
            (self.left, self.right)
        };
        if sign.is_zero() {
            return contract_fields(acc, l.field(), r.field(), tensor);
        }

        let key = (swapped, sign);
        if !self.transformed.contains_key(&key) {
            let mut f0 = l.field().clone();
            f0.mul_sitewise(self.phases)?;
            self.fft.transform(&mut f0, sign.value())?;
            let mut f1 = r.field().clone();
            self.fft.transform(&mut f1, sign.flipped().value())?;
            debug!(sign = sign.value(), swapped, "transformed block pair");
            self.transformed.insert(key, (f0, f1));
        }
        let (f0, f1) = &self.transformed[&key];
        contract_fields(acc, f0, f1, tensor)
    }

    /// Contract through `mode` of `topology`, honouring the swap policy for
    /// degenerate modes.
    pub fn contract_mode(
        &mut self,
        acc: &mut LatticeField<HalfSpinMatrix>,
        topology: &Topology,
        mode: Mode,
        policy: SwapPolicy,
    ) -> Result<ModeOutcome> {
        let sign = topology.fourier_sign(mode)?;
        if policy == SwapPolicy::SwapOnZeroSign && sign.is_zero() {
            let swapped = mode.swapped();
            let entry = topology.mode(swapped)?;
            debug!(channel = %topology.channel(), %mode, %swapped, "degenerate mode, swapping operands");
            self.contract(acc, &entry.tensor, entry.sign, true)?;
            Ok(ModeOutcome::Swapped)
        } else {
            self.contract(acc, topology.tensor(mode)?, sign, false)?;
            Ok(ModeOutcome::Direct)
        }
    }
}

/// Add the displaced contraction of `left` and `right` to `acc`.
pub fn contract_displaced(
    acc: &mut LatticeField<HalfSpinMatrix>,
    left: &BaryonBlock,
    right: &BaryonBlock,
    tensor: &ContractionTensor,
    phases: &LatticeField<Complex64>,
    fft: &SpatialFourier,
    sign: FourierSign,
) -> Result<()> {
    DisplacedContraction::new(left, right, phases, fft).contract(acc, tensor, sign, false)
}

/// Contract one mode of a topology, see
/// [`DisplacedContraction::contract_mode`].
#[allow(clippy::too_many_arguments)]
pub fn contract_mode(
    acc: &mut LatticeField<HalfSpinMatrix>,
    left: &BaryonBlock,
    right: &BaryonBlock,
    topology: &Topology,
    mode: Mode,
    phases: &LatticeField<Complex64>,
    fft: &SpatialFourier,
    policy: SwapPolicy,
) -> Result<ModeOutcome> {
    DisplacedContraction::new(left, right, phases, fft).contract_mode(acc, topology, mode, policy)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use approx::assert_relative_eq;
    use num_traits::Zero;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use twonucleon_lattice::{Geometry, Momentum, T_DIR};

    use super::*;
    use crate::block::{BlockIndex, BlockSign};
    use crate::contract::contract_local;
    use crate::spin::SpinState;
    use crate::topology::{Channel, ContractionTerm, Family, Symmetry};

    fn geometry() -> Geometry {
        Geometry::new([3, 2, 2, 2]).unwrap()
    }

    fn random_block(rng: &mut ChaCha8Rng, sign: BlockSign) -> BaryonBlock {
        BaryonBlock::from_field(
            sign,
            LatticeField::from_fn(geometry(), |_| {
                SiteBlock::from_fn(|_| Complex64::new(rng.random::<f64>() - 0.5, rng.random::<f64>() - 0.5))
            }),
        )
    }

    fn term(out: (usize, usize), left: [usize; 7], right: [usize; 7], re: f64) -> ContractionTerm {
        ContractionTerm {
            out,
            left: BlockIndex::new(left).unwrap(),
            right: BlockIndex::new(right).unwrap(),
            coefficient: Complex64::new(re, 0.5),
        }
    }

    fn tensor() -> ContractionTensor {
        ContractionTensor::new(vec![
            term((0, 1), [0, 0, 0, 0, 0, 1, 2], [1, 1, 0, 0, 0, 2, 1], 1.0),
            term((1, 0), [1, 0, 2, 1, 0, 0, 1], [0, 1, 1, 1, 1, 2, 0], -2.0),
            term((1, 1), [1, 1, 1, 1, 1, 1, 1], [0, 0, 0, 0, 0, 0, 0], 0.25),
        ])
    }

    /// Direct DFT of one entry over a timeslice.
    fn dft(block: &LatticeField<SiteBlock>, idx: BlockIndex, phases: Option<&LatticeField<Complex64>>, sign: f64, site: usize) -> Complex64 {
        let g = *block.geometry();
        let k = g.coords(site);
        let t = k[T_DIR];
        let mut sum = Complex64::zero();
        for x in 0..g.volume() {
            let cx = g.coords(x);
            if cx[T_DIR] != t {
                continue;
            }
            let arg: f64 = (0..T_DIR)
                .map(|d| (k[d] * cx[d]) as f64 / g.extent(d) as f64)
                .sum();
            let mut v = block[x][idx];
            if let Some(p) = phases {
                v *= p[x];
            }
            sum += v * Complex64::from_polar(1.0, sign * TAU * arg);
        }
        sum
    }

    #[test]
    fn test_displaced_matches_direct_dft() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let b0 = random_block(&mut rng, BlockSign::Plus);
        let b1 = random_block(&mut rng, BlockSign::Minus);
        let g = geometry();
        let phases = Momentum::new([1, 0, 1]).phases(&g, 1);
        let fft = SpatialFourier::new(g);
        let tensor = tensor();

        for sign in [FourierSign::Positive, FourierSign::Negative] {
            let mut acc = LatticeField::zeros(g);
            contract_displaced(&mut acc, &b0, &b1, &tensor, &phases, &fft, sign).unwrap();
            let s = f64::from(sign.value());
            for site in 0..g.volume() {
                let mut expected = HalfSpinMatrix::zero();
                for t in tensor.terms() {
                    let f0 = dft(b0.field(), t.left, Some(&phases), s, site);
                    let f1 = dft(b1.field(), t.right, None, -s, site);
                    expected.0[t.out.0][t.out.1] += t.coefficient * f0 * f1;
                }
                for a in 0..2 {
                    for b in 0..2 {
                        assert_relative_eq!(acc[site].get(a, b).re, expected.get(a, b).re, epsilon = 1e-9);
                        assert_relative_eq!(acc[site].get(a, b).im, expected.get(a, b).im, epsilon = 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn test_zero_sign_is_local() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let b0 = random_block(&mut rng, BlockSign::Plus);
        let b1 = random_block(&mut rng, BlockSign::Minus);
        let g = geometry();
        let phases = Momentum::zero().phases(&g, 1);
        let fft = SpatialFourier::new(g);

        let mut displaced = LatticeField::zeros(g);
        contract_displaced(&mut displaced, &b0, &b1, &tensor(), &phases, &fft, FourierSign::Zero).unwrap();
        let mut local = LatticeField::zeros(g);
        contract_local(&mut local, &b0, &b1, &tensor()).unwrap();
        assert_eq!(displaced, local);
    }

    fn degenerate_topology(family: Family) -> (Topology, Mode) {
        let mode: Mode = "001|110".parse().unwrap();
        let topo = Topology::new(Channel::new(family, SpinState::Sing0), Symmetry::Antisymmetric)
            .with_mode(mode, tensor(), FourierSign::Zero)
            .with_mode(mode.swapped(), tensor(), FourierSign::Zero);
        (topo, mode)
    }

    #[test]
    fn test_contract_mode_swaps_degenerate_modes() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let b0 = random_block(&mut rng, BlockSign::Plus);
        let b1 = random_block(&mut rng, BlockSign::Minus);
        let g = geometry();
        let phases = Momentum::zero().phases(&g, 1);
        let fft = SpatialFourier::new(g);
        let (topo, mode) = degenerate_topology(Family::PN);

        let mut acc = LatticeField::zeros(g);
        let outcome =
            contract_mode(&mut acc, &b0, &b1, &topo, mode, &phases, &fft, SwapPolicy::SwapOnZeroSign).unwrap();
        assert_eq!(outcome, ModeOutcome::Swapped);

        let mut expected = LatticeField::zeros(g);
        contract_local(&mut expected, &b1, &b0, &tensor()).unwrap();
        assert_eq!(acc, expected);

        let mut direct = LatticeField::zeros(g);
        let outcome = contract_mode(&mut direct, &b0, &b1, &topo, mode, &phases, &fft, SwapPolicy::Never).unwrap();
        assert_eq!(outcome, ModeOutcome::Direct);
        assert_ne!(direct, acc);
    }

    #[test]
    fn test_transforms_reused_across_channels() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let b0 = random_block(&mut rng, BlockSign::Plus);
        let b1 = random_block(&mut rng, BlockSign::Minus);
        let g = geometry();
        let phases = Momentum::new([0, 1, 0]).phases(&g, 1);
        let fft = SpatialFourier::new(g);

        let mut pair = DisplacedContraction::new(&b0, &b1, &phases, &fft);
        let mut first = LatticeField::zeros(g);
        let mut second = LatticeField::zeros(g);
        pair.contract(&mut first, &tensor(), FourierSign::Positive, false).unwrap();
        pair.contract(&mut second, &tensor(), FourierSign::Positive, false).unwrap();
        assert_eq!(first, second);

        let mut fresh = LatticeField::zeros(g);
        contract_displaced(&mut fresh, &b0, &b1, &tensor(), &phases, &fft, FourierSign::Positive).unwrap();
        assert_eq!(first, fresh);
    }
}
