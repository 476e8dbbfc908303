use num_complex::Complex64;
use num_traits::Zero;
use rayon::prelude::*;
use twonucleon_lattice::LatticeField;

use super::contract_fields;
use crate::block::{BaryonBlock, BlockIndex, SiteBlock};
use crate::error::Result;
use crate::spin::{HalfSpinMatrix, NS_HALF};
use crate::topology::ContractionTensor;

/// Add the local contraction of `left` and `right` through `tensor` to
/// `acc`. No Fourier step.
pub fn contract_local(
    acc: &mut LatticeField<HalfSpinMatrix>,
    left: &BaryonBlock,
    right: &BaryonBlock,
    tensor: &ContractionTensor,
) -> Result<()> {
    contract_fields(acc, left.field(), right.field(), tensor)
}

/// Non-zero entries `(a, b, c, ε_abc)` of the Levi-Civita symbol.
const EPSILON: [(usize, usize, usize, f64); 6] = [
    (0, 1, 2, 1.0),
    (1, 2, 0, 1.0),
    (2, 0, 1, 1.0),
    (0, 2, 1, -1.0),
    (2, 1, 0, -1.0),
    (1, 0, 2, -1.0),
];

/// Single-nucleon correlator of one block:
/// `Σ_{i,j} Σ_{abc} ε_abc B[i][i][a][j][j][b][c]` on every site.
pub fn one_proton(block: &BaryonBlock) -> Result<LatticeField<Complex64>> {
    let values = block
        .field()
        .as_slice()
        .par_iter()
        .map(proton_site)
        .collect();
    Ok(LatticeField::from_vec(*block.geometry(), values)?)
}

fn proton_site(site: &SiteBlock) -> Complex64 {
    let mut sum = Complex64::zero();
    for i in 0..NS_HALF {
        for j in 0..NS_HALF {
            for &(a, b, c, eps) in &EPSILON {
                if let Some(idx) = BlockIndex::new([i, i, a, j, j, b, c]) {
                    sum += site[idx] * eps;
                }
            }
        }
    }
    sum
}
