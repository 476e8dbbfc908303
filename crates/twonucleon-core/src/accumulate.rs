//! Weighted accumulation of half-baryon blocks.

use num_complex::Complex64;
use rayon::prelude::*;
use twonucleon_lattice::SiteValue;

use crate::block::BaryonBlock;
use crate::error::{ContractError, Result};

/// `out += weight * input` over every site and every block entry.
///
/// Both blocks must share block sign and geometry.
pub fn add_weighted_block(out: &mut BaryonBlock, weight: Complex64, input: &BaryonBlock) -> Result<()> {
    if out.sign() != input.sign() {
        return Err(ContractError::BlockSignMismatch {
            expected: out.sign(),
            actual: input.sign(),
        });
    }
    out.field().ensure_geometry(input.geometry())?;
    out.field_mut()
        .as_mut_slice()
        .par_iter_mut()
        .zip(input.field().as_slice().par_iter())
        .for_each(|(acc, site)| acc.add_scaled(weight, site));
    Ok(())
}

/// `out += Σ_b w_b · B_b`.
pub fn accumulate<'a>(
    out: &mut BaryonBlock,
    terms: impl IntoIterator<Item = (Complex64, &'a BaryonBlock)>,
) -> Result<()> {
    for (weight, block) in terms {
        add_weighted_block(out, weight, block)?;
    }
    Ok(())
}
