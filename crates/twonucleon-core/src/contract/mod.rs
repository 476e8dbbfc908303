//! Two-baryon contraction engines.
//!
//! Both engines contract a source-side block `B0` and a sink-side block `B1`
//! site by site through a sparse [`ContractionTensor`] and add the result to
//! a half-spin correlator field. The displaced engine first moves both
//! blocks to momentum space.

mod displaced;
mod local;

pub use displaced::{contract_displaced, contract_mode, DisplacedContraction, ModeOutcome};
pub use local::{contract_local, one_proton};

use rayon::prelude::*;
use twonucleon_lattice::LatticeField;

use crate::block::SiteBlock;
use crate::error::Result;
use crate::spin::HalfSpinMatrix;
use crate::topology::ContractionTensor;

/// `acc(x) += Σ coeff · left(x)[l] · right(x)[r]` on every site.
fn contract_fields(
    acc: &mut LatticeField<HalfSpinMatrix>,
    left: &LatticeField<SiteBlock>,
    right: &LatticeField<SiteBlock>,
    tensor: &ContractionTensor,
) -> Result<()> {
    acc.ensure_geometry(left.geometry())?;
    acc.ensure_geometry(right.geometry())?;
    acc.as_mut_slice()
        .par_iter_mut()
        .zip(left.as_slice().par_iter())
        .zip(right.as_slice().par_iter())
        .for_each(|((c, l), r)| *c += tensor.contract_site(l, r));
    Ok(())
}
