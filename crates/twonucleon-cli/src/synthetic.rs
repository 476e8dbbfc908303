//! Seeded random blocks standing in for a block-producing measurement.

use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use twonucleon::lattice::{Geometry, LatticeField};
use twonucleon::{BaryonBlock, MeasurementInputs, RequiredBlock, SiteBlock};

/// Insert a random block for every required key missing from `inputs`.
pub fn fill_blocks(inputs: &mut MeasurementInputs, required: &[RequiredBlock], seed: u64) -> usize {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let geometry = inputs.geometry;
    let mut added = 0;
    for r in required {
        let map = inputs.block_maps.entry(r.source.clone()).or_default();
        if map.contains_key(&r.key) {
            continue;
        }
        debug!(source = %r.source, key = %r.key, "synthesizing block");
        map.insert(r.key.clone(), random_block(&mut rng, geometry, r));
        added += 1;
    }
    added
}

fn random_block(rng: &mut ChaCha8Rng, geometry: Geometry, r: &RequiredBlock) -> BaryonBlock {
    BaryonBlock::from_field(
        r.key.sign,
        LatticeField::from_fn(geometry, |_| {
            SiteBlock::from_fn(|_| Complex64::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)))
        }),
    )
}
