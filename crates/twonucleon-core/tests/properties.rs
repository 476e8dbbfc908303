mod common;

use std::collections::HashMap;

use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use twonucleon_core::{
    accumulate, add_weighted_block, check_availability, required_keys, BaryonBlock, BlockSign,
    BlockSource, ContractError, ContractionOptions, ContractionPlan, Parity, PropagatorSet,
    SiteBlock,
};
use twonucleon_lattice::LatticeField;

fn integer_block(rng: &mut ChaCha8Rng, sign: BlockSign) -> BaryonBlock {
    BaryonBlock::from_field(
        sign,
        LatticeField::from_fn(common::geometry(), |_| {
            SiteBlock::from_fn(|_| {
                Complex64::new(rng.random_range(-8..=8) as f64, rng.random_range(-8..=8) as f64)
            })
        }),
    )
}

#[test]
fn test_accumulation_is_linear() {
    // integer entries and dyadic weights keep every sum exact
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for n in 1..=4 {
        let blocks: Vec<_> = (0..n)
            .map(|_| integer_block(&mut rng, BlockSign::Minus))
            .collect();
        let weights: Vec<_> = (0..n)
            .map(|_| {
                Complex64::new(
                    rng.random_range(-4..=4) as f64 * 0.25,
                    rng.random_range(-4..=4) as f64 * 0.5,
                )
            })
            .collect();

        let mut out = BaryonBlock::zeros(common::geometry(), BlockSign::Minus);
        accumulate(&mut out, weights.iter().copied().zip(&blocks)).unwrap();

        for site in 0..common::geometry().volume() {
            let got = out.site(site).as_slice();
            for (offset, value) in got.iter().enumerate() {
                let expected: Complex64 = weights
                    .iter()
                    .zip(&blocks)
                    .map(|(w, b)| w * b.site(site).as_slice()[offset])
                    .sum();
                assert_eq!(*value, expected);
            }
        }
    }
}

#[test]
fn test_split_weights_sum_to_combined_weights() {
    let mut rng = ChaCha8Rng::seed_from_u64(15);
    let blocks: Vec<_> = (0..3)
        .map(|_| integer_block(&mut rng, BlockSign::Plus))
        .collect();
    let w = [0.5, -1.25, 2.0].map(|x| Complex64::new(x, 0.25));
    let w_prime = [-0.75, 0.5, 1.0].map(|x| Complex64::new(0.5, x));

    let mut first = BaryonBlock::zeros(common::geometry(), BlockSign::Plus);
    accumulate(&mut first, w.iter().copied().zip(&blocks)).unwrap();
    let mut second = BaryonBlock::zeros(common::geometry(), BlockSign::Plus);
    accumulate(&mut second, w_prime.iter().copied().zip(&blocks)).unwrap();
    let mut split = first;
    add_weighted_block(&mut split, Complex64::new(1.0, 0.0), &second).unwrap();

    let mut combined = BaryonBlock::zeros(common::geometry(), BlockSign::Plus);
    let sums = w.iter().zip(&w_prime).map(|(a, b)| a + b);
    accumulate(&mut combined, sums.zip(&blocks)).unwrap();

    assert_eq!(split.field().as_slice(), combined.field().as_slice());
}

#[test]
fn test_accumulation_order_does_not_matter() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let a = integer_block(&mut rng, BlockSign::Plus);
    let b = integer_block(&mut rng, BlockSign::Plus);
    let (wa, wb) = (Complex64::new(0.5, 0.0), Complex64::new(-0.25, 0.75));

    let mut ab = BaryonBlock::zeros(common::geometry(), BlockSign::Plus);
    add_weighted_block(&mut ab, wa, &a).unwrap();
    add_weighted_block(&mut ab, wb, &b).unwrap();
    let mut ba = BaryonBlock::zeros(common::geometry(), BlockSign::Plus);
    add_weighted_block(&mut ba, wb, &b).unwrap();
    add_weighted_block(&mut ba, wa, &a).unwrap();

    assert_eq!(ab.field().as_slice(), ba.field().as_slice());
}

#[test]
fn test_accumulation_rejects_sign_mismatch() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let input = integer_block(&mut rng, BlockSign::Minus);
    let mut out = BaryonBlock::zeros(common::geometry(), BlockSign::Plus);
    assert!(matches!(
        add_weighted_block(&mut out, Complex64::new(1.0, 0.0), &input),
        Err(ContractError::BlockSignMismatch { .. })
    ));
}

fn props() -> PropagatorSet {
    let positions = HashMap::from([
        ("a".to_string(), [0, 0, 0, 0]),
        ("b".to_string(), [0, 1, 0, 0]),
    ]);
    PropagatorSet::resolve(
        &["a".to_string()],
        &["b".to_string()],
        &positions,
        [0, 0, 0, 0],
        &common::geometry(),
    )
    .unwrap()
}

#[test]
fn test_every_single_gap_is_reported() {
    let plan = ContractionPlan::new(ContractionOptions::default(), false);
    let parity_sets = [
        vec![Parity::Positive],
        vec![Parity::Negative],
        vec![Parity::Positive, Parity::Negative],
    ];
    for parities in parity_sets {
        let required = required_keys(&plan, &props(), &parities);
        let mut rng = ChaCha8Rng::seed_from_u64(14);
        let full: HashMap<_, _> = required
            .iter()
            .map(|r| (r.key.clone(), integer_block(&mut rng, r.key.sign)))
            .collect();

        let source = BlockSource { name: "blk", map: &full };
        check_availability(&required, &[source]).unwrap();

        for victim in &required {
            let mut map = full.clone();
            map.remove(&victim.key);
            let source = BlockSource { name: "blk", map: &map };
            match check_availability(&required, &[source]) {
                Err(ContractError::MissingBlocks(missing)) => {
                    assert_eq!(missing.len(), 1);
                    assert_eq!(missing[0].key, victim.key);
                    assert_eq!(missing[0].block, 0);
                }
                other => panic!("expected MissingBlocks, got {other:?}"),
            }
        }
    }
}

#[test]
fn test_required_keys_scale_with_parities() {
    let plan = ContractionPlan::new(ContractionOptions::default(), false);
    let one = required_keys(&plan, &props(), &[Parity::Positive]);
    let both = required_keys(&plan, &props(), &[Parity::Positive, Parity::Negative]);
    assert_eq!(both.len(), 2 * one.len());
    // 000 and 111 for both signs, three source-side and three sink-side mixed
    assert_eq!(one.len(), 2 + 2 + 6);
    assert!(one.iter().all(|r| r.key.parity == Parity::Positive));
}
