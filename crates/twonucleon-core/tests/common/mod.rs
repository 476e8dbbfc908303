#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use twonucleon_core::definitions::{ModeDef, TermDef, TopologyDef};
use twonucleon_core::{
    BaryonBlock, BlockMap, BlockSign, Channel, DefinitionFile, Family, Mode, QuarkPattern,
    RequiredBlock, SiteBlock, Symmetry, TopologyRegistry,
};
use twonucleon_lattice::{Geometry, LatticeField};

pub fn geometry() -> Geometry {
    Geometry::new([2, 2, 2, 4]).unwrap()
}

pub fn random_block(rng: &mut ChaCha8Rng, geometry: Geometry, sign: BlockSign) -> BaryonBlock {
    BaryonBlock::from_field(
        sign,
        LatticeField::from_fn(geometry, |_| {
            SiteBlock::from_fn(|_| Complex64::new(rng.random::<f64>() - 0.5, rng.random::<f64>() - 0.5))
        }),
    )
}

/// Block maps holding a random block for every required key.
pub fn synthesize(required: &[RequiredBlock], geometry: Geometry, seed: u64) -> HashMap<String, BlockMap> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut maps: HashMap<String, BlockMap> = HashMap::new();
    for r in required {
        let block = random_block(&mut rng, geometry, r.key.sign);
        maps.entry(r.source.clone())
            .or_default()
            .insert(r.key.clone(), block);
    }
    maps
}

fn terms(shift: usize) -> Vec<TermDef> {
    let s = shift % 2;
    vec![
        TermDef {
            out: [0, 1],
            left: [0, 0, 0, 0, 0, 1, 2],
            right: [1, 1, 0, 0, 0, 2, 1],
            coefficient: [1.0, 0.0],
        },
        TermDef {
            out: [1, 0],
            left: [1, s, 2, 1, 1, 0, 0],
            right: [0, 0, 1, 1, s, 2, 2],
            coefficient: [0.5, -0.5],
        },
        TermDef {
            out: [0, 0],
            left: [s, 1, 1, 0, 1, 2, 0],
            right: [1, 0, 2, s, 0, 1, 1],
            coefficient: [-1.0, 0.25],
        },
        TermDef {
            out: [1, 1],
            left: [1, 1, 0, 1, 0, 0, 1],
            right: [0, 1, 1, 0, 1, 1, 0],
            coefficient: [0.0, 1.0],
        },
    ]
}

fn mode(fourier_sign: i32, shift: usize) -> ModeDef {
    ModeDef {
        fourier_sign,
        terms: terms(shift),
    }
}

/// Definitions for all eight channels.
///
/// PN modes whose source and sink mixed patterns sit at the same grid
/// position are degenerate (sign 0) and rely on their swapped partner.
pub fn definitions() -> DefinitionFile {
    let mut topologies = BTreeMap::new();
    for channel in Channel::DISPLACED {
        let mut modes = BTreeMap::new();
        let base = channel.family.base_mode();
        let base_sign = match channel.family {
            Family::PP => 1,
            Family::PN => -1,
        };
        modes.insert(base.to_string(), mode(base_sign, 0));
        for (i, p0) in QuarkPattern::SOURCE_MIXED.into_iter().enumerate() {
            for (j, p1) in QuarkPattern::SINK_MIXED.into_iter().enumerate() {
                let m = Mode::new(p0, p1);
                let sign = if i == j { 0 } else if i < j { 1 } else { -1 };
                modes.insert(m.to_string(), mode(sign, i + j));
                if channel.family == Family::PN && i == j {
                    modes.insert(m.swapped().to_string(), mode(1, i + j + 1));
                }
            }
        }
        if Channel::LOCAL.contains(&channel) {
            modes.insert(Mode::LOCAL.to_string(), mode(0, 1));
        }
        let symmetry = match channel.family {
            Family::PP => Symmetry::Antisymmetric,
            Family::PN => Symmetry::Symmetric,
        };
        topologies.insert(channel.to_string(), TopologyDef { symmetry, modes });
    }
    DefinitionFile { topologies }
}

pub fn topologies() -> TopologyRegistry {
    definitions().into_registry().unwrap()
}
