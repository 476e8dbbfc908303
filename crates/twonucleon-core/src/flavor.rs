//! Quark-slot patterns and propagator sets.
//!
//! Each quark of a half-baryon block comes either from the source-side
//! propagator (at the origin) or from the sink-side propagator (at the
//! displaced position). A [`QuarkPattern`] records that choice for all
//! three quarks, written `"001"` with `0` for source and `1` for sink.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use twonucleon_lattice::{Geometry, NO_DISPLACEMENT};

use crate::block::BlockSign;
use crate::error::{ContractError, Result};
use crate::key::{BlockKey, Parity};

/// Which propagator list a quark is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Source,
    Sink,
}

impl Slot {
    fn digit(self) -> char {
        match self {
            Slot::Source => '0',
            Slot::Sink => '1',
        }
    }
}

/// Slot of each of the three quarks in a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuarkPattern(pub [Slot; 3]);

impl QuarkPattern {
    /// All quarks at the origin (`000`).
    pub const ORIGIN: Self = Self([Slot::Source; 3]);
    /// All quarks at the displaced position (`111`).
    pub const DISPLACED: Self = Self([Slot::Sink; 3]);

    /// Mixed patterns of the source half-block: `001`, `010`, `100`.
    pub const SOURCE_MIXED: [Self; 3] = [
        Self([Slot::Source, Slot::Source, Slot::Sink]),
        Self([Slot::Source, Slot::Sink, Slot::Source]),
        Self([Slot::Sink, Slot::Source, Slot::Source]),
    ];

    /// Mixed patterns of the sink half-block: `110`, `101`, `011`.
    pub const SINK_MIXED: [Self; 3] = [
        Self([Slot::Sink, Slot::Sink, Slot::Source]),
        Self([Slot::Sink, Slot::Source, Slot::Sink]),
        Self([Slot::Source, Slot::Sink, Slot::Sink]),
    ];

    pub fn slots(&self) -> [Slot; 3] {
        self.0
    }

    /// True for `000`: such blocks are looked up undisplaced.
    pub fn is_origin(&self) -> bool {
        *self == Self::ORIGIN
    }
}

impl fmt::Display for QuarkPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in self.0 {
            write!(f, "{}", slot.digit())?;
        }
        Ok(())
    }
}

impl FromStr for QuarkPattern {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 3 {
            return Err(ContractError::parse("quark pattern", s));
        }
        let mut slots = [Slot::Source; 3];
        for (slot, c) in slots.iter_mut().zip(chars) {
            *slot = match c {
                '0' => Slot::Source,
                '1' => Slot::Sink,
                _ => return Err(ContractError::parse("quark pattern", s)),
            };
        }
        Ok(Self(slots))
    }
}

/// Source and sink propagator ids per block source, with the resolved
/// displacement of every sink propagator.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagatorSet {
    prop0: Vec<String>,
    prop1: Vec<String>,
    displacements: Vec<String>,
    origin: [i64; 4],
}

impl PropagatorSet {
    /// Resolve propagator positions against the origin.
    ///
    /// Every `prop0` propagator must sit exactly at `origin`; the
    /// displacement label of block `b` is that of `prop1[b]` relative to the
    /// origin, minimal-image wrapped.
    pub fn resolve(
        prop0: &[String],
        prop1: &[String],
        positions: &HashMap<String, [i64; 4]>,
        origin: [i64; 4],
        geometry: &Geometry,
    ) -> Result<Self> {
        if prop1.len() != prop0.len() {
            return Err(ContractError::ListLengthMismatch {
                what: "prop1_list",
                expected: prop0.len(),
                actual: prop1.len(),
            });
        }
        let position = |id: &String| {
            positions
                .get(id)
                .copied()
                .ok_or_else(|| ContractError::UnknownPropagator(id.clone()))
        };

        let mut displacements = Vec::with_capacity(prop0.len());
        for (id0, id1) in prop0.iter().zip(prop1) {
            let pos0 = position(id0)?;
            if pos0 != origin {
                return Err(ContractError::PropagatorNotAtOrigin {
                    id: id0.clone(),
                    position: pos0,
                    origin,
                });
            }
            let pos1 = position(id1)?;
            displacements.push(geometry.displacement_label(origin, pos1));
        }

        Ok(Self {
            prop0: prop0.to_vec(),
            prop1: prop1.to_vec(),
            displacements,
            origin,
        })
    }

    pub fn n_blocks(&self) -> usize {
        self.prop0.len()
    }

    pub fn origin(&self) -> [i64; 4] {
        self.origin
    }

    /// Source and sink propagators coincide; only local contractions apply.
    pub fn is_local_only(&self) -> bool {
        self.prop0 == self.prop1
    }

    pub fn ids(&self, slot: Slot) -> &[String] {
        match slot {
            Slot::Source => &self.prop0,
            Slot::Sink => &self.prop1,
        }
    }

    pub fn displacement(&self, b: usize) -> &str {
        &self.displacements[b]
    }

    /// Displacement of the first block, used in correlator names.
    pub fn output_displacement(&self) -> &str {
        self.displacements
            .first()
            .map_or(NO_DISPLACEMENT, String::as_str)
    }

    /// Key of the block of source `b` for a quark pattern.
    ///
    /// `000` blocks are undisplaced; every other pattern carries the
    /// displacement of block `b`.
    pub fn key(&self, pattern: QuarkPattern, sign: BlockSign, parity: Parity, b: usize) -> BlockKey {
        let quarks = pattern.slots().map(|slot| self.ids(slot)[b].clone());
        let displacement = if pattern.is_origin() {
            NO_DISPLACEMENT.to_string()
        } else {
            self.displacements[b].clone()
        };
        BlockKey {
            quarks,
            sign,
            parity,
            origin: self.origin,
            displacement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn geometry() -> Geometry {
        Geometry::new([8, 8, 8, 16]).unwrap()
    }

    #[test]
    fn test_pattern_parse_and_display() {
        for p in QuarkPattern::SOURCE_MIXED.iter().chain(&QuarkPattern::SINK_MIXED) {
            assert_eq!(p.to_string().parse::<QuarkPattern>().unwrap(), *p);
        }
        assert_eq!(QuarkPattern::SOURCE_MIXED[0].to_string(), "001");
        assert_eq!(QuarkPattern::SINK_MIXED[2].to_string(), "011");
        assert!("0011".parse::<QuarkPattern>().is_err());
        assert!("012".parse::<QuarkPattern>().is_err());
    }

    #[test]
    fn test_resolve_displacements() {
        let positions = HashMap::from([
            ("a".to_string(), [0, 0, 0, 4]),
            ("b".to_string(), [0, 2, 7, 4]),
        ]);
        let set = PropagatorSet::resolve(
            &ids(&["a"]),
            &ids(&["b"]),
            &positions,
            [0, 0, 0, 4],
            &geometry(),
        )
        .unwrap();
        assert_eq!(set.displacement(0), "px0py2mz1");
        assert_eq!(set.output_displacement(), "px0py2mz1");
        assert!(!set.is_local_only());
    }

    #[test]
    fn test_resolve_rejects_source_off_origin() {
        let positions = HashMap::from([("a".to_string(), [0, 0, 0, 1])]);
        let err = PropagatorSet::resolve(&ids(&["a"]), &ids(&["a"]), &positions, [0; 4], &geometry())
            .unwrap_err();
        assert!(matches!(err, ContractError::PropagatorNotAtOrigin { ref id, .. } if id == "a"));
    }

    #[test]
    fn test_resolve_rejects_length_mismatch() {
        let err = PropagatorSet::resolve(&ids(&["a", "b"]), &ids(&["a"]), &HashMap::new(), [0; 4], &geometry())
            .unwrap_err();
        assert!(matches!(err, ContractError::ListLengthMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_key_uses_slots_and_displacement() {
        let positions = HashMap::from([
            ("s".to_string(), [0, 0, 0, 0]),
            ("t".to_string(), [1, 0, 0, 0]),
        ]);
        let set = PropagatorSet::resolve(&ids(&["s"]), &ids(&["t"]), &positions, [0; 4], &geometry())
            .unwrap();

        let origin_key = set.key(QuarkPattern::ORIGIN, BlockSign::Plus, Parity::Positive, 0);
        assert_eq!(origin_key.quarks, ["s", "s", "s"].map(String::from));
        assert_eq!(origin_key.displacement, NO_DISPLACEMENT);

        let mixed = "101".parse().unwrap();
        let mixed_key = set.key(mixed, BlockSign::Minus, Parity::Negative, 0);
        assert_eq!(mixed_key.quarks, ["t", "s", "t"].map(String::from));
        assert_eq!(mixed_key.displacement, "px1py0pz0");
        assert_eq!(mixed_key.sign, BlockSign::Minus);
    }
}
