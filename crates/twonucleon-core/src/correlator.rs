//! Per-channel correlator fields and their output names.

use std::collections::BTreeMap;
use std::fmt;

use num_complex::Complex64;
use rayon::prelude::*;
use twonucleon_lattice::{Geometry, LatticeField};

use crate::error::Result;
use crate::key::Parity;
use crate::spin::{HalfSpinMatrix, SpinState};
use crate::topology::{Channel, Family};

/// Whether the two baryons share a source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Locality {
    Displaced,
    Local,
}

/// Identifies one correlator of a (boost, parity) iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelatorKey {
    pub channel: Channel,
    pub locality: Locality,
}

impl CorrelatorKey {
    pub fn local(channel: Channel) -> Self {
        Self {
            channel,
            locality: Locality::Local,
        }
    }

    pub fn displaced(channel: Channel) -> Self {
        Self {
            channel,
            locality: Locality::Displaced,
        }
    }

    /// Lower-case prefix of output names: `pp`, `pn`, `pp_loc`, `pn_loc`.
    pub fn output_label(&self) -> String {
        let family = match self.channel.family {
            Family::PP => "pp",
            Family::PN => "pn",
        };
        match self.locality {
            Locality::Displaced => family.to_string(),
            Locality::Local => format!("{family}_loc"),
        }
    }

    /// Output name `<label>corr_<SING|TRIP>_<sink value>_<source value>_<disp>`
    /// plus the parity suffix.
    pub fn output_name(&self, sink: SpinState, displacement: &str, parity: Parity) -> String {
        let source = self.channel.spin;
        format!(
            "{}corr_{}_{}_{}_{}{}",
            self.output_label(),
            source.multiplet(),
            sink.value_label(),
            source.value_label(),
            displacement,
            parity.output_suffix()
        )
    }
}

impl fmt::Display for CorrelatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.locality {
            Locality::Displaced => write!(f, "{}", self.channel),
            Locality::Local => write!(f, "{}_loc", self.channel),
        }
    }
}

/// Correlator fields of one (boost, parity) iteration. Entries are created
/// zeroed on first use; only populated entries exist.
#[derive(Debug, Clone)]
pub struct CorrelatorMap {
    geometry: Geometry,
    entries: BTreeMap<CorrelatorKey, LatticeField<HalfSpinMatrix>>,
}

impl CorrelatorMap {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            entries: BTreeMap::new(),
        }
    }

    /// The field of `key`, created zeroed if absent.
    pub fn entry(&mut self, key: CorrelatorKey) -> &mut LatticeField<HalfSpinMatrix> {
        let geometry = self.geometry;
        self.entries
            .entry(key)
            .or_insert_with(|| LatticeField::zeros(geometry))
    }

    pub fn get(&self, key: &CorrelatorKey) -> Option<&LatticeField<HalfSpinMatrix>> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &CorrelatorKey) -> Option<&mut LatticeField<HalfSpinMatrix>> {
        self.entries.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CorrelatorKey, &LatticeField<HalfSpinMatrix>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `trace(projector · C)` on every site.
pub fn project(
    correlator: &LatticeField<HalfSpinMatrix>,
    projector: &HalfSpinMatrix,
) -> Result<LatticeField<Complex64>> {
    let values = correlator
        .as_slice()
        .par_iter()
        .map(|c| projector.trace_product(c))
        .collect();
    Ok(LatticeField::from_vec(*correlator.geometry(), values)?)
}
