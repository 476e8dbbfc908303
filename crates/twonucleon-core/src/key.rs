//! Block lookup keys.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::block::{BaryonBlock, BlockSign};
use crate::error::{ContractError, Result};

/// Parity projection of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Parity {
    #[serde(rename = "POS_PAR")]
    Positive,
    #[serde(rename = "NEG_PAR")]
    Negative,
}

impl Parity {
    pub fn label(self) -> &'static str {
        match self {
            Parity::Positive => "POS_PAR",
            Parity::Negative => "NEG_PAR",
        }
    }

    /// Suffix appended to correlator names: empty for `POS_PAR`, `_34`
    /// otherwise.
    pub fn output_suffix(self) -> &'static str {
        match self {
            Parity::Positive => "",
            Parity::Negative => "_34",
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Parity {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "POS_PAR" => Ok(Parity::Positive),
            "NEG_PAR" => Ok(Parity::Negative),
            _ => Err(ContractError::parse("parity", s)),
        }
    }
}

/// Identifies one precomputed block in a block map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockKey {
    /// Propagator ids of the three quarks.
    pub quarks: [String; 3],
    pub sign: BlockSign,
    pub parity: Parity,
    pub origin: [i64; 4],
    /// Displacement label, e.g. `px0py0pz0`.
    pub displacement: String,
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [q0, q1, q2] = &self.quarks;
        write!(
            f,
            "({q0}, {q1}, {q2})[{}] {} origin={:?} disp={}",
            self.sign, self.parity, self.origin, self.displacement
        )
    }
}

/// Blocks produced by one block source.
pub type BlockMap = HashMap<BlockKey, BaryonBlock>;
