//! Up-front check that every block a run will read is present.

use std::collections::HashSet;
use std::fmt;

use tracing::{error, info};

use crate::block::BlockSign;
use crate::error::{ContractError, Result};
use crate::flavor::PropagatorSet;
use crate::key::{BlockKey, BlockMap, Parity};
use crate::plan::ContractionPlan;

/// A key that must be present in the map of block source `block`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequiredKey {
    pub block: usize,
    pub key: BlockKey,
}

/// A required key absent from its block map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingBlock {
    pub block: usize,
    pub source: String,
    pub key: BlockKey,
}

impl MissingBlock {
    pub(crate) fn listing(missing: &[MissingBlock]) -> String {
        missing
            .iter()
            .map(|m| format!("  {m}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for MissingBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {} ('{}'): {}", self.block, self.source, self.key)
    }
}

/// Every key the plan reads, per parity and block source, without
/// duplicates and in first-use order.
pub fn required_keys(plan: &ContractionPlan, props: &PropagatorSet, parities: &[Parity]) -> Vec<RequiredKey> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    for &parity in parities {
        for stage in plan.stages() {
            for (p0, p1) in stage.block_pairs() {
                for b in 0..props.n_blocks() {
                    for (pattern, sign) in [(p0, BlockSign::Plus), (p1, BlockSign::Minus)] {
                        let required = RequiredKey {
                            block: b,
                            key: props.key(pattern, sign, parity, b),
                        };
                        if seen.insert(required.clone()) {
                            keys.push(required);
                        }
                    }
                }
            }
        }
    }
    keys
}

/// A named block map.
#[derive(Debug, Clone, Copy)]
pub struct BlockSource<'a> {
    pub name: &'a str,
    pub map: &'a BlockMap,
}

/// Check every required key against its block source.
///
/// The scan does not stop at the first gap: all missing keys are logged and
/// returned together.
pub fn check_availability(required: &[RequiredKey], sources: &[BlockSource<'_>]) -> Result<()> {
    let mut missing = Vec::new();
    for req in required {
        let source = sources.get(req.block).ok_or(ContractError::ListLengthMismatch {
            what: "nucleon_blocks",
            expected: req.block + 1,
            actual: sources.len(),
        })?;
        if !source.map.contains_key(&req.key) {
            let entry = MissingBlock {
                block: req.block,
                source: source.name.to_string(),
                key: req.key.clone(),
            };
            error!("missing block {entry}");
            missing.push(entry);
        }
    }
    if !missing.is_empty() {
        error!(
            missing = missing.len(),
            "not all blocks needed for the requested contractions are present"
        );
        return Err(ContractError::MissingBlocks(missing));
    }
    info!(keys = required.len(), "all required blocks present");
    Ok(())
}
