//! Contraction-definition files.
//!
//! The file is JSON of the form
//!
//! ```json
//! { "topologies": { "PP_SING0": { "symmetry": "antisymmetric",
//!     "modes": { "000|111": { "fourier_sign": 1,
//!       "terms": [ { "out": [0, 1], "left": [0,0,0,0,0,1,2],
//!                    "right": [1,1,0,0,0,2,1], "coefficient": [1.0, 0.0] } ] } } } } }
//! ```
//!
//! Names are parsed into typed records once, when the registry is built.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::block::BlockIndex;
use crate::error::{ContractError, Result};
use crate::spin::NS_HALF;
use crate::topology::{
    Channel, ContractionTensor, ContractionTerm, FourierSign, Mode, Symmetry, Topology,
    TopologyRegistry,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionFile {
    pub topologies: BTreeMap<String, TopologyDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyDef {
    pub symmetry: Symmetry,
    pub modes: BTreeMap<String, ModeDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeDef {
    pub fourier_sign: i32,
    #[serde(default)]
    pub terms: Vec<TermDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermDef {
    pub out: [usize; 2],
    pub left: [usize; 7],
    pub right: [usize; 7],
    /// `[re, im]`.
    pub coefficient: [f64; 2],
}

impl DefinitionFile {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = fs::File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Validate every entry and build the registry.
    pub fn into_registry(self) -> Result<TopologyRegistry> {
        let mut registry = TopologyRegistry::new();
        for (name, def) in self.topologies {
            let channel: Channel = name
                .parse()
                .map_err(|_| invalid(format!("unknown channel '{name}'")))?;
            let mut topology = Topology::new(channel, def.symmetry);
            for (mode_name, mode_def) in def.modes {
                let mode: Mode = mode_name
                    .parse()
                    .map_err(|_| invalid(format!("{channel}: unknown mode '{mode_name}'")))?;
                let sign = FourierSign::from_i32(mode_def.fourier_sign).ok_or_else(|| {
                    invalid(format!(
                        "{channel} {mode}: fourier_sign must be -1, 0 or 1, got {}",
                        mode_def.fourier_sign
                    ))
                })?;
                let terms = mode_def
                    .terms
                    .iter()
                    .map(|t| term(t).map_err(|e| invalid(format!("{channel} {mode}: {e}"))))
                    .collect::<Result<Vec<_>>>()?;
                debug!(%channel, %mode, terms = terms.len(), sign = sign.value(), "loaded mode");
                topology.insert_mode(mode, ContractionTensor::new(terms), sign);
            }
            registry.insert(topology);
        }
        info!(channels = registry.len(), "topologies loaded");
        Ok(registry)
    }
}

impl TopologyRegistry {
    /// Load and validate a contraction-definition file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "reading contraction definitions");
        DefinitionFile::from_path(path)?.into_registry()
    }
}

fn invalid(msg: String) -> ContractError {
    ContractError::InvalidDefinition(msg)
}

fn term(def: &TermDef) -> std::result::Result<ContractionTerm, String> {
    let [s1, s2] = def.out;
    if s1 >= NS_HALF || s2 >= NS_HALF {
        return Err(format!("output index {:?} out of range", def.out));
    }
    let left = BlockIndex::new(def.left).ok_or_else(|| format!("left index {:?} out of range", def.left))?;
    let right =
        BlockIndex::new(def.right).ok_or_else(|| format!("right index {:?} out of range", def.right))?;
    Ok(ContractionTerm {
        out: (s1, s2),
        left,
        right,
        coefficient: Complex64::new(def.coefficient[0], def.coefficient[1]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spin::SpinState;
    use crate::topology::Family;

    const EXAMPLE: &str = r#"{ "topologies": { "PP_SING0": { "symmetry": "antisymmetric",
        "modes": { "000|111": { "fourier_sign": 1,
          "terms": [ { "out": [0, 1], "left": [0,0,0,0,0,1,2],
                       "right": [1,1,0,0,0,2,1], "coefficient": [1.0, 0.0] } ] },
                   "001|110": { "fourier_sign": 0 } } } } }"#;

    #[test]
    fn test_load_example() {
        let registry = DefinitionFile::from_reader(EXAMPLE.as_bytes())
            .unwrap()
            .into_registry()
            .unwrap();
        let topo = registry
            .get(Channel::new(Family::PP, SpinState::Sing0))
            .unwrap();
        assert_eq!(topo.symmetry(), Symmetry::Antisymmetric);
        let base = Family::PP.base_mode();
        assert_eq!(topo.fourier_sign(base).unwrap(), FourierSign::Positive);
        let tensor = topo.tensor(base).unwrap();
        assert_eq!(tensor.len(), 1);
        assert_eq!(tensor.terms()[0].out, (0, 1));
        assert_eq!(tensor.terms()[0].right.indices(), [1, 1, 0, 0, 0, 2, 1]);
        let degenerate = "001|110".parse().unwrap();
        assert!(topo.fourier_sign(degenerate).unwrap().is_zero());
        assert!(topo.tensor(degenerate).unwrap().is_empty());
    }

    fn reject(json: &str) -> String {
        let err = DefinitionFile::from_reader(json.as_bytes())
            .and_then(DefinitionFile::into_registry)
            .unwrap_err();
        err.to_string()
    }

    #[test]
    fn test_rejects_bad_entries() {
        let msg = reject(r#"{"topologies": {"NN_SING0": {"symmetry": "symmetric", "modes": {}}}}"#);
        assert!(msg.contains("unknown channel"), "{msg}");

        let msg = reject(
            r#"{"topologies": {"PN_TRIPP": {"symmetry": "symmetric", "modes": {"002|110": {"fourier_sign": 1}}}}}"#,
        );
        assert!(msg.contains("unknown mode"), "{msg}");

        let msg = reject(
            r#"{"topologies": {"PN_TRIPP": {"symmetry": "symmetric", "modes": {"001|110": {"fourier_sign": 2}}}}}"#,
        );
        assert!(msg.contains("fourier_sign"), "{msg}");

        let msg = reject(
            r#"{"topologies": {"PN_TRIPP": {"symmetry": "symmetric", "modes": {"001|110": {"fourier_sign": 1,
                "terms": [{"out": [0, 0], "left": [0,0,3,0,0,0,0], "right": [0,0,0,0,0,0,0], "coefficient": [1, 0]}]}}}}}"#,
        );
        assert!(msg.contains("left index"), "{msg}");

        let msg = reject(
            r#"{"topologies": {"PN_TRIPP": {"symmetry": "symmetric", "modes": {"001|110": {"fourier_sign": 1,
                "terms": [{"out": [2, 0], "left": [0,0,0,0,0,0,0], "right": [0,0,0,0,0,0,0], "coefficient": [1, 0]}]}}}}}"#,
        );
        assert!(msg.contains("output index"), "{msg}");
    }

    #[test]
    fn test_unknown_symmetry_is_json_error() {
        let err = DefinitionFile::from_reader(
            r#"{"topologies": {"PP_SING0": {"symmetry": "odd", "modes": {}}}}"#.as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::Json(_)));
    }
}
