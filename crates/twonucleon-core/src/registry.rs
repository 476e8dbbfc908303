//! Named measurement factories.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;
use twonucleon_lattice::Geometry;

use crate::error::{ContractError, Result};
use crate::key::{BlockKey, BlockMap};
use crate::measurement::{TwoNucleons, TWO_NUCLEONS};

/// Everything a measurement reads from the surrounding run.
#[derive(Debug, Clone)]
pub struct MeasurementInputs {
    pub geometry: Geometry,
    /// Source position of every propagator id.
    pub positions: HashMap<String, [i64; 4]>,
    /// Block maps by block-source name.
    pub block_maps: HashMap<String, BlockMap>,
}

impl MeasurementInputs {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            positions: HashMap::new(),
            block_maps: HashMap::new(),
        }
    }

    pub fn with_position(mut self, id: impl Into<String>, position: [i64; 4]) -> Self {
        self.positions.insert(id.into(), position);
        self
    }

    pub fn with_blocks(mut self, name: impl Into<String>, blocks: BlockMap) -> Self {
        self.block_maps.insert(name.into(), blocks);
        self
    }
}

/// A block a measurement will read, and the block source it is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredBlock {
    pub source: String,
    pub key: BlockKey,
}

/// A configured measurement.
pub trait Measurement {
    fn name(&self) -> &str;

    /// Run on every `frequency`-th update.
    fn frequency(&self) -> u64 {
        1
    }

    /// Every block [`run`](Self::run) will read.
    fn required_blocks(&self, inputs: &MeasurementInputs) -> Result<Vec<RequiredBlock>>;

    fn run(&self, update_no: u64, inputs: &MeasurementInputs) -> Result<()>;
}

/// Builds a measurement from its JSON parameters.
pub type MeasurementFactory = fn(&serde_json::Value) -> Result<Box<dyn Measurement>>;

/// Name to factory map, owned by the driver.
#[derive(Default)]
pub struct MeasurementRegistry {
    factories: BTreeMap<String, MeasurementFactory>,
}

impl MeasurementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`; a name can be registered once.
    pub fn register(&mut self, name: &str, factory: MeasurementFactory) -> Result<()> {
        if self.factories.contains_key(name) {
            return Err(ContractError::DuplicateMeasurement(name.to_string()));
        }
        debug!(name, "registered measurement");
        self.factories.insert(name.to_string(), factory);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn create(&self, name: &str, params: &serde_json::Value) -> Result<Box<dyn Measurement>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ContractError::UnknownMeasurement(name.to_string()))?;
        factory(params)
    }
}

/// Register every measurement of this crate.
pub fn register_all(registry: &mut MeasurementRegistry) -> Result<()> {
    registry.register(TWO_NUCLEONS, TwoNucleons::from_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all() {
        let mut registry = MeasurementRegistry::new();
        register_all(&mut registry).unwrap();
        assert!(registry.contains("TWO_NUCLEONS"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["TWO_NUCLEONS"]);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = MeasurementRegistry::new();
        register_all(&mut registry).unwrap();
        assert!(matches!(
            register_all(&mut registry),
            Err(ContractError::DuplicateMeasurement(name)) if name == "TWO_NUCLEONS"
        ));
    }

    #[test]
    fn test_unknown_measurement() {
        let registry = MeasurementRegistry::new();
        assert!(matches!(
            registry.create("BARYON_BLOCKS", &serde_json::Value::Null),
            Err(ContractError::UnknownMeasurement(_))
        ));
    }

    #[test]
    fn test_factory_rejects_bad_params() {
        let mut registry = MeasurementRegistry::new();
        register_all(&mut registry).unwrap();
        let err = registry
            .create(TWO_NUCLEONS, &serde_json::json!({"named_obj": {}}))
            .err()
            .unwrap();
        assert!(matches!(err, ContractError::Json(_)));
    }
}
