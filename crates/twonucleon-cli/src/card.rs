//! JSON run cards.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use twonucleon::lattice::Geometry;
use twonucleon::MeasurementInputs;

/// One measurement entry: its registry name plus its own parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementCard {
    pub name: String,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Lattice, propagator sources and the measurements to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCard {
    pub lattice: [usize; 4],
    #[serde(default)]
    pub propagators: HashMap<String, [i64; 4]>,
    pub measurements: Vec<MeasurementCard>,
}

impl RunCard {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read run card {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse run card {}", path.display()))
    }

    /// Inputs with geometry and propagator positions, no blocks yet.
    pub fn inputs(&self) -> Result<MeasurementInputs> {
        let geometry = Geometry::new(self.lattice).context("invalid lattice extents")?;
        let mut inputs = MeasurementInputs::new(geometry);
        inputs.positions = self.propagators.clone();
        Ok(inputs)
    }
}
