//! Measurement parameters.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::warn;
use twonucleon_lattice::Momentum;

use crate::error::{ContractError, Result};
use crate::key::Parity;
use crate::plan::ContractionOptions;

fn default_stripesize() -> i32 {
    -1
}

fn default_parities() -> Vec<Parity> {
    vec![Parity::Positive, Parity::Negative]
}

fn default_frequency() -> u64 {
    1
}

/// Parameters of the two-nucleon measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoNucleonParams {
    pub output_filename: String,
    pub contractions_filename: String,
    /// Stripe size hint of striped file systems; recorded only.
    #[serde(default = "default_stripesize")]
    pub output_stripesize: i32,
    #[serde(default = "default_parities")]
    pub parities: Vec<Parity>,
    #[serde(default)]
    pub origin: Option<[i64; 4]>,
    #[serde(default)]
    pub compute_locals: Option<bool>,
    #[serde(default)]
    pub compute_loc_o: Option<bool>,
    #[serde(default)]
    pub compute_proton: Option<bool>,
    #[serde(default)]
    pub boosts: Vec<[i64; 3]>,
}

impl TwoNucleonParams {
    /// Parameters with every optional field at its default and the single
    /// zero boost.
    pub fn new(
        output_filename: impl Into<String>,
        contractions_filename: impl Into<String>,
        origin: [i64; 4],
    ) -> Self {
        Self {
            output_filename: output_filename.into(),
            contractions_filename: contractions_filename.into(),
            output_stripesize: default_stripesize(),
            parities: default_parities(),
            origin: Some(origin),
            compute_locals: None,
            compute_loc_o: None,
            compute_proton: None,
            boosts: vec![[0, 0, 0]],
        }
    }

    pub fn with_parities(mut self, parities: Vec<Parity>) -> Self {
        self.parities = parities;
        self
    }

    pub fn with_compute_locals(mut self, enabled: bool) -> Self {
        self.compute_locals = Some(enabled);
        self
    }

    pub fn with_compute_loc_o(mut self, enabled: bool) -> Self {
        self.compute_loc_o = Some(enabled);
        self
    }

    pub fn with_compute_proton(mut self, enabled: bool) -> Self {
        self.compute_proton = Some(enabled);
        self
    }

    pub fn with_boosts(mut self, boosts: Vec<[i64; 3]>) -> Self {
        self.boosts = boosts;
        self
    }

    pub fn with_output_stripesize(mut self, stripesize: i32) -> Self {
        self.output_stripesize = stripesize;
        self
    }

    pub fn origin(&self) -> Result<[i64; 4]> {
        self.origin.ok_or(ContractError::MissingParameter("origin"))
    }

    /// The boost list, which must be exactly the zero momentum.
    pub fn momenta(&self) -> Result<Vec<Momentum>> {
        if self.boosts.len() != 1 || self.boosts[0] != [0, 0, 0] {
            return Err(ContractError::UnsupportedBoost(self.boosts.clone()));
        }
        Ok(self.boosts.iter().map(|&p| Momentum::new(p)).collect())
    }

    /// Resolved flags; unset flags default to true with a warning.
    pub fn options(&self) -> ContractionOptions {
        let flag = |value: Option<bool>, name: &str| {
            value.unwrap_or_else(|| {
                warn!("{name} not set, default = true");
                true
            })
        };
        ContractionOptions {
            compute_locals: flag(self.compute_locals, "compute_locals"),
            compute_loc_o: flag(self.compute_loc_o, "compute_loc_o"),
            compute_proton: flag(self.compute_proton, "compute_proton"),
        }
    }

    /// Check everything that does not need the lattice or the blocks.
    pub fn validate(&self) -> Result<()> {
        self.origin()?;
        self.momenta()?;
        if self.output_filename.is_empty() {
            return Err(ContractError::MissingParameter("output_filename"));
        }
        if self.contractions_filename.is_empty() {
            return Err(ContractError::MissingParameter("contractions_filename"));
        }
        if self.parities.is_empty() {
            return Err(ContractError::MissingParameter("parities"));
        }
        Ok(())
    }
}

/// Complex block weight, written `[re, im]` or as a plain real number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Weight {
    Real(f64),
    Complex([f64; 2]),
}

impl Weight {
    pub fn value(self) -> Complex64 {
        match self {
            Weight::Real(re) => Complex64::new(re, 0.0),
            Weight::Complex([re, im]) => Complex64::new(re, im),
        }
    }
}

impl From<f64> for Weight {
    fn from(re: f64) -> Self {
        Weight::Real(re)
    }
}

/// A named block map and the weight of its blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSourceRef {
    pub block: String,
    pub weight: Weight,
}

impl BlockSourceRef {
    pub fn new(block: impl Into<String>, weight: impl Into<Weight>) -> Self {
        Self {
            block: block.into(),
            weight: weight.into(),
        }
    }
}

/// Named objects the measurement reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedObjects {
    #[serde(default)]
    pub gauge_id: String,
    pub prop0_list: Vec<String>,
    pub prop1_list: Vec<String>,
    pub nucleon_blocks: Vec<BlockSourceRef>,
}

impl NamedObjects {
    /// Check that the three per-block lists line up.
    pub fn validate(&self) -> Result<()> {
        let n = self.prop0_list.len();
        if self.prop1_list.len() != n {
            return Err(ContractError::ListLengthMismatch {
                what: "prop1_list",
                expected: n,
                actual: self.prop1_list.len(),
            });
        }
        if self.nucleon_blocks.len() != n {
            return Err(ContractError::ListLengthMismatch {
                what: "nucleon_blocks",
                expected: n,
                actual: self.nucleon_blocks.len(),
            });
        }
        if n == 0 {
            return Err(ContractError::MissingParameter("prop0_list"));
        }
        Ok(())
    }
}

/// Full configuration of one two-nucleon measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoNucleonsConfig {
    #[serde(default = "default_frequency")]
    pub frequency: u64,
    #[serde(rename = "twonucleonsparam", alias = "params")]
    pub params: TwoNucleonParams,
    pub named_obj: NamedObjects,
}

impl TwoNucleonsConfig {
    pub fn new(params: TwoNucleonParams, named_obj: NamedObjects) -> Self {
        Self {
            frequency: default_frequency(),
            params,
            named_obj,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        self.named_obj.validate()
    }
}
