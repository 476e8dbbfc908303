//! Two-nucleon correlator contractions.
//!
//! This crate turns precomputed half-baryon blocks into proton-proton and
//! proton-neutron correlators:
//!
//! - [`PropagatorSet`] and [`required_keys`]/[`check_availability`]: resolve
//!   propagator positions and verify every needed block up front
//! - [`add_weighted_block`]: weighted sums of blocks
//! - [`contract_local`], [`contract_displaced`], [`contract_mode`]: local and
//!   momentum-projected contractions through a [`ContractionTensor`]
//! - [`symmetrize`]: exchange (anti)symmetrization of displaced channels
//! - [`TopologyRegistry`]: channel tensors loaded from a definition file
//! - [`TwoNucleons`]: the full measurement, registered as `TWO_NUCLEONS` in a
//!   [`MeasurementRegistry`]
//!
//! # Example
//!
//! ```
//! use twonucleon_core::{Channel, Family, Mode, SpinState};
//!
//! let channel: Channel = "PN_TRIPP".parse().unwrap();
//! assert_eq!(channel, Channel::new(Family::PN, SpinState::TripP));
//!
//! let mode: Mode = "001|110".parse().unwrap();
//! assert_eq!(mode.swapped().to_string(), "110|001");
//! ```

pub mod accumulate;
pub mod availability;
pub mod block;
pub mod contract;
pub mod correlator;
pub mod definitions;
mod error;
pub mod flavor;
pub mod key;
pub mod measurement;
pub mod params;
pub mod plan;
pub mod registry;
pub mod spin;
pub mod symmetrize;
pub mod topology;

pub use accumulate::{accumulate, add_weighted_block};
pub use availability::{check_availability, required_keys, BlockSource, MissingBlock, RequiredKey};
pub use block::{BaryonBlock, BlockIndex, BlockSign, SiteBlock, BLOCK_DIMS, BLOCK_LEN, NC};
pub use contract::{
    contract_displaced, contract_local, contract_mode, one_proton, DisplacedContraction,
    ModeOutcome,
};
pub use correlator::{project, CorrelatorKey, CorrelatorMap, Locality};
pub use definitions::DefinitionFile;
pub use error::{ContractError, Result};
pub use flavor::{PropagatorSet, QuarkPattern, Slot};
pub use key::{BlockKey, BlockMap, Parity};
pub use measurement::{open_sink, RunSummary, Timings, TwoNucleons, TWO_NUCLEONS};
pub use params::{BlockSourceRef, NamedObjects, TwoNucleonParams, TwoNucleonsConfig, Weight};
pub use plan::{ContractionOptions, ContractionPlan, Stage};
pub use registry::{
    register_all, Measurement, MeasurementFactory, MeasurementInputs, MeasurementRegistry,
    RequiredBlock,
};
pub use spin::{HalfSpinMatrix, Multiplet, ProjectorTable, SpinState, NS_HALF};
pub use symmetrize::{combine, exchange_partner, symmetrize};
pub use topology::{
    Channel, ContractionTensor, ContractionTerm, Family, FourierSign, Mode, ModeEntry,
    SwapPolicy, Symmetry, Topology, TopologyRegistry,
};
