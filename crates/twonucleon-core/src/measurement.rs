//! The `TWO_NUCLEONS` measurement.
//!
//! One run goes through these phases:
//!
//! 1. validate parameters, resolve propagator positions and block sources,
//!    check that every required block and topology mode is present;
//! 2. for the (zero) boost and every parity: local passes, the non-local
//!    pass, exchange symmetrization of the displaced channels;
//! 3. reduce every correlator to timeslices and write it to the checkpoint;
//! 4. mark the checkpoint consistent and finalize it.
//!
//! Any error aborts the run before finalize, so no output file is published.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant};

use num_complex::Complex64;
use tracing::{debug, info};
#[cfg(not(feature = "hdf5"))]
use tracing::warn;
#[cfg(feature = "hdf5")]
use twonucleon_checkpoint::Hdf5Checkpoint;
use twonucleon_checkpoint::{CheckpointSink, JsonCheckpoint};
use twonucleon_lattice::{Geometry, LatticeField, SpatialFourier, TimeShift, T_DIR};

use crate::accumulate::add_weighted_block;
use crate::availability::{check_availability, required_keys, BlockSource, MissingBlock};
use crate::block::{BaryonBlock, BlockSign};
use crate::contract::{contract_local, one_proton, DisplacedContraction};
use crate::correlator::{project, CorrelatorKey, CorrelatorMap};
use crate::error::{ContractError, Result};
use crate::flavor::{PropagatorSet, QuarkPattern};
use crate::key::{BlockKey, Parity};
use crate::params::TwoNucleonsConfig;
use crate::plan::{ContractionOptions, ContractionPlan, Stage};
use crate::registry::{Measurement, MeasurementInputs, RequiredBlock};
use crate::spin::ProjectorTable;
use crate::symmetrize::symmetrize;
use crate::topology::{Channel, Mode, SwapPolicy, TopologyRegistry};

/// Registry name of the measurement.
pub const TWO_NUCLEONS: &str = "TWO_NUCLEONS";

/// Wall-clock time spent per phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timings {
    pub blocks: Duration,
    pub local: Duration,
    pub nonlocal: Duration,
    pub symmetrize: Duration,
    pub io: Duration,
}

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Checkpoint paths written, in write order.
    pub written: Vec<String>,
    /// Contraction calls per parity and correlator.
    pub contractions: BTreeMap<(Parity, CorrelatorKey), usize>,
    pub timings: Timings,
}

impl RunSummary {
    pub fn contraction_count(&self, parity: Parity, key: CorrelatorKey) -> usize {
        self.contractions.get(&(parity, key)).copied().unwrap_or(0)
    }

    fn count(&mut self, parity: Parity, key: CorrelatorKey) {
        *self.contractions.entry((parity, key)).or_default() += 1;
    }
}

/// Two-nucleon correlators from weighted half-baryon blocks.
#[derive(Debug, Clone)]
pub struct TwoNucleons {
    config: TwoNucleonsConfig,
}

impl TwoNucleons {
    pub fn new(config: TwoNucleonsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Factory for [`MeasurementRegistry`](crate::MeasurementRegistry).
    pub fn from_json(value: &serde_json::Value) -> Result<Box<dyn Measurement>> {
        let config: TwoNucleonsConfig = serde_json::from_value(value.clone())?;
        Ok(Box::new(Self::new(config)?))
    }

    pub fn config(&self) -> &TwoNucleonsConfig {
        &self.config
    }

    fn propagators(&self, geometry: &Geometry, inputs: &MeasurementInputs) -> Result<PropagatorSet> {
        let named = &self.config.named_obj;
        PropagatorSet::resolve(
            &named.prop0_list,
            &named.prop1_list,
            &inputs.positions,
            self.config.params.origin()?,
            geometry,
        )
    }

    fn block_sources<'a>(&'a self, inputs: &'a MeasurementInputs) -> Result<Vec<WeightedSource<'a>>> {
        self.config
            .named_obj
            .nucleon_blocks
            .iter()
            .map(|r| {
                let map = inputs
                    .block_maps
                    .get(&r.block)
                    .ok_or_else(|| ContractError::UnknownBlockSource(r.block.clone()))?;
                Ok(WeightedSource {
                    source: BlockSource { name: &r.block, map },
                    weight: r.weight.value(),
                })
            })
            .collect()
    }

    /// Run with given topologies, writing to `sink`, and finalize it.
    pub fn run_with(
        &self,
        topologies: &TopologyRegistry,
        inputs: &MeasurementInputs,
        sink: &mut dyn CheckpointSink,
    ) -> Result<RunSummary> {
        let started = Instant::now();
        let params = &self.config.params;
        let geometry = inputs.geometry;
        info!(measurement = TWO_NUCLEONS, extents = ?geometry.extents(), "starting");
        debug!(stripesize = params.output_stripesize, "output stripe size");

        let momenta = params.momenta()?;
        let props = self.propagators(&geometry, inputs)?;
        let sources = self.block_sources(inputs)?;
        info!(sets = sources.len(), "block sources resolved");

        let options = params.options();
        let plan = ContractionPlan::new(options, props.is_local_only());
        let required = required_keys(&plan, &props, &params.parities);
        let plain: Vec<BlockSource<'_>> = sources.iter().map(|s| s.source).collect();
        check_availability(&required, &plain)?;
        check_topologies(&plan, topologies)?;

        let projectors = ProjectorTable::new();
        let fft = SpatialFourier::new(geometry);
        let shift = TimeShift::new(props.origin()[T_DIR], geometry.time_extent())?;
        let mut summary = RunSummary::default();

        for momentum in &momenta {
            let boost_dir = momentum.label();
            sink.open()?;
            sink.create_directory(&boost_dir)?;
            sink.close()?;
            let phases = momentum.phases(&geometry, 1);

            for &parity in &params.parities {
                info!(%parity, boost = %boost_dir, "starting contractions");
                let pass = Pass {
                    topologies,
                    props: &props,
                    sources: &sources,
                    parity,
                    geometry,
                    options,
                    phases: &phases,
                    fft: &fft,
                };
                let mut correlators = CorrelatorMap::new(geometry);
                let mut proton = None;

                for &stage in plan.stages() {
                    if stage.is_local() {
                        let p = pass.local_stage(stage, &mut correlators, &mut summary)?;
                        proton = proton.or(p);
                    } else {
                        pass.nonlocal_stage(&mut correlators, &mut summary)?;
                    }
                }

                let t = Instant::now();
                for channel in Channel::DISPLACED {
                    if let Some(field) = correlators.get_mut(&CorrelatorKey::displaced(channel)) {
                        symmetrize(field, &phases, &fft, topologies.get(channel)?.symmetry())?;
                    }
                }
                summary.timings.symmetrize += t.elapsed();

                let t = Instant::now();
                sink.open()?;
                sink.set_consistency(false)?;
                if momentum.is_zero() && options.compute_proton && options.compute_locals {
                    if let Some(proton) = &proton {
                        let name = format!("proton_{parity}");
                        sink.set(&name, &shift.reduce(proton)?)?;
                        summary.written.push(name);
                    }
                }
                for (key, field) in correlators.iter() {
                    for (state, projector) in projectors.sink_projectors(key.channel.spin.multiplet()) {
                        let values = shift.reduce(&project(field, projector)?)?;
                        let name = key.output_name(state, props.output_displacement(), parity);
                        let path = format!("{boost_dir}/{name}");
                        sink.set(&path, &values)?;
                        summary.written.push(path);
                    }
                }
                sink.close()?;
                summary.timings.io += t.elapsed();
            }
        }

        sink.open()?;
        sink.set_counter("mucurrent", 1)?;
        sink.set_consistency(true)?;
        sink.close()?;
        sink.finalize()?;

        let timings = &summary.timings;
        info!(
            blocks_s = timings.blocks.as_secs_f64(),
            local_s = timings.local.as_secs_f64(),
            nonlocal_s = timings.nonlocal.as_secs_f64(),
            symmetrize_s = timings.symmetrize.as_secs_f64(),
            io_s = timings.io.as_secs_f64(),
            total_s = started.elapsed().as_secs_f64(),
            written = summary.written.len(),
            "{TWO_NUCLEONS} done"
        );
        Ok(summary)
    }
}

impl Measurement for TwoNucleons {
    fn name(&self) -> &str {
        TWO_NUCLEONS
    }

    fn frequency(&self) -> u64 {
        self.config.frequency
    }

    fn required_blocks(&self, inputs: &MeasurementInputs) -> Result<Vec<RequiredBlock>> {
        let props = self.propagators(&inputs.geometry, inputs)?;
        let plan = ContractionPlan::new(self.config.params.options(), props.is_local_only());
        let blocks = &self.config.named_obj.nucleon_blocks;
        Ok(required_keys(&plan, &props, &self.config.params.parities)
            .into_iter()
            .map(|r| RequiredBlock {
                source: blocks[r.block].block.clone(),
                key: r.key,
            })
            .collect())
    }

    fn run(&self, update_no: u64, inputs: &MeasurementInputs) -> Result<()> {
        let params = &self.config.params;
        info!(update_no, output = %params.output_filename, "{TWO_NUCLEONS} measurement");
        let topologies = TopologyRegistry::load(&params.contractions_filename)?;
        let mut sink = open_sink(&params.output_filename)?;
        self.run_with(&topologies, inputs, sink.as_mut())?;
        Ok(())
    }
}

/// Checkpoint sink for an output path: HDF5 for `.h5`/`.hdf5` names when
/// built with the `hdf5` feature, JSON otherwise.
pub fn open_sink(output: &str) -> Result<Box<dyn CheckpointSink>> {
    let hdf5_name = matches!(
        Path::new(output).extension().and_then(|e| e.to_str()),
        Some("h5" | "hdf5")
    );
    if hdf5_name {
        #[cfg(feature = "hdf5")]
        return Ok(Box::new(Hdf5Checkpoint::create(output)?));
        #[cfg(not(feature = "hdf5"))]
        warn!(output, "built without the hdf5 feature, writing JSON");
    }
    Ok(Box::new(JsonCheckpoint::create(output)?))
}

struct WeightedSource<'a> {
    source: BlockSource<'a>,
    weight: Complex64,
}

/// Fail unless every channel and mode the plan contracts is loaded.
fn check_topologies(plan: &ContractionPlan, topologies: &TopologyRegistry) -> Result<()> {
    for &stage in plan.stages() {
        if stage.is_local() {
            for channel in Channel::LOCAL {
                topologies.get(channel)?.tensor(Mode::LOCAL)?;
            }
            continue;
        }
        for channel in Channel::DISPLACED {
            let topology = topologies.get(channel)?;
            let policy = channel.family.swap_policy();
            for (p0, p1) in stage.block_pairs() {
                let mode = pair_mode(channel, p0, p1);
                if policy == SwapPolicy::SwapOnZeroSign
                    && !is_base_pair(p0, p1)
                    && topology.fourier_sign(mode)?.is_zero()
                {
                    topology.mode(mode.swapped())?;
                } else {
                    topology.mode(mode)?;
                }
            }
        }
    }
    Ok(())
}

fn is_base_pair(p0: QuarkPattern, p1: QuarkPattern) -> bool {
    p0 == QuarkPattern::ORIGIN && p1 == QuarkPattern::DISPLACED
}

/// Mode a channel contracts a block pair through: the family's base mode
/// for the `000`/`111` pair, the pair itself otherwise.
fn pair_mode(channel: Channel, p0: QuarkPattern, p1: QuarkPattern) -> Mode {
    if is_base_pair(p0, p1) {
        channel.family.base_mode()
    } else {
        Mode::new(p0, p1)
    }
}

/// Shared state of one (boost, parity) iteration.
struct Pass<'a> {
    topologies: &'a TopologyRegistry,
    props: &'a PropagatorSet,
    sources: &'a [WeightedSource<'a>],
    parity: Parity,
    geometry: Geometry,
    options: ContractionOptions,
    phases: &'a LatticeField<Complex64>,
    fft: &'a SpatialFourier,
}

impl Pass<'_> {
    /// Weighted sums `Σ_b w_b B_b` of the `p0[+1]` and `p1[-1]` blocks.
    fn accumulate_pair(
        &self,
        p0: QuarkPattern,
        p1: QuarkPattern,
        summary: &mut RunSummary,
    ) -> Result<(BaryonBlock, BaryonBlock)> {
        let started = Instant::now();
        let mut block0 = BaryonBlock::zeros(self.geometry, BlockSign::Plus);
        let mut block1 = BaryonBlock::zeros(self.geometry, BlockSign::Minus);
        for (b, ws) in self.sources.iter().enumerate() {
            debug!(block = ws.source.name, weight = %ws.weight, "adding {p0}[+1] {p1}[-1]");
            let key0 = self.props.key(p0, BlockSign::Plus, self.parity, b);
            let key1 = self.props.key(p1, BlockSign::Minus, self.parity, b);
            add_weighted_block(&mut block0, ws.weight, lookup(ws, b, key0)?)?;
            add_weighted_block(&mut block1, ws.weight, lookup(ws, b, key1)?)?;
        }
        summary.timings.blocks += started.elapsed();
        Ok((block0, block1))
    }

    /// Local contractions of one local pass; returns the single-proton
    /// correlator when requested.
    fn local_stage(
        &self,
        stage: Stage,
        correlators: &mut CorrelatorMap,
        summary: &mut RunSummary,
    ) -> Result<Option<LatticeField<Complex64>>> {
        let mut proton = None;
        for (p0, p1) in stage.block_pairs() {
            info!(parity = %self.parity, "{p0}[+1] {p1}[-1] local contractions");
            let (block0, block1) = self.accumulate_pair(p0, p1, summary)?;
            let started = Instant::now();
            if self.options.compute_proton && proton.is_none() {
                proton = Some(one_proton(&block0)?);
            }
            for channel in Channel::LOCAL {
                let key = CorrelatorKey::local(channel);
                let tensor = self.topologies.get(channel)?.tensor(Mode::LOCAL)?;
                contract_local(correlators.entry(key), &block0, &block1, tensor)?;
                summary.count(self.parity, key);
            }
            summary.timings.local += started.elapsed();
        }
        Ok(proton)
    }

    /// The base pair and the 3x3 mixed grid, summed into the displaced
    /// channels.
    fn nonlocal_stage(&self, correlators: &mut CorrelatorMap, summary: &mut RunSummary) -> Result<()> {
        info!(parity = %self.parity, "non-local contractions");
        for (p0, p1) in Stage::NonLocal.block_pairs() {
            let (block0, block1) = self.accumulate_pair(p0, p1, summary)?;
            let started = Instant::now();
            let mut pair = DisplacedContraction::new(&block0, &block1, self.phases, self.fft);
            for channel in Channel::DISPLACED {
                let topology = self.topologies.get(channel)?;
                let key = CorrelatorKey::displaced(channel);
                let mode = pair_mode(channel, p0, p1);
                let acc = correlators.entry(key);
                if is_base_pair(p0, p1) {
                    let sign = topology.fourier_sign(mode)?;
                    debug!(%channel, %mode, sign = sign.value(), "fourier sign");
                    pair.contract(acc, topology.tensor(mode)?, sign, false)?;
                } else {
                    let outcome = pair.contract_mode(acc, topology, mode, channel.family.swap_policy())?;
                    debug!(%channel, %mode, ?outcome, "mixed contraction");
                }
                summary.count(self.parity, key);
            }
            summary.timings.nonlocal += started.elapsed();
        }
        Ok(())
    }
}

fn lookup<'a>(ws: &WeightedSource<'a>, b: usize, key: BlockKey) -> Result<&'a BaryonBlock> {
    let map = ws.source.map;
    match map.get(&key) {
        Some(block) => Ok(block),
        None => Err(ContractError::MissingBlocks(vec![MissingBlock {
            block: b,
            source: ws.source.name.to_string(),
            key,
        }])),
    }
}
