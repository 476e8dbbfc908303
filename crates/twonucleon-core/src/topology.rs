//! Channel topologies: per displacement mode, a sparse contraction tensor and
//! a Fourier sign.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::block::{BlockIndex, SiteBlock};
use crate::error::{ContractError, Result};
use crate::flavor::QuarkPattern;
use crate::spin::{HalfSpinMatrix, SpinState};

/// Two-nucleon flavour family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// Proton-proton.
    PP,
    /// Proton-neutron.
    PN,
}

impl Family {
    pub fn label(self) -> &'static str {
        match self {
            Family::PP => "PP",
            Family::PN => "PN",
        }
    }

    /// How degenerate modes are contracted for this family.
    pub fn swap_policy(self) -> SwapPolicy {
        match self {
            Family::PP => SwapPolicy::Never,
            Family::PN => SwapPolicy::SwapOnZeroSign,
        }
    }

    /// Mode of the unmixed `000`/`111` displaced contraction.
    pub fn base_mode(self) -> Mode {
        match self {
            Family::PP => Mode::new(QuarkPattern::ORIGIN, QuarkPattern::DISPLACED),
            Family::PN => Mode::new(QuarkPattern::DISPLACED, QuarkPattern::ORIGIN),
        }
    }
}

/// Operand order rule for modes whose Fourier sign is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapPolicy {
    /// Always contract `(B0, B1)` through the mode as given.
    Never,
    /// If the mode's sign is zero, contract `(B1, B0)` through the swapped
    /// mode instead.
    SwapOnZeroSign,
}

/// A two-nucleon channel such as `PP_SING0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel {
    pub family: Family,
    pub spin: SpinState,
}

impl Channel {
    pub const fn new(family: Family, spin: SpinState) -> Self {
        Self { family, spin }
    }

    /// The eight channels with displaced contributions.
    pub const DISPLACED: [Channel; 8] = [
        Channel::new(Family::PP, SpinState::Sing0),
        Channel::new(Family::PP, SpinState::TripP),
        Channel::new(Family::PP, SpinState::Trip0),
        Channel::new(Family::PP, SpinState::TripM),
        Channel::new(Family::PN, SpinState::Sing0),
        Channel::new(Family::PN, SpinState::TripP),
        Channel::new(Family::PN, SpinState::Trip0),
        Channel::new(Family::PN, SpinState::TripM),
    ];

    /// The channels computed at coincident source positions.
    pub const LOCAL: [Channel; 4] = [
        Channel::new(Family::PP, SpinState::Sing0),
        Channel::new(Family::PN, SpinState::TripP),
        Channel::new(Family::PN, SpinState::Trip0),
        Channel::new(Family::PN, SpinState::TripM),
    ];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.family.label(), self.spin)
    }
}

impl FromStr for Channel {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        let (family, spin) = s
            .split_once('_')
            .ok_or_else(|| ContractError::parse("channel", s))?;
        let family = match family {
            "PP" => Family::PP,
            "PN" => Family::PN,
            _ => return Err(ContractError::parse("channel", s)),
        };
        let spin = spin
            .parse()
            .map_err(|_| ContractError::parse("channel", s))?;
        Ok(Self { family, spin })
    }
}

/// Displacement mode `"<source pattern>|<sink pattern>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mode {
    pub source: QuarkPattern,
    pub sink: QuarkPattern,
}

impl Mode {
    /// Mode of local contractions, `000|000`.
    pub const LOCAL: Mode = Mode {
        source: QuarkPattern::ORIGIN,
        sink: QuarkPattern::ORIGIN,
    };

    pub const fn new(source: QuarkPattern, sink: QuarkPattern) -> Self {
        Self { source, sink }
    }

    /// Source and sink patterns exchanged.
    pub fn swapped(self) -> Self {
        Self {
            source: self.sink,
            sink: self.source,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.source, self.sink)
    }
}

impl FromStr for Mode {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        let (source, sink) = s
            .split_once('|')
            .ok_or_else(|| ContractError::parse("mode", s))?;
        Ok(Self {
            source: source.parse()?,
            sink: sink.parse()?,
        })
    }
}

/// Direction of the spatial Fourier transform of a displaced mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FourierSign {
    Negative,
    Zero,
    Positive,
}

impl FourierSign {
    pub fn from_i32(sign: i32) -> Option<Self> {
        match sign {
            -1 => Some(FourierSign::Negative),
            0 => Some(FourierSign::Zero),
            1 => Some(FourierSign::Positive),
            _ => None,
        }
    }

    pub fn value(self) -> i32 {
        match self {
            FourierSign::Negative => -1,
            FourierSign::Zero => 0,
            FourierSign::Positive => 1,
        }
    }

    pub fn is_zero(self) -> bool {
        self == FourierSign::Zero
    }

    pub fn flipped(self) -> Self {
        match self {
            FourierSign::Negative => FourierSign::Positive,
            FourierSign::Zero => FourierSign::Zero,
            FourierSign::Positive => FourierSign::Negative,
        }
    }
}

/// Behaviour of a channel under exchange of the two baryons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symmetry {
    Symmetric,
    Antisymmetric,
}

impl Symmetry {
    /// `+1` or `-1`.
    pub fn factor(self) -> f64 {
        match self {
            Symmetry::Symmetric => 1.0,
            Symmetry::Antisymmetric => -1.0,
        }
    }
}

/// One non-zero entry of a contraction tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractionTerm {
    /// Half-spin output position `(s1, s2)`.
    pub out: (usize, usize),
    pub left: BlockIndex,
    pub right: BlockIndex,
    pub coefficient: Complex64,
}

/// Sparse contraction tensor of one channel and mode.
///
/// Contracting blocks `B0`, `B1` on a site gives
/// `C[s1][s2] = Σ coefficient · B0[left] · B1[right]` over the terms with
/// `out == (s1, s2)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractionTensor {
    terms: Vec<ContractionTerm>,
}

impl ContractionTensor {
    pub fn new(terms: Vec<ContractionTerm>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[ContractionTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Contract two site blocks into a half-spin matrix.
    pub fn contract_site(&self, left: &SiteBlock, right: &SiteBlock) -> HalfSpinMatrix {
        let mut out = HalfSpinMatrix::zero();
        for term in &self.terms {
            let (s1, s2) = term.out;
            out.0[s1][s2] += term.coefficient * left[term.left] * right[term.right];
        }
        out
    }
}

/// Tensor and Fourier sign of one mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeEntry {
    pub tensor: ContractionTensor,
    pub sign: FourierSign,
}

/// All modes of one channel, plus its exchange symmetry.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    channel: Channel,
    symmetry: Symmetry,
    modes: HashMap<Mode, ModeEntry>,
}

impl Topology {
    pub fn new(channel: Channel, symmetry: Symmetry) -> Self {
        Self {
            channel,
            symmetry,
            modes: HashMap::new(),
        }
    }

    /// Builder-style [`insert_mode`](Self::insert_mode).
    pub fn with_mode(mut self, mode: Mode, tensor: ContractionTensor, sign: FourierSign) -> Self {
        self.insert_mode(mode, tensor, sign);
        self
    }

    pub fn insert_mode(&mut self, mode: Mode, tensor: ContractionTensor, sign: FourierSign) {
        self.modes.insert(mode, ModeEntry { tensor, sign });
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    pub fn mode(&self, mode: Mode) -> Result<&ModeEntry> {
        self.modes.get(&mode).ok_or(ContractError::MissingMode {
            channel: self.channel,
            mode,
        })
    }

    pub fn tensor(&self, mode: Mode) -> Result<&ContractionTensor> {
        Ok(&self.mode(mode)?.tensor)
    }

    pub fn fourier_sign(&self, mode: Mode) -> Result<FourierSign> {
        Ok(self.mode(mode)?.sign)
    }
}

/// Topologies of every loaded channel. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct TopologyRegistry {
    topologies: BTreeMap<Channel, Topology>,
}

impl TopologyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a topology, replacing any previous one of the same channel.
    pub fn insert(&mut self, topology: Topology) {
        self.topologies.insert(topology.channel(), topology);
    }

    pub fn with(mut self, topology: Topology) -> Self {
        self.insert(topology);
        self
    }

    pub fn get(&self, channel: Channel) -> Result<&Topology> {
        self.topologies
            .get(&channel)
            .ok_or(ContractError::MissingTopology(channel))
    }

    pub fn len(&self) -> usize {
        self.topologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topologies.is_empty()
    }
}
