//! Which contraction passes run, and which block pairs each pass reads.

use tracing::warn;

use crate::flavor::QuarkPattern;

/// Flags selecting the contraction passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractionOptions {
    pub compute_locals: bool,
    pub compute_loc_o: bool,
    pub compute_proton: bool,
}

impl Default for ContractionOptions {
    fn default() -> Self {
        Self {
            compute_locals: true,
            compute_loc_o: true,
            compute_proton: true,
        }
    }
}

/// One contraction pass of a (boost, parity) iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Both baryons at the origin: `000[+1]`, `000[-1]`.
    LocalOrigin,
    /// Both baryons at the displaced position: `111[+1]`, `111[-1]`.
    LocalDisplaced,
    /// Baryons at different positions: the base `000|111` pair and the
    /// 3x3 grid of mixed patterns.
    NonLocal,
}

impl Stage {
    /// `(source pattern, sink pattern)` of every block pair of the pass, in
    /// contraction order. The source block has sign `+1`, the sink block
    /// `-1`.
    pub fn block_pairs(self) -> Vec<(QuarkPattern, QuarkPattern)> {
        match self {
            Stage::LocalOrigin => vec![(QuarkPattern::ORIGIN, QuarkPattern::ORIGIN)],
            Stage::LocalDisplaced => vec![(QuarkPattern::DISPLACED, QuarkPattern::DISPLACED)],
            Stage::NonLocal => {
                let mut pairs = vec![(QuarkPattern::ORIGIN, QuarkPattern::DISPLACED)];
                for p0 in QuarkPattern::SOURCE_MIXED {
                    for p1 in QuarkPattern::SINK_MIXED {
                        pairs.push((p0, p1));
                    }
                }
                pairs
            }
        }
    }

    pub fn is_local(self) -> bool {
        !matches!(self, Stage::NonLocal)
    }
}

/// Ordered list of the passes a run performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractionPlan {
    options: ContractionOptions,
    stages: Vec<Stage>,
}

impl ContractionPlan {
    /// Passes for the given options.
    ///
    /// With identical source and sink propagators exactly one local pass runs,
    /// whatever `compute_loc_o` says: both positions coincide, so the origin
    /// and displaced passes would read the same blocks, and the non-local pass
    /// has no separation to project. Such a plan is empty only when locals
    /// are disabled.
    pub fn new(options: ContractionOptions, local_only: bool) -> Self {
        let mut stages = Vec::new();
        if options.compute_locals && (options.compute_loc_o || local_only) {
            stages.push(Stage::LocalOrigin);
        }
        if !local_only {
            if options.compute_locals {
                stages.push(Stage::LocalDisplaced);
            }
            stages.push(Stage::NonLocal);
        }
        if stages.is_empty() {
            warn!("no contraction pass selected: locals disabled and prop0 == prop1");
        }
        Self { options, stages }
    }

    pub fn options(&self) -> ContractionOptions {
        self.options
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

}
