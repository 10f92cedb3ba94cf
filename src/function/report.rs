//! # Run Report
//!
//! Structured outcome of one invocation. The orchestrator does not log; the
//! caller turns this report into log events and metrics.

use crate::discovery::{MatchOutcome, Note, ResourceKind};
use crate::error::{ErrorKind, FunctionError, Stage};

/// What happened in one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage ran to completion
    Completed,
    /// The stage was not run
    Skipped { reason: &'static str },
    /// A discovery stage finished with a match result
    Discovered {
        resource: ResourceKind,
        outcome: MatchOutcome,
        /// Candidates returned by the listing
        listed: usize,
        /// Candidates that matched
        matched: usize,
    },
    /// The stage failed and ended the run
    Failed { kind: ErrorKind },
}

/// One entry per stage visited, in execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub outcome: StageOutcome,
}

/// A value written to the desired composite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPatch {
    pub stage: Stage,
    pub path: String,
}

/// Everything observed during one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub stages: Vec<StageReport>,
    /// Recovered per-candidate failures
    pub notes: Vec<Note>,
    /// Field paths written, only populated once the run succeeded
    pub patches: Vec<AppliedPatch>,
}

impl RunReport {
    pub(crate) fn record(&mut self, stage: Stage, outcome: StageOutcome) {
        self.stages.push(StageReport { stage, outcome });
    }

    /// Outcome of `stage`, if it was visited
    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|report| report.stage == stage)
            .map(|report| &report.outcome)
    }

    /// Discovery results as `(resource, outcome)` pairs
    pub fn discoveries(&self) -> impl Iterator<Item = (ResourceKind, MatchOutcome)> + '_ {
        self.stages.iter().filter_map(|report| match report.outcome {
            StageOutcome::Discovered {
                resource, outcome, ..
            } => Some((resource, outcome)),
            _ => None,
        })
    }
}

/// A failed run: the fatal error and the report up to the failure
#[derive(Debug)]
pub struct RunFailure {
    pub error: FunctionError,
    pub report: RunReport,
}
