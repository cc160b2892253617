//! Trajectory comparison modes
//!
//! Four boolean-valued comparisons between a candidate trajectory and a
//! reference trajectory. None of them award partial credit: a pair either
//! matches under a mode or it does not.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EvalError, EvalResult};
use crate::trajectory::GraphTrajectory;

/// How a candidate trajectory is compared against a reference.
///
/// Modes are resolved from their string names once, at evaluator
/// construction; an unrecognized name is rejected immediately rather than
/// deferred to call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Exact ordered equality: same number of turns, and every turn matches
    /// the reference element by element, including duplicates and position
    Strict,

    /// Flattened multiset equality: turn boundaries and intra-step order are
    /// ignored; only total per-identifier counts matter
    Unordered,

    /// The candidate's node-count profile must not exceed the reference's,
    /// identifier by identifier
    Subset,

    /// The candidate's node-count profile must cover at least the
    /// reference's, identifier by identifier
    Superset,
}

impl MatchMode {
    /// All recognized modes, in documentation order
    pub const ALL: [MatchMode; 4] = [
        MatchMode::Strict,
        MatchMode::Unordered,
        MatchMode::Subset,
        MatchMode::Superset,
    ];

    /// The lower-case mode name
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Strict => "strict",
            MatchMode::Unordered => "unordered",
            MatchMode::Subset => "subset",
            MatchMode::Superset => "superset",
        }
    }

    /// Feedback key for results produced under this mode,
    /// e.g. `graph_trajectory_strict_match`
    pub fn feedback_key(&self) -> String {
        format!("graph_trajectory_{}_match", self.as_str())
    }

    /// Compare a candidate trajectory against a reference under this mode.
    ///
    /// Pure and total: always completes in time proportional to trajectory
    /// size, holds no state, and is safe to call concurrently.
    pub fn score(&self, outputs: &GraphTrajectory, reference: &GraphTrajectory) -> bool {
        match self {
            MatchMode::Strict => outputs.steps == reference.steps,
            MatchMode::Unordered => outputs.has_same_node_counts(reference),
            MatchMode::Subset => reference.is_superset_of(outputs),
            MatchMode::Superset => outputs.is_superset_of(reference),
        }
    }
}

impl FromStr for MatchMode {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(MatchMode::Strict),
            "unordered" => Ok(MatchMode::Unordered),
            "subset" => Ok(MatchMode::Subset),
            "superset" => Ok(MatchMode::Superset),
            other => Err(EvalError::InvalidMatchMode(other.to_string())),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare two optionally-present trajectories under the given mode.
///
/// Absence and emptiness are distinct: a `None` on either side is a
/// [`EvalError::MissingInput`] failure, while two empty trajectories compare
/// true under every mode.
pub fn score_trajectories(
    mode: MatchMode,
    outputs: Option<&GraphTrajectory>,
    reference_outputs: Option<&GraphTrajectory>,
) -> EvalResult<bool> {
    match (outputs, reference_outputs) {
        (Some(outputs), Some(reference)) => Ok(mode.score(outputs, reference)),
        _ => Err(EvalError::MissingInput),
    }
}
