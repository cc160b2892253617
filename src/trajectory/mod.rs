//! Canonical trajectory representation
//!
//! A [`GraphTrajectory`] records which nodes an agent executed, grouped into
//! ordered turns. One turn spans a single top-level invocation of the agent:
//! from start (or resume) to the next interrupt or completion. Within a turn,
//! node identifiers appear in execution order; identifiers may repeat, and
//! multiplicity is meaningful.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

pub mod matchers;

/// Canonical record of an agent's path through its computation graph.
///
/// The wire shape is stable and intended for assertion in test suites:
///
/// ```json
/// { "results": [ {...}, ... ], "steps": [ ["__start__", "agent"], ... ] }
/// ```
///
/// `steps` holds one entry per turn, each an ordered list of node
/// identifiers. `results` holds one opaque state snapshot per turn; it is
/// carried for downstream consumers and never interpreted by the matchers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphTrajectory {
    /// Per-turn output snapshots, in turn order
    #[serde(default)]
    pub results: Vec<JsonValue>,

    /// Per-turn node identifier sequences, in turn order
    #[serde(default)]
    pub steps: Vec<Vec<String>>,
}

impl GraphTrajectory {
    /// Create a trajectory from per-turn results and steps
    pub fn new(results: Vec<JsonValue>, steps: Vec<Vec<String>>) -> Self {
        Self { results, steps }
    }

    /// Create a trajectory with steps only (empty results)
    pub fn from_steps(steps: Vec<Vec<String>>) -> Self {
        Self {
            results: Vec::new(),
            steps,
        }
    }

    /// Total number of node occurrences across all turns
    pub fn node_count(&self) -> usize {
        self.steps.iter().map(Vec::len).sum()
    }

    /// Number of turns
    pub fn turn_count(&self) -> usize {
        self.steps.len()
    }

    /// Flatten all steps into per-identifier occurrence counts.
    ///
    /// Turn boundaries and intra-step order are discarded; only how many
    /// times each identifier fired survives. This multiset view backs the
    /// unordered, subset, and superset match modes.
    pub fn node_counts(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for step in &self.steps {
            for node in step {
                *counts.entry(node.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Whether this trajectory's node-count profile covers `other`'s.
    ///
    /// True iff every identifier in `other` occurs here at least as many
    /// times. Identifiers present here but absent from `other` impose no
    /// constraint. Namespace prefixes are opaque: `"inner:agent"` and
    /// `"agent"` are distinct identifiers.
    pub fn is_superset_of(&self, other: &GraphTrajectory) -> bool {
        let ours = self.node_counts();
        other
            .node_counts()
            .iter()
            .all(|(node, count)| ours.get(node).is_some_and(|c| c >= count))
    }

    /// Whether both trajectories flatten to the same multiset of identifiers
    pub fn has_same_node_counts(&self, other: &GraphTrajectory) -> bool {
        self.is_superset_of(other) && other.is_superset_of(self)
    }
}
