//! Evaluator wrappers for trajectory matching
//!
//! Adapts a [`MatchMode`] into a uniform callable contract producing a
//! standardized result record, with synchronous and asynchronous variants
//! that score identically. Also defines the interfaces for the two optional
//! collaborators: a feedback sink for experiment tracking and an external
//! judge for qualitative (LLM-based) scoring.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

use crate::error::{EvalError, EvalResult};
use crate::trajectory::matchers::{score_trajectories, MatchMode};
use crate::trajectory::GraphTrajectory;

/// Score carried by an evaluator result: boolean for the match modes,
/// fractional for judge-based evaluators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    /// Pass/fail outcome
    Bool(bool),
    /// Fractional outcome in `[0.0, 1.0]`
    Number(f64),
}

impl Score {
    /// Whether the score counts as a pass
    pub fn is_truthy(&self) -> bool {
        match self {
            Score::Bool(b) => *b,
            Score::Number(n) => *n > 0.0,
        }
    }

    /// Numeric view of the score (`true` = 1.0, `false` = 0.0)
    pub fn as_f64(&self) -> f64 {
        match self {
            Score::Bool(true) => 1.0,
            Score::Bool(false) => 0.0,
            Score::Number(n) => *n,
        }
    }
}

impl From<bool> for Score {
    fn from(b: bool) -> Self {
        Score::Bool(b)
    }
}

impl From<f64> for Score {
    fn from(n: f64) -> Self {
        Score::Number(n)
    }
}

/// Standardized result record produced by every evaluator.
///
/// The wire shape is stable:
///
/// ```json
/// { "key": "graph_trajectory_strict_match", "score": true,
///   "comment": null, "metadata": null }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorResult {
    /// Name of the check, e.g. `graph_trajectory_strict_match`
    pub key: String,

    /// The score
    pub score: Score,

    /// Free-form commentary; unused by match modes, reserved for judges
    #[serde(default)]
    pub comment: Option<String>,

    /// Auxiliary data; unused by match modes
    #[serde(default)]
    pub metadata: Option<JsonValue>,
}

impl EvaluatorResult {
    /// Create a result with no comment or metadata
    pub fn new(key: impl Into<String>, score: impl Into<Score>) -> Self {
        Self {
            key: key.into(),
            score: score.into(),
            comment: None,
            metadata: None,
        }
    }

    /// Attach a comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Sink receiving finished evaluator results, e.g. an experiment tracker.
///
/// Sink failures must never affect the returned score; the evaluator logs
/// them and moves on.
pub trait FeedbackSink: Send + Sync {
    /// Record a result under the given run name. `extra` is the caller's
    /// auxiliary parameter bag, passed through untouched.
    fn record(&self, run_name: &str, result: &EvaluatorResult, extra: &JsonValue)
        -> EvalResult<()>;
}

/// In-memory sink for tests
pub struct MemorySink {
    records: parking_lot::RwLock<Vec<(String, EvaluatorResult, JsonValue)>>,
    failing: bool,
}

impl MemorySink {
    /// Create a sink that records every result
    pub fn new() -> Self {
        Self {
            records: parking_lot::RwLock::new(Vec::new()),
            failing: false,
        }
    }

    /// Create a sink whose every `record` call fails, for exercising sink
    /// failure isolation
    pub fn failing() -> Self {
        Self {
            records: parking_lot::RwLock::new(Vec::new()),
            failing: true,
        }
    }

    /// Recorded `(run_name, result, extra)` entries, in arrival order
    pub fn records(&self) -> Vec<(String, EvaluatorResult, JsonValue)> {
        self.records.read().clone()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackSink for MemorySink {
    fn record(
        &self,
        run_name: &str,
        result: &EvaluatorResult,
        extra: &JsonValue,
    ) -> EvalResult<()> {
        if self.failing {
            return Err(EvalError::Serialization("sink unavailable".to_string()));
        }
        self.records
            .write()
            .push((run_name.to_string(), result.clone(), extra.clone()));
        Ok(())
    }
}

/// External judge collaborator scoring a trajectory qualitatively (e.g. via
/// a language model). Interface only; no implementation ships with this
/// crate.
pub trait TrajectoryJudge: Send + Sync {
    /// Judge a candidate trajectory, optionally against a reference
    fn judge(
        &self,
        outputs: &GraphTrajectory,
        reference_outputs: Option<&GraphTrajectory>,
    ) -> impl Future<Output = EvalResult<EvaluatorResult>> + Send;
}

/// Evaluator comparing candidate trajectories against references under one
/// match mode.
///
/// Construction resolves the mode once; an unrecognized mode name fails
/// immediately and no evaluator value is ever created. The evaluator itself
/// is stateless apart from its configuration and safe to share across
/// threads.
#[derive(Clone)]
pub struct GraphTrajectoryMatchEvaluator {
    mode: MatchMode,
    key: String,
    sink: Option<Arc<dyn FeedbackSink>>,
}

impl GraphTrajectoryMatchEvaluator {
    /// Create an evaluator from a mode name
    ///
    /// # Errors
    ///
    /// [`EvalError::InvalidMatchMode`] for anything but `strict`,
    /// `unordered`, `subset`, or `superset`.
    pub fn new(mode: &str) -> EvalResult<Self> {
        Ok(Self::for_mode(mode.parse()?))
    }

    /// Create an evaluator from an already-typed mode
    pub fn for_mode(mode: MatchMode) -> Self {
        Self {
            mode,
            key: mode.feedback_key(),
            sink: None,
        }
    }

    /// Attach a feedback sink receiving every result
    pub fn with_sink(mut self, sink: Arc<dyn FeedbackSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The configured mode
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// The feedback key results are reported under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Compare a candidate trajectory against a reference.
    ///
    /// `None` on either side is a [`EvalError::MissingInput`] failure;
    /// absence and emptiness are distinct conditions.
    pub fn evaluate(
        &self,
        outputs: Option<&GraphTrajectory>,
        reference_outputs: Option<&GraphTrajectory>,
    ) -> EvalResult<EvaluatorResult> {
        self.evaluate_with(outputs, reference_outputs, &JsonValue::Null)
    }

    /// [`evaluate`](Self::evaluate) with an auxiliary parameter bag passed
    /// through untouched to the feedback sink
    pub fn evaluate_with(
        &self,
        outputs: Option<&GraphTrajectory>,
        reference_outputs: Option<&GraphTrajectory>,
        extra: &JsonValue,
    ) -> EvalResult<EvaluatorResult> {
        let matched = score_trajectories(self.mode, outputs, reference_outputs)?;
        let result = EvaluatorResult::new(self.key.clone(), matched);
        self.deliver(&result, extra);
        Ok(result)
    }

    /// Async variant of [`evaluate`](Self::evaluate); scoring behavior is
    /// identical for identical inputs
    pub async fn evaluate_async(
        &self,
        outputs: Option<&GraphTrajectory>,
        reference_outputs: Option<&GraphTrajectory>,
    ) -> EvalResult<EvaluatorResult> {
        // The comparison itself never suspends; this awaits nothing beyond
        // what the sync path computes.
        self.evaluate_with(outputs, reference_outputs, &JsonValue::Null)
    }

    /// Async variant of [`evaluate_with`](Self::evaluate_with)
    pub async fn evaluate_with_async(
        &self,
        outputs: Option<&GraphTrajectory>,
        reference_outputs: Option<&GraphTrajectory>,
        extra: &JsonValue,
    ) -> EvalResult<EvaluatorResult> {
        self.evaluate_with(outputs, reference_outputs, extra)
    }

    /// Hand a result to the sink, if any. Sink failures are logged and
    /// swallowed; the score has already been decided.
    fn deliver(&self, result: &EvaluatorResult, extra: &JsonValue) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.record(&self.key, result, extra) {
                warn!(key = %self.key, error = %e, "feedback sink failed");
            }
        }
    }
}

impl std::fmt::Debug for GraphTrajectoryMatchEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphTrajectoryMatchEvaluator")
            .field("mode", &self.mode)
            .field("key", &self.key)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

/// Create a trajectory match evaluator for the given mode name.
///
/// # Example
///
/// ```rust
/// use trajectory_evals::{create_graph_trajectory_match_evaluator, GraphTrajectory};
///
/// let evaluator = create_graph_trajectory_match_evaluator("strict")?;
/// let t = GraphTrajectory::from_steps(vec![vec!["__start__".into(), "agent".into()]]);
///
/// let result = evaluator.evaluate(Some(&t), Some(&t))?;
/// assert_eq!(result.key, "graph_trajectory_strict_match");
/// assert!(result.score.is_truthy());
/// # Ok::<(), trajectory_evals::EvalError>(())
/// ```
pub fn create_graph_trajectory_match_evaluator(
    mode: &str,
) -> EvalResult<GraphTrajectoryMatchEvaluator> {
    GraphTrajectoryMatchEvaluator::new(mode)
}
