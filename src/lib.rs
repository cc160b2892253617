//! trajectory-evals - Graph Trajectory Evaluation for Agent Workflows
//!
//! A Rust library for regression-testing agent behavior by comparing the
//! path an agent actually took through its computation graph against a
//! reference path. Exact step-by-step reproduction is often too strict for
//! LLM-driven routing, so comparisons can also be made over the multiset of
//! visited nodes.
//!
//! # Features
//!
//! - Canonical `GraphTrajectory` representation (per-turn steps + results)
//! - Trajectory extraction from checkpointed execution histories, including
//!   nested subgraphs, parallel fan-out, and interrupt/resume boundaries
//! - Four match modes: strict, unordered, subset, superset
//! - Evaluator wrappers with identical sync and async behavior
//! - Pluggable feedback sinks for experiment tracking
//!
//! # Quick Start
//!
//! ```rust
//! use trajectory_evals::{create_graph_trajectory_match_evaluator, GraphTrajectory};
//!
//! let evaluator = create_graph_trajectory_match_evaluator("unordered")?;
//!
//! let outputs = GraphTrajectory::from_steps(vec![
//!     vec!["__start__".into(), "agent".into(), "tools".into()],
//!     vec!["agent".into()],
//! ]);
//! let reference = GraphTrajectory::from_steps(vec![
//!     vec!["__start__".into(), "tools".into(), "agent".into()],
//!     vec!["agent".into()],
//! ]);
//!
//! let result = evaluator.evaluate(Some(&outputs), Some(&reference))?;
//! assert_eq!(result.key, "graph_trajectory_unordered_match");
//! assert!(result.score.is_truthy());
//! # Ok::<(), trajectory_evals::EvalError>(())
//! ```

pub mod engine;
pub mod evaluator;
pub mod trajectory;
mod error;

// Re-exports
pub use engine::extract::{
    extract_trajectory_from_thread, extract_trajectory_from_thread_async, ExtractedTrajectory,
};
pub use engine::history::{
    AsyncHistorySource, HistorySource, MemoryHistorySource, TaskRecord, ThreadCheckpoint,
};
pub use evaluator::{
    create_graph_trajectory_match_evaluator, EvaluatorResult, FeedbackSink,
    GraphTrajectoryMatchEvaluator, MemorySink, Score, TrajectoryJudge,
};
pub use trajectory::matchers::{score_trajectories, MatchMode};
pub use trajectory::GraphTrajectory;
pub use error::{EvalError, EvalResult};

/// Special constant for the END node
pub const END: &str = "__end__";

/// Special constant for the START node
pub const START: &str = "__start__";

/// Special constant marking a suspended step awaiting external input
pub const INTERRUPT: &str = "__interrupt__";

/// Marker recorded as the turn input when a suspended thread is resumed
pub const RESUMING: &str = "__resuming__";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        create_graph_trajectory_match_evaluator, extract_trajectory_from_thread,
        extract_trajectory_from_thread_async, score_trajectories, AsyncHistorySource, EvalError,
        EvalResult, EvaluatorResult, ExtractedTrajectory, FeedbackSink, GraphTrajectory,
        GraphTrajectoryMatchEvaluator, HistorySource, MatchMode, MemoryHistorySource, MemorySink,
        Score, TaskRecord, ThreadCheckpoint, TrajectoryJudge, END, INTERRUPT, RESUMING, START,
    };
}
