//! Execution-engine boundary and trajectory extraction
//!
//! The engine that actually runs an agent graph is an external collaborator.
//! This module defines the read-only contract it must satisfy — an ordered,
//! queryable checkpoint history per thread — and the extractor that folds
//! such a history into a canonical [`GraphTrajectory`](crate::GraphTrajectory).

pub mod extract;
pub mod history;
