//! Checkpoint history records and history sources
//!
//! Provides:
//! - Checkpoint and task records as reported by the execution engine
//! - Blocking and suspension-capable source traits
//! - In-memory source for tests and fixtures
//!
//! The engine's reported ordering is authoritative: checkpoints arrive oldest
//! first, tasks within a checkpoint in call order (parallel tasks in the
//! order the engine chose for display). Sources never re-sort.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::future::Future;
use uuid::Uuid;

use crate::error::{EvalError, EvalResult};

/// One task executed by the engine between two checkpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Node name as declared in the graph
    pub name: String,

    /// True when the task is itself a nested graph; its own checkpoints are
    /// recorded under the namespace path extended by this task's name
    #[serde(default)]
    pub subgraph: bool,
}

impl TaskRecord {
    /// Create a plain task record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subgraph: false,
        }
    }

    /// Create a task record for a nested-graph task
    pub fn subgraph(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subgraph: true,
        }
    }
}

/// A checkpoint recorded by the execution engine for one thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadCheckpoint {
    /// Unique checkpoint ID
    pub id: String,

    /// Timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Tasks that ran since the previous checkpoint, in engine call order
    pub tasks: Vec<TaskRecord>,

    /// Whether an interrupt was raised at this checkpoint, suspending the
    /// thread until an external resume
    #[serde(default)]
    pub suspended: bool,

    /// State snapshot at this checkpoint, when the engine recorded one
    #[serde(default)]
    pub snapshot: Option<JsonValue>,

    /// External input that produced this checkpoint, present on
    /// turn-opening checkpoints
    #[serde(default)]
    pub input: Option<JsonValue>,
}

impl ThreadCheckpoint {
    /// Create a checkpoint with the given tasks
    pub fn new(tasks: Vec<TaskRecord>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now(),
            tasks,
            suspended: false,
            snapshot: None,
            input: None,
        }
    }

    /// Mark this checkpoint as suspended on an interrupt
    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    /// Attach a state snapshot
    pub fn with_snapshot(mut self, snapshot: JsonValue) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Attach the external input that produced this checkpoint
    pub fn with_input(mut self, input: JsonValue) -> Self {
        self.input = Some(input);
        self
    }
}

/// Read-only access to a thread's checkpoint history.
///
/// `namespace` addresses nested subgraphs: the empty path is the top-level
/// graph, `["inner"]` the history of the subgraph entered through the
/// top-level task `inner`, and so on for deeper nesting.
pub trait HistorySource: Send + Sync {
    /// Ordered history, oldest first, for `thread` at `namespace`
    fn checkpoints(&self, thread: &str, namespace: &[String]) -> EvalResult<Vec<ThreadCheckpoint>>;
}

/// Suspension-capable variant of [`HistorySource`] for cooperative
/// concurrency environments. The contract is identical; only the fetch may
/// suspend.
pub trait AsyncHistorySource: Send + Sync {
    /// Ordered history, oldest first, for `thread` at `namespace`
    fn checkpoints(
        &self,
        thread: &str,
        namespace: &[String],
    ) -> impl Future<Output = EvalResult<Vec<ThreadCheckpoint>>> + Send;
}

/// In-memory history source for tests and fixtures
pub struct MemoryHistorySource {
    threads: parking_lot::RwLock<HashMap<String, HashMap<Vec<String>, Vec<ThreadCheckpoint>>>>,
}

impl MemoryHistorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self {
            threads: parking_lot::RwLock::new(HashMap::new()),
        }
    }

    /// Record a thread's top-level history
    pub fn insert_thread(&self, thread: impl Into<String>, checkpoints: Vec<ThreadCheckpoint>) {
        self.threads
            .write()
            .entry(thread.into())
            .or_default()
            .insert(Vec::new(), checkpoints);
    }

    /// Record the history of a subgraph namespace within a thread
    pub fn insert_subgraph(
        &self,
        thread: impl Into<String>,
        namespace: &[&str],
        checkpoints: Vec<ThreadCheckpoint>,
    ) {
        let path: Vec<String> = namespace.iter().map(|s| s.to_string()).collect();
        self.threads
            .write()
            .entry(thread.into())
            .or_default()
            .insert(path, checkpoints);
    }

    /// Builder-style [`insert_thread`](Self::insert_thread)
    pub fn with_thread(
        self,
        thread: impl Into<String>,
        checkpoints: Vec<ThreadCheckpoint>,
    ) -> Self {
        self.insert_thread(thread, checkpoints);
        self
    }

    /// Builder-style [`insert_subgraph`](Self::insert_subgraph)
    pub fn with_subgraph(
        self,
        thread: impl Into<String>,
        namespace: &[&str],
        checkpoints: Vec<ThreadCheckpoint>,
    ) -> Self {
        self.insert_subgraph(thread, namespace, checkpoints);
        self
    }
}

impl Default for MemoryHistorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl HistorySource for MemoryHistorySource {
    fn checkpoints(&self, thread: &str, namespace: &[String]) -> EvalResult<Vec<ThreadCheckpoint>> {
        let threads = self.threads.read();
        let entries = threads
            .get(thread)
            .ok_or_else(|| EvalError::ThreadNotFound(thread.to_string()))?;

        // Unrecorded namespaces yield an empty history; the extractor decides
        // whether that is an error for the namespace in question.
        Ok(entries.get(namespace).cloned().unwrap_or_default())
    }
}

impl AsyncHistorySource for MemoryHistorySource {
    fn checkpoints(
        &self,
        thread: &str,
        namespace: &[String],
    ) -> impl Future<Output = EvalResult<Vec<ThreadCheckpoint>>> + Send {
        let result = HistorySource::checkpoints(self, thread, namespace);
        async move { result }
    }
}
