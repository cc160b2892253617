//! Trajectory extraction from checkpointed execution histories
//!
//! Folds the ordered checkpoint history of one logical run ("thread") into a
//! canonical [`GraphTrajectory`]: checkpoints are grouped into turns, tasks
//! are flattened into per-turn node identifier sequences, nested subgraphs
//! are spliced in under namespace-qualified identifiers, and interrupts close
//! the turn they occurred in.
//!
//! Blocking and suspension-capable variants share one pure fold; the async
//! variant suspends only while fetching history from the source.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use tracing::debug;

use crate::engine::history::{AsyncHistorySource, HistorySource, TaskRecord, ThreadCheckpoint};
use crate::error::{EvalError, EvalResult};
use crate::trajectory::GraphTrajectory;
use crate::{INTERRUPT, RESUMING, START};

/// Trajectory extracted from a thread, paired with the external inputs that
/// opened each turn.
///
/// `inputs` holds one entry per turn: the input recorded on the turn-opening
/// checkpoint, `"__resuming__"` for a turn opened by resuming a suspended
/// thread, or `null` when the engine recorded nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTrajectory {
    /// Per-turn external inputs, in turn order
    pub inputs: Vec<JsonValue>,

    /// The canonical trajectory
    #[serde(rename = "outputs")]
    pub trajectory: GraphTrajectory,
}

/// Fully collected history for one thread: the top-level checkpoint list
/// plus the checkpoints of every subgraph namespace its tasks declare.
struct ThreadHistory {
    checkpoints: Vec<ThreadCheckpoint>,
    subgraphs: HashMap<Vec<String>, Vec<ThreadCheckpoint>>,
}

/// Extract the trajectory of a thread from a blocking history source.
///
/// # Errors
///
/// Returns [`EvalError::ThreadNotFound`] when the thread has no recorded
/// history, and [`EvalError::UnsupportedShape`] when the engine declares a
/// subgraph without checkpoints or a namespace that cycles. Extraction never
/// partially succeeds.
///
/// # Example
///
/// ```rust
/// use trajectory_evals::{
///     extract_trajectory_from_thread, MemoryHistorySource, TaskRecord, ThreadCheckpoint,
/// };
///
/// let source = MemoryHistorySource::new().with_thread(
///     "thread-1",
///     vec![ThreadCheckpoint::new(vec![
///         TaskRecord::new("__start__"),
///         TaskRecord::new("agent"),
///     ])],
/// );
///
/// let extracted = extract_trajectory_from_thread(&source, "thread-1")?;
/// assert_eq!(extracted.trajectory.steps, vec![vec!["__start__", "agent"]]);
/// # Ok::<(), trajectory_evals::EvalError>(())
/// ```
pub fn extract_trajectory_from_thread<S: HistorySource>(
    source: &S,
    thread: &str,
) -> EvalResult<ExtractedTrajectory> {
    let history = collect_history(source, thread)?;
    fold_trajectory(&history)
}

/// Extract the trajectory of a thread from a suspension-capable source.
///
/// Behaviorally identical to [`extract_trajectory_from_thread`] for the same
/// history: both variants run the same fold, and this one suspends only
/// while awaiting the source.
pub async fn extract_trajectory_from_thread_async<S: AsyncHistorySource>(
    source: &S,
    thread: &str,
) -> EvalResult<ExtractedTrajectory> {
    let history = collect_history_async(source, thread).await?;
    fold_trajectory(&history)
}

/// Gather the top-level history and every declared subgraph history.
fn collect_history<S: HistorySource>(source: &S, thread: &str) -> EvalResult<ThreadHistory> {
    let checkpoints = source.checkpoints(thread, &[])?;
    if checkpoints.is_empty() {
        return Err(EvalError::ThreadNotFound(thread.to_string()));
    }

    let mut pending = declared_subgraphs(&[], &checkpoints)?;
    let mut subgraphs = HashMap::new();
    while let Some(path) = pending.pop() {
        if subgraphs.contains_key(&path) {
            continue;
        }
        let inner = source.checkpoints(thread, &path)?;
        if inner.is_empty() {
            return Err(missing_subgraph(&path));
        }
        pending.extend(declared_subgraphs(&path, &inner)?);
        subgraphs.insert(path, inner);
    }

    debug!(
        thread,
        checkpoints = checkpoints.len(),
        subgraphs = subgraphs.len(),
        "collected checkpoint history"
    );
    Ok(ThreadHistory {
        checkpoints,
        subgraphs,
    })
}

/// Async counterpart of [`collect_history`]; same traversal, awaited fetches.
async fn collect_history_async<S: AsyncHistorySource>(
    source: &S,
    thread: &str,
) -> EvalResult<ThreadHistory> {
    let checkpoints = source.checkpoints(thread, &[]).await?;
    if checkpoints.is_empty() {
        return Err(EvalError::ThreadNotFound(thread.to_string()));
    }

    let mut pending = declared_subgraphs(&[], &checkpoints)?;
    let mut subgraphs = HashMap::new();
    while let Some(path) = pending.pop() {
        if subgraphs.contains_key(&path) {
            continue;
        }
        let inner = source.checkpoints(thread, &path).await?;
        if inner.is_empty() {
            return Err(missing_subgraph(&path));
        }
        pending.extend(declared_subgraphs(&path, &inner)?);
        subgraphs.insert(path, inner);
    }

    debug!(
        thread,
        checkpoints = checkpoints.len(),
        subgraphs = subgraphs.len(),
        "collected checkpoint history"
    );
    Ok(ThreadHistory {
        checkpoints,
        subgraphs,
    })
}

/// Namespace paths declared by subgraph tasks in a checkpoint list.
///
/// A task name already present on the parent path is a namespace cycle: the
/// engine declared a subgraph that leads back into itself. Well-formed
/// engines never report this; it is an error, not a silent drop.
fn declared_subgraphs(
    parent: &[String],
    checkpoints: &[ThreadCheckpoint],
) -> EvalResult<Vec<Vec<String>>> {
    let mut paths = Vec::new();
    for cp in checkpoints {
        for task in &cp.tasks {
            if !task.subgraph {
                continue;
            }
            if parent.iter().any(|seg| seg == &task.name) {
                return Err(EvalError::UnsupportedShape(format!(
                    "namespace cycle through '{}' under '{}'",
                    task.name,
                    parent.join(":")
                )));
            }
            let mut path = parent.to_vec();
            path.push(task.name.clone());
            paths.push(path);
        }
    }
    Ok(paths)
}

fn missing_subgraph(path: &[String]) -> EvalError {
    EvalError::UnsupportedShape(format!(
        "no checkpoints recorded for subgraph '{}'",
        path.join(":")
    ))
}

/// The shared pure fold: checkpoints, oldest first, into turns.
///
/// Turn boundaries: the first checkpoint opens a turn, a suspended checkpoint
/// closes one (after appending a single trailing `__interrupt__`), and a
/// checkpoint whose first task is `__start__` closes any open turn before
/// opening the next. Normal completion closes the last turn without a
/// trailing marker; `__end__` is never recorded.
fn fold_trajectory(history: &ThreadHistory) -> EvalResult<ExtractedTrajectory> {
    let mut inputs = Vec::new();
    let mut results = Vec::new();
    let mut steps: Vec<Vec<String>> = Vec::new();

    let mut turn = Turn::default();

    for cp in &history.checkpoints {
        let opens_turn = cp.tasks.first().is_some_and(|t| t.name == START);
        if opens_turn && turn.open {
            turn.close(&mut steps, &mut results, &mut inputs);
        }
        if !turn.open {
            turn.open = true;
            turn.input = cp.input.clone();
        }

        let mut path = Vec::new();
        append_tasks(&mut turn.step, &mut turn.snapshot, &cp.tasks, &mut path, history)?;

        if let Some(snapshot) = &cp.snapshot {
            turn.snapshot = Some(snapshot.clone());
        }

        if cp.suspended {
            turn.step.push(INTERRUPT.to_string());
            turn.close(&mut steps, &mut results, &mut inputs);
        }
    }

    if turn.open {
        turn.close(&mut steps, &mut results, &mut inputs);
    }

    Ok(ExtractedTrajectory {
        inputs,
        trajectory: GraphTrajectory::new(results, steps),
    })
}

/// Accumulator for the turn currently being folded
#[derive(Default)]
struct Turn {
    open: bool,
    step: Vec<String>,
    input: Option<JsonValue>,
    snapshot: Option<JsonValue>,
}

impl Turn {
    /// Flush this turn into the trajectory accumulators and reset it
    fn close(
        &mut self,
        steps: &mut Vec<Vec<String>>,
        results: &mut Vec<JsonValue>,
        inputs: &mut Vec<JsonValue>,
    ) {
        steps.push(std::mem::take(&mut self.step));
        results.push(self.snapshot.take().unwrap_or_else(|| json!({})));
        let input = match self.input.take() {
            Some(input) => input,
            // Resumed turns carry no input record of their own
            None if !inputs.is_empty() => json!(RESUMING),
            None => JsonValue::Null,
        };
        inputs.push(input);
        self.open = false;
    }
}

/// Append task identifiers to the current step, splicing subgraph node
/// sequences in place.
///
/// `path` carries the accumulated namespace: a task at path `["a", "b"]` is
/// recorded as `"a:b:<name>"`, at the top level as plain `"<name>"`. The
/// fold recurses through arbitrary nesting depth; snapshots recorded inside
/// subgraph checkpoints update the turn's latest snapshot like top-level
/// ones.
fn append_tasks(
    step: &mut Vec<String>,
    last_snapshot: &mut Option<JsonValue>,
    tasks: &[TaskRecord],
    path: &mut Vec<String>,
    history: &ThreadHistory,
) -> EvalResult<()> {
    let prefix = if path.is_empty() {
        String::new()
    } else {
        format!("{}:", path.join(":"))
    };

    for task in tasks {
        step.push(format!("{prefix}{}", task.name));
        if task.subgraph {
            path.push(task.name.clone());
            let checkpoints = history
                .subgraphs
                .get(path)
                .ok_or_else(|| missing_subgraph(path))?;
            for sub in checkpoints {
                append_tasks(step, last_snapshot, &sub.tasks, path, history)?;
                if let Some(snapshot) = &sub.snapshot {
                    *last_snapshot = Some(snapshot.clone());
                }
            }
            path.pop();
        }
    }
    Ok(())
}
