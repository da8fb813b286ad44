// accrete/src/state/cell.rs

//! A shared handle to the accumulated state of one pipeline run, providing
//! shared ownership and interior mutability using parking_lot::RwLock.
//!
//! The merge engine itself is a pure function; the cell is the one place a
//! run's "current state" lives so that producer steps and the orchestrator
//! can hand each other a single handle. Applying an update takes the write
//! lock for the duration of the merge, which serializes concurrent callers
//! of the same run. Every intermediate snapshot is retained, so a finished
//! run can be inspected or replayed step by step.

use crate::error::AccreteResult;
use crate::state::snapshot::StateSnapshot;
use crate::state::update::Update;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, lock-guarded history of one run's accumulated state.
///
/// Cloning the cell clones the handle, not the state; all clones observe the
/// same run.
#[derive(Debug)]
pub struct StateCell(Arc<RwLock<Vec<StateSnapshot>>>);

impl StateCell {
  /// Starts a run from an initial snapshot (usually `StateSnapshot::init`).
  pub fn new(initial: StateSnapshot) -> Self {
    StateCell(Arc::new(RwLock::new(vec![initial])))
  }

  /// The current snapshot. Cheap: snapshots share their field values.
  pub fn current(&self) -> StateSnapshot {
    self
      .0
      .read()
      .last()
      .expect("state cell history is never empty")
      .clone()
  }

  /// Merges one partial update into the current state and returns the new
  /// snapshot. Holds the write lock for the duration of the merge, so
  /// updates applied through one cell are serialized.
  pub fn apply(&self, update: &Update) -> AccreteResult<StateSnapshot> {
    let mut history = self.0.write();
    let next = history.last().expect("state cell history is never empty").apply(update)?;
    history.push(next.clone());
    Ok(next)
  }

  /// Number of snapshots recorded so far (initial state included).
  pub fn history_len(&self) -> usize {
    self.0.read().len()
  }

  /// The snapshot after `index` merges (`0` = initial state), if recorded.
  pub fn snapshot_at(&self, index: usize) -> Option<StateSnapshot> {
    self.0.read().get(index).cloned()
  }

  /// Runs a closure against the current snapshot without cloning it.
  pub fn read_current<R>(&self, f: impl FnOnce(&StateSnapshot) -> R) -> R {
    let history = self.0.read();
    f(history.last().expect("state cell history is never empty"))
  }
}

impl Clone for StateCell {
  fn clone(&self) -> Self {
    StateCell(Arc::clone(&self.0))
  }
}
