//! Deduplicating task scheduler drained once per update tick.
//!
//! Producers on any thread call [`TaskScheduler::submit`]; the update thread
//! calls [`TaskScheduler::drain_and_execute`] once per tick. At most one
//! task per [`TaskKind`] is pending at a time:
//!
//! - a new submission of a kind with nothing pending takes the next arrival
//!   position;
//! - a newer (or equally new) submission of a pending kind replaces the
//!   pending payload but keeps its arrival position, so a stream of repeats
//!   cannot push other kinds back;
//! - an older submission of a pending kind is dropped.
//!
//! The drain takes every pending slot, runs them in arrival order against
//! the game context and reports failures without stopping the pass.
//!
//! One scheduler is built per process by the binary and shared behind an
//! `Arc` with every producer and the update loop.

use crate::error::{SubmitError, TaskError};
use crate::game::GameContext;
use crate::task::{Task, TaskKind, TimedTask};
use crate::tasks::GameTask;
use log::{debug, error, warn};
use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Cumulative counters since the scheduler was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Valid submissions, whatever became of them.
    pub submitted: u64,
    /// Pending tasks replaced by a newer task of the same kind.
    pub superseded: u64,
    /// Submissions dropped because the pending task was newer.
    pub stale_discarded: u64,
    /// Tasks whose `execute` ran.
    pub executed: u64,
    /// Executed tasks that reported a failure.
    pub failed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskFailure {
    pub kind: TaskKind,
    pub error: TaskError,
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrainReport {
    /// Number of tasks executed, failed ones included.
    pub executed: usize,
    pub failures: Vec<TaskFailure>,
}

impl DrainReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn succeeded(&self) -> usize {
        self.executed - self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executed == 0
    }
}

struct PendingSlot {
    arrival: u64,
    task: TimedTask,
}

#[derive(Default)]
struct PendingState {
    slots: HashMap<TaskKind, PendingSlot>,
    next_arrival: u64,
    stats: SchedulerStats,
}

enum Admission {
    Queued,
    Superseded,
    Stale,
}

pub struct TaskScheduler {
    state: Mutex<PendingState>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PendingState::default()),
        }
    }

    /// Submits a task stamped with the current instant.
    pub fn submit(&self, task: impl Into<GameTask>) -> Result<(), SubmitError> {
        self.submit_at(task, Instant::now())
    }

    /// Submits a task stamped with `created_at`.
    ///
    /// Invalid payloads are rejected here and never reach the queue.
    pub fn submit_at(
        &self,
        task: impl Into<GameTask>,
        created_at: Instant,
    ) -> Result<(), SubmitError> {
        let task = task.into();
        if let Err(e) = task.validate() {
            error!("Rejected submission: {}", e);
            return Err(e);
        }

        let candidate = TimedTask::with_timestamp(task, created_at);
        let kind = candidate.kind();

        let admission = {
            let mut guard = self.lock();
            let state = &mut *guard;
            state.stats.submitted += 1;

            match state.slots.entry(kind) {
                Entry::Vacant(slot) => {
                    slot.insert(PendingSlot {
                        arrival: state.next_arrival,
                        task: candidate,
                    });
                    state.next_arrival += 1;
                    Admission::Queued
                }
                Entry::Occupied(mut slot) => {
                    if candidate.supersedes(&slot.get().task) {
                        slot.get_mut().task = candidate;
                        state.stats.superseded += 1;
                        Admission::Superseded
                    } else {
                        state.stats.stale_discarded += 1;
                        Admission::Stale
                    }
                }
            }
        };

        match admission {
            Admission::Queued => debug!("Queued {} task", kind),
            Admission::Superseded => debug!("Replaced pending {} task with newer one", kind),
            Admission::Stale => debug!("Dropped {} task older than the pending one", kind),
        }

        Ok(())
    }

    /// Runs every pending task once, in arrival order, against `ctx`.
    ///
    /// Must only be called from the update thread. Failures are logged,
    /// forwarded to [`GameContext::on_task_failed`] and collected in the
    /// returned report; they never interrupt the pass.
    pub fn drain_and_execute(&self, ctx: &mut GameContext) -> DrainReport {
        let mut pending: Vec<PendingSlot> = {
            let mut state = self.lock();
            std::mem::take(&mut state.slots).into_values().collect()
        };

        let mut report = DrainReport::default();
        if pending.is_empty() {
            return report;
        }

        pending.sort_by_key(|slot| slot.arrival);

        for slot in pending {
            let kind = slot.task.kind();
            let task = slot.task.into_task();
            report.executed += 1;

            if let Err(error) = run_guarded(|| task.execute(ctx)) {
                warn!("{} task failed: {}", kind, error);
                ctx.on_task_failed(kind, &error);
                report.failures.push(TaskFailure { kind, error });
            }
        }

        let mut state = self.lock();
        state.stats.executed += report.executed as u64;
        state.stats.failed += report.failed() as u64;

        report
    }

    pub fn pending_len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().slots.is_empty()
    }

    /// Pending kinds in the order they will execute.
    pub fn pending_kinds(&self) -> Vec<TaskKind> {
        let state = self.lock();
        let mut slots: Vec<(u64, TaskKind)> = state
            .slots
            .iter()
            .map(|(kind, slot)| (slot.arrival, *kind))
            .collect();
        slots.sort();
        slots.into_iter().map(|(_, kind)| kind).collect()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.lock().stats
    }

    // The pending map is only touched in short sections that cannot panic
    // halfway, so a poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, PendingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one task body, turning a panic into a [`TaskError::Panicked`].
fn run_guarded<F>(body: F) -> Result<(), TaskError>
where
    F: FnOnce() -> Result<(), TaskError>,
{
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(result) => result,
        Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
