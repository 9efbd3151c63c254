//! Task identity and recency.
//!
//! A task is a unit of game-state mutation produced on some other thread
//! (network completion, console/GUI input) and executed later on the update
//! thread. Two tasks of the same [`TaskKind`] are duplicates of each other no
//! matter what they carry; [`TimedTask`] decides which duplicate is the most
//! current one.

use crate::error::{SubmitError, TaskError};
use crate::game::GameContext;
use crate::tasks::GameTask;
use std::fmt;
use std::time::Instant;

/// Logical operation a task performs. Used only as the deduplication key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    Authenticate,
    LoginResult,
    JoinRoom,
    JoinResult,
    MoveTo,
    Attack,
    WorldUpdate,
    ConnectionLost,
}

impl TaskKind {
    pub const ALL: [TaskKind; 8] = [
        TaskKind::Authenticate,
        TaskKind::LoginResult,
        TaskKind::JoinRoom,
        TaskKind::JoinResult,
        TaskKind::MoveTo,
        TaskKind::Attack,
        TaskKind::WorldUpdate,
        TaskKind::ConnectionLost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Authenticate => "authenticate",
            TaskKind::LoginResult => "login-result",
            TaskKind::JoinRoom => "join-room",
            TaskKind::JoinResult => "join-result",
            TaskKind::MoveTo => "move-to",
            TaskKind::Attack => "attack",
            TaskKind::WorldUpdate => "world-update",
            TaskKind::ConnectionLost => "connection-lost",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability shared by every concrete task variant.
///
/// `kind` must return the same constant for every value of an implementing
/// type. `execute` is only ever called from the update thread, at most once
/// per task, with the live game context.
pub trait Task {
    fn kind(&self) -> TaskKind;

    /// Rejects payloads that could never execute. Called by the scheduler
    /// before the task is queued.
    fn validate(&self) -> Result<(), SubmitError> {
        Ok(())
    }

    fn execute(self, ctx: &mut GameContext) -> Result<(), TaskError>;
}

/// A task stamped with the monotonic instant it was created at.
#[derive(Debug, Clone)]
pub struct TimedTask {
    task: GameTask,
    created_at: Instant,
}

impl TimedTask {
    pub fn with_timestamp(task: GameTask, created_at: Instant) -> Self {
        Self { task, created_at }
    }

    pub fn timestamp(&self) -> Instant {
        self.created_at
    }

    pub fn kind(&self) -> TaskKind {
        self.task.kind()
    }

    pub fn into_task(self) -> GameTask {
        self.task
    }

    /// True when `self` should replace `other` as the pending task of a kind.
    ///
    /// Equal timestamps count as newer, so under a tie the candidate wins.
    pub fn supersedes(&self, other: &TimedTask) -> bool {
        self.kind() == other.kind() && self.created_at >= other.created_at
    }
}
