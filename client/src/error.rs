//! Error types for task submission and task execution.
//!
//! The two enums map onto the two failure classes the scheduler cares about:
//! a producer handing over a payload that can never run is a
//! [`SubmitError`] and is returned straight to the caller of `submit`, while
//! a task that runs but cannot complete its effect yields a [`TaskError`]
//! that the drain pass records and reports without stopping.

use crate::task::TaskKind;
use shared::RejectReason;
use thiserror::Error;

/// Raised at submission time for payloads that violate a kind's contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: TaskKind, reason: String },
}

impl SubmitError {
    pub fn invalid(kind: TaskKind, reason: impl Into<String>) -> Self {
        SubmitError::InvalidPayload {
            kind,
            reason: reason.into(),
        }
    }
}

/// Raised by `Task::execute` when the task's effect could not be applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    #[error("network link is unavailable")]
    NetworkUnavailable,

    #[error("already logged in as {0}")]
    AlreadyAuthenticated(String),

    #[error("not logged in")]
    NotAuthenticated,

    #[error("not in a room")]
    NotInRoom,

    #[error("no login in progress")]
    UnexpectedResponse,

    #[error("login rejected: {0}")]
    LoginRejected(String),

    #[error("room {room_id} is full ({capacity} players)")]
    RoomFull { room_id: u32, capacity: u32 },

    #[error("join to room {room_id} rejected: {reason}")]
    JoinRejected { room_id: u32, reason: RejectReason },

    #[error("position ({x}, {y}) is outside the world")]
    OutOfBounds { x: f32, y: f32 },

    #[error("no attackable entity with id {0}")]
    UnknownTarget(u32),

    #[error("task panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    /// Maps a server rejection onto the matching execution failure.
    pub fn from_rejection(room_id: u32, reason: RejectReason) -> Self {
        match reason {
            RejectReason::RoomFull { capacity } => TaskError::RoomFull { room_id, capacity },
            reason => TaskError::JoinRejected { room_id, reason },
        }
    }
}
