use crate::error::TaskError;
use crate::game::GameContext;
use crate::task::{Task, TaskKind};
use shared::{Entity, Packet, RejectReason};

/// Asks the server to place the logged-in player in a room.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinRoom {
    pub room_id: u32,
}

impl JoinRoom {
    pub fn new(room_id: u32) -> Self {
        Self { room_id }
    }
}

impl Task for JoinRoom {
    fn kind(&self) -> TaskKind {
        TaskKind::JoinRoom
    }

    fn execute(self, ctx: &mut GameContext) -> Result<(), TaskError> {
        ctx.require_authenticated()?;
        ctx.send(Packet::JoinRoom {
            room_id: self.room_id,
        })
    }
}

/// The server's answer to a join request. A rejection, including the
/// room-capacity one, becomes this task's execution failure.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinResult {
    pub room_id: u32,
    pub outcome: Result<Vec<Entity>, RejectReason>,
}

impl JoinResult {
    pub fn accepted(room_id: u32, entities: Vec<Entity>) -> Self {
        Self {
            room_id,
            outcome: Ok(entities),
        }
    }

    pub fn rejected(room_id: u32, reason: RejectReason) -> Self {
        Self {
            room_id,
            outcome: Err(reason),
        }
    }
}

impl Task for JoinResult {
    fn kind(&self) -> TaskKind {
        TaskKind::JoinResult
    }

    fn execute(self, ctx: &mut GameContext) -> Result<(), TaskError> {
        match self.outcome {
            Ok(entities) => ctx.enter_room(self.room_id, entities),
            Err(reason) => Err(TaskError::from_rejection(self.room_id, reason)),
        }
    }
}
