//! Concrete task variants, one per [`TaskKind`].
//!
//! [`GameTask`] is the closed sum over all variants. Producers build a
//! variant struct, convert it with `into()`, and hand it to the scheduler;
//! the payload shape for each kind is checked by the compiler.

mod action;
mod auth;
mod room;
mod sync;

pub use action::{Attack, MoveTo};
pub use auth::{Authenticate, LoginOutcome, LoginResult};
pub use room::{JoinResult, JoinRoom};
pub use sync::{ConnectionLost, WorldUpdate};

use crate::error::{SubmitError, TaskError};
use crate::game::GameContext;
use crate::task::{Task, TaskKind};

#[derive(Debug, Clone, PartialEq)]
pub enum GameTask {
    Authenticate(Authenticate),
    LoginResult(LoginResult),
    JoinRoom(JoinRoom),
    JoinResult(JoinResult),
    MoveTo(MoveTo),
    Attack(Attack),
    WorldUpdate(WorldUpdate),
    ConnectionLost(ConnectionLost),
}

impl Task for GameTask {
    fn kind(&self) -> TaskKind {
        match self {
            GameTask::Authenticate(task) => task.kind(),
            GameTask::LoginResult(task) => task.kind(),
            GameTask::JoinRoom(task) => task.kind(),
            GameTask::JoinResult(task) => task.kind(),
            GameTask::MoveTo(task) => task.kind(),
            GameTask::Attack(task) => task.kind(),
            GameTask::WorldUpdate(task) => task.kind(),
            GameTask::ConnectionLost(task) => task.kind(),
        }
    }

    fn validate(&self) -> Result<(), SubmitError> {
        match self {
            GameTask::Authenticate(task) => task.validate(),
            GameTask::LoginResult(task) => task.validate(),
            GameTask::JoinRoom(task) => task.validate(),
            GameTask::JoinResult(task) => task.validate(),
            GameTask::MoveTo(task) => task.validate(),
            GameTask::Attack(task) => task.validate(),
            GameTask::WorldUpdate(task) => task.validate(),
            GameTask::ConnectionLost(task) => task.validate(),
        }
    }

    fn execute(self, ctx: &mut GameContext) -> Result<(), TaskError> {
        match self {
            GameTask::Authenticate(task) => task.execute(ctx),
            GameTask::LoginResult(task) => task.execute(ctx),
            GameTask::JoinRoom(task) => task.execute(ctx),
            GameTask::JoinResult(task) => task.execute(ctx),
            GameTask::MoveTo(task) => task.execute(ctx),
            GameTask::Attack(task) => task.execute(ctx),
            GameTask::WorldUpdate(task) => task.execute(ctx),
            GameTask::ConnectionLost(task) => task.execute(ctx),
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for GameTask {
                fn from(task: $variant) -> Self {
                    GameTask::$variant(task)
                }
            }
        )*
    };
}

impl_from_variant!(
    Authenticate,
    LoginResult,
    JoinRoom,
    JoinResult,
    MoveTo,
    Attack,
    WorldUpdate,
    ConnectionLost,
);


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_variant() {
        let tasks: Vec<GameTask> = vec![
            Authenticate::new("alice", "pw", "localhost", 8080).into(),
            LoginResult::accepted(1, 1).into(),
            JoinRoom::new(1).into(),
            JoinResult::accepted(1, vec![]).into(),
            MoveTo::new(1.0, 1.0).into(),
            Attack::new(2).into(),
            WorldUpdate::new(1, vec![]).into(),
            ConnectionLost::new("bye").into(),
        ];

        let kinds: Vec<TaskKind> = tasks.iter().map(|t| t.kind()).collect();
        assert_eq!(kinds, TaskKind::ALL.to_vec());
    }

    #[test]
    fn test_validate_delegates_to_variant() {
        let task: GameTask = MoveTo::new(f32::NAN, 1.0).into();
        assert!(task.validate().is_err());

        let task: GameTask = Attack::new(3).into();
        assert!(task.validate().is_ok());
    }
}
