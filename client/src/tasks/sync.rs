use crate::error::TaskError;
use crate::game::GameContext;
use crate::task::{Task, TaskKind};
use shared::Entity;

/// Authoritative scene snapshot from the server. Only the newest pending
/// snapshot ever runs, so a burst of updates within one tick costs one apply.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldUpdate {
    pub tick: u32,
    pub entities: Vec<Entity>,
}

impl WorldUpdate {
    pub fn new(tick: u32, entities: Vec<Entity>) -> Self {
        Self { tick, entities }
    }
}

impl Task for WorldUpdate {
    fn kind(&self) -> TaskKind {
        TaskKind::WorldUpdate
    }

    fn execute(self, ctx: &mut GameContext) -> Result<(), TaskError> {
        ctx.apply_world_state(self.tick, self.entities);
        Ok(())
    }
}

/// The server ended the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionLost {
    pub reason: String,
}

impl ConnectionLost {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Task for ConnectionLost {
    fn kind(&self) -> TaskKind {
        TaskKind::ConnectionLost
    }

    fn execute(self, ctx: &mut GameContext) -> Result<(), TaskError> {
        ctx.reset_session(&self.reason);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{SessionState, UiNotice};
    use crate::tasks::test_support::{in_room, logged_in};

    #[test]
    fn test_world_update_replaces_scene() {
        let (mut ctx, _rx) = in_room(1, &[2, 3]);
        WorldUpdate::new(7, vec![Entity::new(1, 50.0, 60.0)])
            .execute(&mut ctx)
            .unwrap();

        assert_eq!(ctx.tick(), 7);
        assert_eq!(ctx.entities().len(), 1);
        assert!(ctx.entity(2).is_none());
    }

    #[test]
    fn test_world_update_outside_room_is_ignored() {
        let (mut ctx, _rx) = logged_in(1);
        WorldUpdate::new(7, vec![Entity::new(1, 50.0, 60.0)])
            .execute(&mut ctx)
            .unwrap();
        assert!(ctx.entities().is_empty());
        assert_eq!(ctx.tick(), 0);
    }

    #[test]
    fn test_connection_lost_resets_session() {
        let (mut ctx, _rx) = in_room(1, &[2]);
        ConnectionLost::new("kicked").execute(&mut ctx).unwrap();

        assert_eq!(ctx.session(), &SessionState::Offline);
        assert!(ctx.entities().is_empty());
        assert_eq!(
            ctx.take_notices(),
            vec![UiNotice::ConnectionLost {
                reason: "kicked".to_string()
            }]
        );
    }
}
