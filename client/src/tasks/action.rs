use crate::error::{SubmitError, TaskError};
use crate::game::GameContext;
use crate::task::{Task, TaskKind};
use shared::Packet;

/// Moves the local player to a world position.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveTo {
    pub x: f32,
    pub y: f32,
}

impl MoveTo {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Task for MoveTo {
    fn kind(&self) -> TaskKind {
        TaskKind::MoveTo
    }

    fn validate(&self) -> Result<(), SubmitError> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(SubmitError::invalid(
                self.kind(),
                "coordinates must be finite",
            ));
        }
        Ok(())
    }

    fn execute(self, ctx: &mut GameContext) -> Result<(), TaskError> {
        ctx.move_local_player(self.x, self.y)?;
        ctx.send(Packet::Move {
            x: self.x,
            y: self.y,
        })
    }
}

/// Attacks another entity in the current room.
#[derive(Debug, Clone, PartialEq)]
pub struct Attack {
    pub target: u32,
}

impl Attack {
    pub fn new(target: u32) -> Self {
        Self { target }
    }
}

impl Task for Attack {
    fn kind(&self) -> TaskKind {
        TaskKind::Attack
    }

    fn execute(self, ctx: &mut GameContext) -> Result<(), TaskError> {
        let (player_id, _) = ctx.require_in_room()?;
        let attackable = self.target != player_id
            && ctx
                .entity(self.target)
                .map(|entity| entity.is_alive())
                .unwrap_or(false);

        if !attackable {
            return Err(TaskError::UnknownTarget(self.target));
        }

        ctx.send(Packet::Attack {
            target: self.target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::test_support::{in_room, logged_in, sent_packets};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_move_validation() {
        assert!(MoveTo::new(1.0, 2.0).validate().is_ok());
        assert!(MoveTo::new(f32::INFINITY, 2.0).validate().is_err());
        assert!(MoveTo::new(1.0, f32::NAN).validate().is_err());
    }

    #[test]
    fn test_move_updates_scene_and_sends() {
        let (mut ctx, mut rx) = in_room(1, &[]);
        MoveTo::new(320.0, 240.5).execute(&mut ctx).unwrap();

        let player = ctx.entity(1).unwrap();
        assert_approx_eq!(player.x, 320.0, 0.001);
        assert_approx_eq!(player.y, 240.5, 0.001);
        assert_eq!(
            sent_packets(&mut rx),
            vec![Packet::Move { x: 320.0, y: 240.5 }]
        );
    }

    #[test]
    fn test_move_outside_room_fails() {
        let (mut ctx, mut rx) = logged_in(1);
        assert_eq!(
            MoveTo::new(1.0, 1.0).execute(&mut ctx),
            Err(TaskError::NotInRoom)
        );
        assert!(sent_packets(&mut rx).is_empty());
    }

    #[test]
    fn test_move_out_of_bounds_fails() {
        let (mut ctx, mut rx) = in_room(1, &[]);
        assert_eq!(
            MoveTo::new(10_000.0, 1.0).execute(&mut ctx),
            Err(TaskError::OutOfBounds { x: 10_000.0, y: 1.0 })
        );
        assert!(sent_packets(&mut rx).is_empty());
    }

    #[test]
    fn test_attack_known_target() {
        let (mut ctx, mut rx) = in_room(1, &[5]);
        Attack::new(5).execute(&mut ctx).unwrap();
        assert_eq!(sent_packets(&mut rx), vec![Packet::Attack { target: 5 }]);
    }

    #[test]
    fn test_attack_unknown_or_self() {
        let (mut ctx, mut rx) = in_room(1, &[5]);
        assert_eq!(
            Attack::new(6).execute(&mut ctx),
            Err(TaskError::UnknownTarget(6))
        );
        assert_eq!(
            Attack::new(1).execute(&mut ctx),
            Err(TaskError::UnknownTarget(1))
        );
        assert!(sent_packets(&mut rx).is_empty());
    }
}
