use serde::{Deserialize, Serialize};
use std::fmt;

pub const PROTOCOL_VERSION: u32 = 1;
pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;
pub const MAX_HEALTH: u32 = 100;
pub const MAX_USERNAME_LEN: usize = 32;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    /// `attempt` is chosen by the client and echoed in the server's answer.
    Login {
        client_version: u32,
        attempt: u32,
        username: String,
        password: String,
    },
    JoinRoom {
        room_id: u32,
    },
    Move {
        x: f32,
        y: f32,
    },
    Attack {
        target: u32,
    },
    Disconnect,

    LoginAccepted {
        attempt: u32,
        player_id: u32,
    },
    LoginRejected {
        attempt: u32,
        reason: String,
    },
    RoomJoined {
        room_id: u32,
        entities: Vec<Entity>,
    },
    JoinRejected {
        room_id: u32,
        reason: RejectReason,
    },
    WorldState {
        tick: u32,
        entities: Vec<Entity>,
    },
    Disconnected {
        reason: String,
    },
}

/// Why the server refused a room join.
///
/// `RoomFull` is the admission-control signal: the room already holds
/// `capacity` players.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    RoomFull { capacity: u32 },
    UnknownRoom,
    NotAuthenticated,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::RoomFull { capacity } => {
                write!(f, "room is full ({} players)", capacity)
            }
            RejectReason::UnknownRoom => write!(f, "room does not exist"),
            RejectReason::NotAuthenticated => write!(f, "not authenticated"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Entity {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub health: u32,
}

impl Entity {
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            health: MAX_HEALTH,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

pub fn in_world_bounds(x: f32, y: f32) -> bool {
    (0.0..=WORLD_WIDTH).contains(&x) && (0.0..=WORLD_HEIGHT).contains(&y)
}
