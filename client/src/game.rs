//! Game/session context that tasks execute against.
//!
//! Everything in here is owned by the update thread. Producers never see a
//! `GameContext`; they only submit tasks, and the scheduler hands the
//! context to each task during the drain pass.

use crate::error::TaskError;
use crate::task::TaskKind;
use log::{debug, info};
use shared::{in_world_bounds, Entity, Packet};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// How long a login may stay unanswered before it is given up.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Instructions for the network sender task.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Selects the server for login `attempt`.
    Connect { host: String, port: u16, attempt: u32 },
    Send(Packet),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Offline,
    Connecting {
        username: String,
        attempt: u32,
    },
    Authenticated {
        player_id: u32,
        username: String,
    },
    InRoom {
        player_id: u32,
        username: String,
        room_id: u32,
    },
}

/// Notifications for the front end, e.g. to re-enable a login form.
#[derive(Debug, Clone, PartialEq)]
pub enum UiNotice {
    LoginSucceeded { player_id: u32 },
    LoginFailed { reason: String },
    RoomJoined { room_id: u32 },
    JoinFailed { reason: String },
    ConnectionLost { reason: String },
}

pub struct GameContext {
    tick: u32,
    session: SessionState,
    entities: HashMap<u32, Entity>,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    notices: Vec<UiNotice>,
    last_attempt: u32,
    login_started: Option<Instant>,
    login_timeout: Duration,
    #[cfg(test)]
    pub(crate) panic_on_move: bool,
}

impl GameContext {
    pub fn new(outbound: mpsc::UnboundedSender<OutboundMessage>) -> Self {
        Self {
            tick: 0,
            session: SessionState::Offline,
            entities: HashMap::new(),
            outbound,
            notices: Vec::new(),
            last_attempt: 0,
            login_started: None,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            #[cfg(test)]
            panic_on_move: false,
        }
    }

    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn is_online(&self) -> bool {
        self.session != SessionState::Offline
    }

    pub fn player_id(&self) -> Option<u32> {
        match self.session {
            SessionState::Authenticated { player_id, .. } | SessionState::InRoom { player_id, .. } => {
                Some(player_id)
            }
            _ => None,
        }
    }

    pub fn room_id(&self) -> Option<u32> {
        match self.session {
            SessionState::InRoom { room_id, .. } => Some(room_id),
            _ => None,
        }
    }

    pub fn entities(&self) -> &HashMap<u32, Entity> {
        &self.entities
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Moves the session into `Connecting` and returns the new attempt id.
    /// A retry while a login is still in flight is allowed; it supersedes
    /// the earlier attempt.
    pub fn begin_login(&mut self, username: &str) -> Result<u32, TaskError> {
        if let SessionState::Authenticated { username, .. } | SessionState::InRoom { username, .. } =
            &self.session
        {
            return Err(TaskError::AlreadyAuthenticated(username.clone()));
        }

        self.last_attempt += 1;
        self.session = SessionState::Connecting {
            username: username.to_string(),
            attempt: self.last_attempt,
        };
        self.login_started = Some(Instant::now());
        Ok(self.last_attempt)
    }

    /// Tells whether a login response belongs to the attempt in flight.
    ///
    /// `Ok(false)` means the attempt was issued but has since been
    /// superseded, answered, or given up; such responses are dropped.
    pub fn is_current_login(&self, attempt: u32) -> Result<bool, TaskError> {
        if attempt == 0 || attempt > self.last_attempt {
            return Err(TaskError::UnexpectedResponse);
        }
        Ok(matches!(
            self.session,
            SessionState::Connecting { attempt: current, .. } if current == attempt
        ))
    }

    pub fn complete_login(&mut self, player_id: u32) -> Result<(), TaskError> {
        let username = match &self.session {
            SessionState::Connecting { username, .. } => username.clone(),
            _ => return Err(TaskError::UnexpectedResponse),
        };

        info!("Logged in as {} (player {})", username, player_id);
        self.session = SessionState::Authenticated {
            player_id,
            username,
        };
        self.login_started = None;
        self.notify(UiNotice::LoginSucceeded { player_id });
        Ok(())
    }

    pub fn abort_login(&mut self) -> Result<(), TaskError> {
        match self.session {
            SessionState::Connecting { .. } => {
                self.session = SessionState::Offline;
                self.login_started = None;
                Ok(())
            }
            _ => Err(TaskError::UnexpectedResponse),
        }
    }

    /// Returns the attempt in flight if it has been waiting longer than the
    /// login timeout at `now`. Checked by the update loop once per tick.
    pub fn expired_login(&self, now: Instant) -> Option<u32> {
        let started = self.login_started?;
        match self.session {
            SessionState::Connecting { attempt, .. }
                if now.saturating_duration_since(started) >= self.login_timeout =>
            {
                Some(attempt)
            }
            _ => None,
        }
    }

    /// Returns the local player id if the session is logged in.
    pub fn require_authenticated(&self) -> Result<u32, TaskError> {
        self.player_id().ok_or(TaskError::NotAuthenticated)
    }

    /// Returns `(player_id, room_id)` if the session is inside a room.
    pub fn require_in_room(&self) -> Result<(u32, u32), TaskError> {
        match self.session {
            SessionState::InRoom {
                player_id, room_id, ..
            } => Ok((player_id, room_id)),
            _ => Err(TaskError::NotInRoom),
        }
    }

    pub fn enter_room(&mut self, room_id: u32, entities: Vec<Entity>) -> Result<(), TaskError> {
        let player_id = self.require_authenticated()?;
        let username = match &self.session {
            SessionState::Authenticated { username, .. } | SessionState::InRoom { username, .. } => {
                username.clone()
            }
            _ => return Err(TaskError::NotAuthenticated),
        };

        self.session = SessionState::InRoom {
            player_id,
            username,
            room_id,
        };
        self.replace_entities(entities);
        info!("Joined room {} with {} entities", room_id, self.entities.len());
        self.notify(UiNotice::RoomJoined { room_id });
        Ok(())
    }

    /// Applies a server snapshot. Returns false when the snapshot was
    /// ignored because the session is not in a room or the tick is stale.
    pub fn apply_world_state(&mut self, tick: u32, entities: Vec<Entity>) -> bool {
        if self.room_id().is_none() {
            debug!("Ignoring world state {} outside of a room", tick);
            return false;
        }
        if tick < self.tick {
            debug!("Ignoring stale world state {} (current {})", tick, self.tick);
            return false;
        }

        self.tick = tick;
        self.replace_entities(entities);
        true
    }

    pub fn move_local_player(&mut self, x: f32, y: f32) -> Result<(), TaskError> {
        #[cfg(test)]
        if self.panic_on_move {
            panic!("scene corrupted");
        }

        let (player_id, _) = self.require_in_room()?;
        if !in_world_bounds(x, y) {
            return Err(TaskError::OutOfBounds { x, y });
        }

        let player = self
            .entities
            .entry(player_id)
            .or_insert_with(|| Entity::new(player_id, x, y));
        player.x = x;
        player.y = y;
        Ok(())
    }

    /// Drops the session and scene, e.g. after the server hung up.
    pub fn reset_session(&mut self, reason: &str) {
        info!("Session reset: {}", reason);
        self.session = SessionState::Offline;
        self.login_started = None;
        self.entities.clear();
        self.tick = 0;
        self.notify(UiNotice::ConnectionLost {
            reason: reason.to_string(),
        });
    }

    pub fn connect(&self, host: &str, port: u16, attempt: u32) -> Result<(), TaskError> {
        self.outbound
            .send(OutboundMessage::Connect {
                host: host.to_string(),
                port,
                attempt,
            })
            .map_err(|_| TaskError::NetworkUnavailable)
    }

    pub fn send(&self, packet: Packet) -> Result<(), TaskError> {
        self.outbound
            .send(OutboundMessage::Send(packet))
            .map_err(|_| TaskError::NetworkUnavailable)
    }

    pub fn notify(&mut self, notice: UiNotice) {
        self.notices.push(notice);
    }

    pub fn take_notices(&mut self) -> Vec<UiNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Failure side channel used by the scheduler. Login and room failures
    /// reach the front end; anything else is only traced.
    pub fn on_task_failed(&mut self, kind: TaskKind, error: &TaskError) {
        match kind {
            TaskKind::Authenticate | TaskKind::LoginResult => self.notify(UiNotice::LoginFailed {
                reason: error.to_string(),
            }),
            TaskKind::JoinRoom | TaskKind::JoinResult => self.notify(UiNotice::JoinFailed {
                reason: error.to_string(),
            }),
            _ => debug!("Dropped failed {} task: {}", kind, error),
        }
    }

    fn replace_entities(&mut self, entities: Vec<Entity>) {
        self.entities.clear();
        for entity in entities {
            self.entities.insert(entity.id, entity);
        }
    }
}
