use crate::error::{SubmitError, TaskError};
use crate::game::GameContext;
use crate::task::{Task, TaskKind};
use log::{debug, info};
use shared::{Packet, MAX_USERNAME_LEN, PROTOCOL_VERSION};

/// Connects to a server and sends a login request. The server's answer
/// comes back later as a [`LoginResult`] task.
#[derive(Debug, Clone, PartialEq)]
pub struct Authenticate {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl Authenticate {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: host.into(),
            port,
        }
    }
}

impl Task for Authenticate {
    fn kind(&self) -> TaskKind {
        TaskKind::Authenticate
    }

    fn validate(&self) -> Result<(), SubmitError> {
        if self.username.is_empty() {
            return Err(SubmitError::invalid(self.kind(), "username is empty"));
        }
        if self.username.len() > MAX_USERNAME_LEN {
            return Err(SubmitError::invalid(
                self.kind(),
                format!("username longer than {} bytes", MAX_USERNAME_LEN),
            ));
        }
        if self.host.is_empty() {
            return Err(SubmitError::invalid(self.kind(), "host is empty"));
        }
        if self.port == 0 {
            return Err(SubmitError::invalid(self.kind(), "port must be non-zero"));
        }
        Ok(())
    }

    fn execute(self, ctx: &mut GameContext) -> Result<(), TaskError> {
        let attempt = ctx.begin_login(&self.username)?;
        info!(
            "Logging in as {} at {}:{} (attempt {})",
            self.username, self.host, self.port, attempt
        );

        let sent = ctx.connect(&self.host, self.port, attempt).and_then(|_| {
            ctx.send(Packet::Login {
                client_version: PROTOCOL_VERSION,
                attempt,
                username: self.username,
                password: self.password,
            })
        });

        if sent.is_err() {
            // begin_login just succeeded, so the session is Connecting
            if let Err(e) = ctx.abort_login() {
                debug!("Login rollback skipped: {}", e);
            }
        }
        sent
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Accepted { player_id: u32 },
    Rejected { reason: String },
}

/// The answer to login `attempt`, from the server or from the client itself
/// when the request never got out or timed out.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginResult {
    pub attempt: u32,
    pub outcome: LoginOutcome,
}

impl LoginResult {
    pub fn accepted(attempt: u32, player_id: u32) -> Self {
        Self {
            attempt,
            outcome: LoginOutcome::Accepted { player_id },
        }
    }

    pub fn rejected(attempt: u32, reason: impl Into<String>) -> Self {
        Self {
            attempt,
            outcome: LoginOutcome::Rejected {
                reason: reason.into(),
            },
        }
    }
}

impl Task for LoginResult {
    fn kind(&self) -> TaskKind {
        TaskKind::LoginResult
    }

    fn execute(self, ctx: &mut GameContext) -> Result<(), TaskError> {
        if !ctx.is_current_login(self.attempt)? {
            debug!("Ignoring answer to stale login attempt {}", self.attempt);
            return Ok(());
        }

        match self.outcome {
            LoginOutcome::Accepted { player_id } => ctx.complete_login(player_id),
            LoginOutcome::Rejected { reason } => {
                ctx.abort_login()?;
                Err(TaskError::LoginRejected(reason))
            }
        }
    }
}
