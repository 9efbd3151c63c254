//! Runtime configuration for the client.
//!
//! Built from the command-line arguments in `main.rs`. Values are checked
//! once here so the rest of the client can rely on them.

use crate::game::DEFAULT_LOGIN_TIMEOUT;
use crate::tasks::Authenticate;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TICK_RATE: u32 = 60;
pub const MAX_TICK_RATE: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("server address must look like host:port, got {0:?}")]
    InvalidServer(String),

    #[error("tick rate must be between 1 and 1000 Hz, got {0}")]
    InvalidTickRate(u32),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_host: String,
    pub server_port: u16,
    pub tick_rate: u32,
    pub fake_ping_ms: u64,
    /// How long a login may go unanswered before it fails.
    pub login_timeout: Duration,
    pub username: Option<String>,
    pub password: String,
}

impl ClientConfig {
    pub fn new(server: &str, tick_rate: u32, fake_ping_ms: u64) -> Result<Self, ConfigError> {
        let (server_host, server_port) = parse_server(server)?;
        if tick_rate == 0 || tick_rate > MAX_TICK_RATE {
            return Err(ConfigError::InvalidTickRate(tick_rate));
        }

        Ok(Self {
            server_host,
            server_port,
            tick_rate,
            fake_ping_ms,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            username: None,
            password: String::new(),
        })
    }

    /// Logs in with these credentials as soon as the client starts.
    pub fn with_login(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = password.into();
        self
    }

    pub fn with_login_timeout(mut self, login_timeout: Duration) -> Self {
        self.login_timeout = login_timeout;
        self
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate as f64)
    }

    pub fn auto_login(&self) -> Option<Authenticate> {
        self.username.as_ref().map(|username| {
            Authenticate::new(
                username.clone(),
                self.password.clone(),
                self.server_host.clone(),
                self.server_port,
            )
        })
    }
}

/// Splits `host:port`. IPv6 hosts may be bracketed, e.g. `[::1]:8080`.
pub fn parse_server(server: &str) -> Result<(String, u16), ConfigError> {
    let invalid = || ConfigError::InvalidServer(server.to_string());

    let (host, port) = server.rsplit_once(':').ok_or_else(invalid)?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let port: u16 = port.parse().map_err(|_| invalid())?;

    if host.is_empty() || port == 0 {
        return Err(invalid());
    }
    Ok((host.to_string(), port))
}
