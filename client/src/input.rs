//! Console command input, parsed into tasks on a dedicated thread.

use crate::scheduler::TaskScheduler;
use crate::tasks::{Attack, Authenticate, GameTask, JoinRoom, MoveTo};
use log::{error, info};
use std::io::{self, BufRead};
use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tokio::sync::mpsc;

pub const HELP: &str = "\
commands:
  login <user> <password> [host:port]
  join <room>
  move <x> <y>
  attack <entity>
  help
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Submit(GameTask),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?}, type `help`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("{0:?} is not a valid number")]
    InvalidNumber(String),

    #[error("{0:?} is not a valid host:port")]
    InvalidServer(String),
}

/// Server used by `login` when the command names none.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultServer {
    pub host: String,
    pub port: u16,
}

pub fn parse_command(line: &str, server: &DefaultServer) -> Result<Command, ParseError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Err(ParseError::Empty);
    };
    let args: Vec<&str> = words.collect();

    let task: GameTask = match (command.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("help", _) => return Ok(Command::Help),
        ("quit" | "exit", _) => return Ok(Command::Quit),

        ("login", [user, password]) => {
            Authenticate::new(*user, *password, server.host.clone(), server.port).into()
        }
        ("login", [user, password, address]) => {
            let (host, port) = crate::config::parse_server(address)
                .map_err(|_| ParseError::InvalidServer(address.to_string()))?;
            Authenticate::new(*user, *password, host, port).into()
        }
        ("login", _) => return Err(ParseError::Usage("login <user> <password> [host:port]")),

        ("join", [room]) => JoinRoom::new(number(room)?).into(),
        ("join", _) => return Err(ParseError::Usage("join <room>")),

        ("move", [x, y]) => MoveTo::new(number(x)?, number(y)?).into(),
        ("move", _) => return Err(ParseError::Usage("move <x> <y>")),

        ("attack", [target]) => Attack::new(number(target)?).into(),
        ("attack", _) => return Err(ParseError::Usage("attack <entity>")),

        (other, _) => return Err(ParseError::Unknown(other.to_string())),
    };

    Ok(Command::Submit(task))
}

fn number<T: FromStr>(word: &str) -> Result<T, ParseError> {
    word.parse()
        .map_err(|_| ParseError::InvalidNumber(word.to_string()))
}

/// Reads stdin lines on their own thread and submits the resulting tasks.
///
/// A `quit` command is forwarded on `shutdown`; end of input just stops
/// the thread.
pub fn spawn_console(
    scheduler: Arc<TaskScheduler>,
    host: String,
    port: u16,
    shutdown: mpsc::UnboundedSender<()>,
) -> thread::JoinHandle<()> {
    let server = DefaultServer { host, port };

    thread::spawn(move || {
        info!("Type `help` for commands");
        let stdin = io::stdin();

        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to read console input: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line, &server) {
                Ok(Command::Submit(task)) => {
                    // Rejections are already logged by the scheduler.
                    let _ = scheduler.submit(task);
                }
                Ok(Command::Help) => println!("{}", HELP),
                Ok(Command::Quit) => {
                    let _ = shutdown.send(());
                    break;
                }
                Err(e) => println!("{}", e),
            }
        }
    })
}
