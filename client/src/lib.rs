//! # Game Client Library
//!
//! Client-side core of the networked multiplayer game. Everything that
//! happens asynchronously (server responses arriving on the socket, commands
//! typed by the player) is turned into a *task* and queued; once per update
//! tick the single update thread drains the queue and applies the tasks to
//! the live game state. No other thread ever touches that state.
//!
//! ## Deduplication
//!
//! Tasks are grouped by their [`task::TaskKind`]. Only the most recent task
//! of each kind is kept until the next drain: three movement commands typed
//! within one tick collapse into the last one, and a login retry replaces
//! the attempt it raced. A replaced kind keeps the queue position of its
//! first submission, so a flood of one kind never delays the others.
//!
//! ## Module Organization
//!
//! ### Task Module (`task`)
//! Task identity: the closed set of kinds, the `Task` trait every variant
//! implements, and `TimedTask`, which carries the creation instant and the
//! recency rule.
//!
//! ### Tasks Module (`tasks`)
//! One payload struct per kind plus `GameTask`, the sum type the scheduler
//! stores.
//!
//! ### Scheduler Module (`scheduler`)
//! `TaskScheduler`: thread-safe submission, per-kind replacement, and the
//! per-tick drain that runs survivors in arrival order and isolates
//! failures.
//!
//! ### Game Module (`game`)
//! `GameContext`: session state, scene entities, the outbound network queue
//! and notices for the front end.
//!
//! ### Network Module (`network`)
//! UDP socket tasks that convert server packets into submissions and send
//! what tasks queue, plus the `Client` update loop.
//!
//! ### Input Module (`input`)
//! Console commands parsed into tasks on their own thread.
//!
//! ## Usage Example
//!
//! ```rust
//! use client::game::GameContext;
//! use client::scheduler::TaskScheduler;
//! use client::tasks::{Attack, MoveTo};
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! let scheduler = Arc::new(TaskScheduler::new());
//! let (outbound_tx, _outbound_rx) = mpsc::unbounded_channel();
//! let mut game = GameContext::new(outbound_tx);
//!
//! // Any thread may submit.
//! scheduler.submit(MoveTo::new(1.0, 1.0)).unwrap();
//! scheduler.submit(Attack::new(5)).unwrap();
//! scheduler.submit(MoveTo::new(2.0, 2.0)).unwrap();
//!
//! // Once per tick, on the update thread.
//! let report = scheduler.drain_and_execute(&mut game);
//! assert_eq!(report.executed, 2);
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod network;
pub mod scheduler;
pub mod task;
pub mod tasks;
