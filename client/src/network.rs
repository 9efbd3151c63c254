//! Client network layer and update loop.
//!
//! Two background tasks own the UDP socket: the receiver turns server
//! packets into task submissions, the sender drains the outbound queue that
//! tasks write to. Neither touches game state; only the update loop in
//! [`Client::run`] does, by draining the scheduler once per tick.

use crate::config::ClientConfig;
use crate::game::{GameContext, OutboundMessage, UiNotice};
use crate::input;
use crate::scheduler::TaskScheduler;
use crate::tasks::{ConnectionLost, GameTask, JoinResult, LoginResult, WorldUpdate};
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::Packet;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};

/// Maps a server-to-client packet onto the task that applies it.
pub fn packet_to_task(packet: Packet) -> Option<GameTask> {
    let task: GameTask = match packet {
        Packet::LoginAccepted { attempt, player_id } => {
            LoginResult::accepted(attempt, player_id).into()
        }
        Packet::LoginRejected { attempt, reason } => LoginResult::rejected(attempt, reason).into(),
        Packet::RoomJoined { room_id, entities } => JoinResult::accepted(room_id, entities).into(),
        Packet::JoinRejected { room_id, reason } => JoinResult::rejected(room_id, reason).into(),
        Packet::WorldState { tick, entities } => WorldUpdate::new(tick, entities).into(),
        Packet::Disconnected { reason } => ConnectionLost::new(reason).into(),
        Packet::Login { .. }
        | Packet::JoinRoom { .. }
        | Packet::Move { .. }
        | Packet::Attack { .. }
        | Packet::Disconnect => return None,
    };
    Some(task)
}

/// Socket tasks shared by the client and tests.
pub struct NetworkLink {
    socket: Arc<UdpSocket>,
    server: Arc<RwLock<Option<SocketAddr>>>,
    fake_ping_ms: u64,
}

impl NetworkLink {
    pub async fn bind(fake_ping_ms: u64) -> io::Result<Self> {
        let socket = Arc::new(UdpSocket::bind("0.0.0.0:0").await?);
        debug!("Client socket bound to {}", socket.local_addr()?);

        Ok(Self {
            socket,
            server: Arc::new(RwLock::new(None)),
            fake_ping_ms,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Spawns the receiver and sender tasks.
    pub fn spawn(
        &self,
        scheduler: Arc<TaskScheduler>,
        outbound_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ) -> (JoinHandle<()>, JoinHandle<()>) {
        let receiver = self.spawn_receiver(Arc::clone(&scheduler));
        let sender = self.spawn_sender(scheduler, outbound_rx);
        (receiver, sender)
    }

    /// Listens for server packets and submits the matching tasks.
    fn spawn_receiver(&self, scheduler: Arc<TaskScheduler>) -> JoinHandle<()> {
        let socket = Arc::clone(&self.socket);
        let server = Arc::clone(&self.server);
        let fake_ping_ms = self.fake_ping_ms;

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                let (len, addr) = match socket.recv_from(&mut buffer).await {
                    Ok(received) => received,
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        sleep(Duration::from_millis(10)).await;
                        continue;
                    }
                };

                if *server.read().await != Some(addr) {
                    warn!("Ignoring datagram from unknown peer {}", addr);
                    continue;
                }

                let packet = match deserialize::<Packet>(&buffer[0..len]) {
                    Ok(packet) => packet,
                    Err(e) => {
                        warn!("Failed to deserialize packet from {}: {}", addr, e);
                        continue;
                    }
                };

                if fake_ping_ms > 0 {
                    sleep(Duration::from_millis(fake_ping_ms / 2)).await;
                }

                match packet_to_task(packet) {
                    Some(task) => {
                        if let Err(e) = scheduler.submit(task) {
                            error!("Failed to submit inbound task: {}", e);
                        }
                    }
                    None => warn!("Unexpected client-bound packet from {}", addr),
                }
            }
        })
    }

    /// Drains the outbound queue written by executing tasks.
    fn spawn_sender(
        &self,
        scheduler: Arc<TaskScheduler>,
        mut outbound_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ) -> JoinHandle<()> {
        let socket = Arc::clone(&self.socket);
        let server = Arc::clone(&self.server);
        let fake_ping_ms = self.fake_ping_ms;

        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                match message {
                    OutboundMessage::Connect {
                        host,
                        port,
                        attempt,
                    } => match resolve(&host, port).await {
                        Ok(addr) => {
                            info!("Using server {}", addr);
                            *server.write().await = Some(addr);
                        }
                        Err(e) => {
                            error!("Cannot resolve {}:{}: {}", host, port, e);
                            *server.write().await = None;
                            reject_login(
                                &scheduler,
                                attempt,
                                format!("cannot resolve {}:{}", host, port),
                            );
                        }
                    },
                    OutboundMessage::Send(packet) => {
                        let target = *server.read().await;
                        let Some(addr) = target else {
                            warn!("Dropping {:?}: no server selected", packet);
                            if let Packet::Login { attempt, .. } = packet {
                                reject_login(&scheduler, attempt, "no server selected");
                            }
                            continue;
                        };

                        if fake_ping_ms > 0 {
                            sleep(Duration::from_millis(fake_ping_ms / 2)).await;
                        }

                        if let Err(e) = send_packet(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                            if let Packet::Login { attempt, .. } = packet {
                                reject_login(&scheduler, attempt, format!("cannot reach {}", addr));
                            }
                        }
                    }
                }
            }
            debug!("Outbound queue closed, sender stopping");
        })
    }
}

/// Fails a login attempt whose request never reached the server.
fn reject_login(scheduler: &TaskScheduler, attempt: u32, reason: impl Into<String>) {
    if let Err(e) = scheduler.submit(LoginResult::rejected(attempt, reason)) {
        error!("Failed to submit login rejection: {}", e);
    }
}

async fn resolve(host: &str, port: u16) -> io::Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no address found"))
}

async fn send_packet(
    socket: &UdpSocket,
    packet: &Packet,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let data = serialize(packet)?;
    socket.send_to(&data, addr).await?;
    Ok(())
}

pub struct Client {
    config: ClientConfig,
    link: NetworkLink,
    scheduler: Arc<TaskScheduler>,
    game: GameContext,
    outbound_rx: Option<mpsc::UnboundedReceiver<OutboundMessage>>,
}

impl Client {
    pub async fn new(config: ClientConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let link = NetworkLink::bind(config.fake_ping_ms).await?;
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let game = GameContext::new(outbound_tx).with_login_timeout(config.login_timeout);

        Ok(Client {
            config,
            link,
            scheduler: Arc::new(TaskScheduler::new()),
            game,
            outbound_rx: Some(outbound_rx),
        })
    }

    pub fn scheduler(&self) -> Arc<TaskScheduler> {
        Arc::clone(&self.scheduler)
    }

    /// One update tick: give up a login that has waited too long, then run
    /// everything producers queued since the last tick.
    fn tick(&mut self, now: Instant) -> Vec<UiNotice> {
        if let Some(attempt) = self.game.expired_login(now) {
            warn!("Login attempt {} timed out", attempt);
            if let Err(e) = self
                .scheduler
                .submit(LoginResult::rejected(attempt, "no answer from server"))
            {
                error!("Failed to submit login timeout: {}", e);
            }
        }

        let report = self.scheduler.drain_and_execute(&mut self.game);
        if !report.is_empty() {
            debug!(
                "Tick drained {} tasks ({} failed)",
                report.executed,
                report.failed()
            );
        }

        self.game.take_notices()
    }

    fn update(&mut self) {
        for notice in self.tick(Instant::now()) {
            show_notice(&notice);
        }
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let outbound_rx = self
            .outbound_rx
            .take()
            .ok_or("client is already running")?;
        let (receiver, sender) = self.link.spawn(self.scheduler(), outbound_rx);

        let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel();
        input::spawn_console(
            self.scheduler(),
            self.config.server_host.clone(),
            self.config.server_port,
            shutdown_tx,
        );

        if let Some(login) = self.config.auto_login() {
            self.scheduler.submit(login)?;
        }

        let mut tick_interval = interval(self.config.tick_duration());
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Client running at {} Hz", self.config.tick_rate);

        loop {
            tokio::select! {
                _ = tick_interval.tick() => self.update(),

                Some(()) = shutdown_rx.recv() => {
                    info!("Quit requested");
                    break;
                },

                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down");
                    break;
                },
            }
        }

        if self.game.is_online() {
            let _ = self.game.send(Packet::Disconnect);
            sleep(Duration::from_millis(50)).await;
        }

        receiver.abort();
        sender.abort();
        Ok(())
    }
}

fn show_notice(notice: &UiNotice) {
    match notice {
        UiNotice::LoginSucceeded { player_id } => info!("Logged in, player id {}", player_id),
        UiNotice::LoginFailed { reason } => warn!("Login failed: {} (you can try again)", reason),
        UiNotice::RoomJoined { room_id } => info!("Entered room {}", room_id),
        UiNotice::JoinFailed { reason } => warn!("Could not join room: {}", reason),
        UiNotice::ConnectionLost { reason } => warn!("Disconnected: {}", reason),
    }
}
