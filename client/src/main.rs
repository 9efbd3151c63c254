use clap::Parser;
use client::config::{ClientConfig, DEFAULT_TICK_RATE};
use client::network::Client;
use log::info;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game server address (host:port)
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Update ticks per second
    #[arg(short = 't', long, default_value_t = DEFAULT_TICK_RATE)]
    tick_rate: u32,

    /// Simulate network latency in milliseconds
    #[arg(short = 'l', long, default_value = "0")]
    fake_ping: u64,

    /// Seconds to wait for a login answer
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    login_timeout: u64,

    /// Log in with this username on startup
    #[arg(short = 'u', long)]
    user: Option<String>,

    /// Password for --user
    #[arg(short = 'p', long, default_value = "")]
    password: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let mut config = ClientConfig::new(&args.server, args.tick_rate, args.fake_ping)?
        .with_login_timeout(Duration::from_secs(args.login_timeout));
    if let Some(user) = args.user {
        config = config.with_login(user, args.password);
    }

    info!("Starting client...");
    info!("Server: {}:{}", config.server_host, config.server_port);
    if config.fake_ping_ms > 0 {
        info!("Simulating {}ms latency", config.fake_ping_ms);
    }

    let mut client = Client::new(config).await?;
    client.run().await?;

    Ok(())
}
