use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::net::TcpListener;

mod config;
mod connection;
mod error;

use config::ServerConfig;
use error::ServerError;
use nexus_cli::{HistoryRing, GLOBAL_HISTORY_CAPACITY};

#[derive(Debug, Parser)]
#[command(name = "netnexusd", about = "NetNexus CLI control-plane front-end")]
struct Cli {
    /// TCP port to listen on.
    #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Interface address to bind to; defaults to all interfaces.
    #[arg(long)]
    bind: Option<IpAddr>,

    /// Hostname substituted into `{hostname}` prompt templates.
    #[arg(long, default_value = "netnexus")]
    hostname: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::new(cli.hostname).with_port(cli.port);
    if let Some(bind) = cli.bind {
        config = config.with_bind_addr(bind);
    }

    let views = Arc::new(nexus_modules::build_views());
    let bus = Arc::new(nexus_bus::Bus::new());
    let global_history = Arc::new(Mutex::new(HistoryRing::new(GLOBAL_HISTORY_CAPACITY)));

    nexus_modules::spawn_all(bus.clone());

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    tracing::info!(%addr, hostname = config.hostname(), "netnexusd listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let bus = bus.clone();
        let views = views.clone();
        let global_history = global_history.clone();
        let hostname = config.hostname().to_string();
        tokio::spawn(async move {
            tracing::info!(%peer, "connection accepted");
            connection::handle(stream, peer, bus, views, global_history, hostname).await;
        });
    }
}
