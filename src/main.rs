mod config;
mod http;
mod model;
mod server;
mod store;
mod util;

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use config::{Config, LogConfig};
use http::AppState;
use server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// In-memory users/posts store served over HTTP
#[derive(Parser, Debug)]
#[command(name = "gramstore", version, about)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "GRAMSTORE_CONFIG")]
    config: Option<String>,

    /// Listening address, overrides `server_addr` from the file
    #[arg(short, long, env = "GRAMSTORE_ADDR")]
    addr: Option<String>,
}

fn init_logging(log: &LogConfig) -> anyhow::Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    match &log.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file '{}'", path))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .with_process_env();
    if let Some(addr) = args.addr {
        config.server_addr = addr;
    }

    init_logging(&config.log)?;

    info!("Starting gramstore - in-memory users/posts store");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Everything that can be misconfigured is rejected before binding
    config.validate()?;
    let addr = config.socket_addr()?;
    let state = AppState::from_config(&config)?;

    let server = Server::bind(addr, state).await?;
    info!("Server listening on: {}", server.local_addr());

    server.run().await?;

    Ok(())
}
