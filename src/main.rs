//! Resilient WebSocket client (CLI)
//!
//! Bridges stdin/stdout to a resilient connection.
//!
//! # Architecture Overview
//!
//! ```text
//!   stdin lines ──▶ ResilientConnection::send ──▶ transport ──▶ server
//!                          │
//!                          │ control loop: heartbeat timer, reconnect timer
//!                          ▼
//!   stdout      ◀── on_message ◀── transport events ◀────────── server
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;

use resilient_ws::config::{load_config, validation::validate_config, ClientConfig, ConfigError};
use resilient_ws::lifecycle::shutdown_signal;
use resilient_ws::observability::{logging, metrics};
use resilient_ws::{Callbacks, ResilientConnection};

#[derive(Parser)]
#[command(name = "resilient-ws")]
#[command(about = "Line-oriented WebSocket client with heartbeat and automatic reconnect", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Endpoint URL, overrides connection.url.
    #[arg(short, long)]
    url: Option<String>,

    /// Log level, overrides observability.log_level.
    #[arg(long)]
    log_level: Option<String>,

    /// Disable heartbeats.
    #[arg(long)]
    no_heartbeat: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = cli.url {
        config.connection.url = url;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    if cli.no_heartbeat {
        config.heartbeat.enabled = false;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level)?;

    tracing::info!(
        url = %config.connection.url,
        heartbeat = config.heartbeat.enabled,
        heartbeat_interval_secs = config.heartbeat.interval_secs,
        max_reconnect_attempts = config.reconnect.max_attempts,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let gave_up = Arc::new(Notify::new());
    let notify_give_up = Arc::clone(&gave_up);
    let handler = Callbacks::new(|payload| println!("{}", payload))
        .on_open(|| tracing::info!("Connected"))
        .on_error(|e| tracing::warn!(error = %e, "Connection error"))
        .on_close(|| tracing::info!("Connection closed"))
        .on_give_up(move |attempts| {
            tracing::error!(attempts, "Giving up on reconnecting");
            notify_give_up.notify_one();
        });

    let connection = ResilientConnection::connect(config.connection_config()?, handler);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let signal = shutdown_signal();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !connection.send(&line) {
                        tracing::warn!(status = %connection.status(), "Not connected, line dropped");
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read stdin");
                    break;
                }
            },
            _ = gave_up.notified() => break,
            _ = &mut signal => break,
        }
    }

    connection.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
