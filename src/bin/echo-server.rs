//! Local WebSocket echo server for trying the client by hand.
//!
//! Echoes every text frame back on `/ws`. With `--close-after N` the server
//! closes each session after N frames, which exercises the client's
//! close and heartbeat handling.

use std::net::SocketAddr;
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use clap::Parser;

use resilient_ws::lifecycle::shutdown_signal;
use resilient_ws::observability::logging;

#[derive(Parser)]
#[command(name = "echo-server")]
#[command(about = "WebSocket echo server for testing resilient-ws", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "127.0.0.1:9001")]
    bind: SocketAddr,

    /// Close each session after this many frames.
    #[arg(long)]
    close_after: Option<usize>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level)?;

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(cli.close_after);

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Echo server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(close_after): State<Option<usize>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| echo(socket, close_after))
}

async fn echo(mut socket: WebSocket, close_after: Option<usize>) {
    tracing::info!("Session started");
    let mut echoed = 0usize;

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                tracing::debug!(payload = %text.as_str(), "Echoing");
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
                echoed += 1;
                if close_after.is_some_and(|limit| echoed >= limit) {
                    tracing::info!(echoed, "Closing session");
                    let _ = socket.send(Message::Close(None)).await;
                    // Wait for the client's close frame.
                    while let Some(Ok(msg)) = socket.recv().await {
                        if matches!(msg, Message::Close(_)) {
                            break;
                        }
                    }
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    tracing::info!("Session ended");
}
