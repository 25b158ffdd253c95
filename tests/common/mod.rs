//! Shared utilities for the integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use url::Url;

/// What a mock server has observed across all of its sessions.
#[derive(Default)]
pub struct ServerStats {
    upgrades: AtomicUsize,
    frames: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ServerStats {
    pub fn upgrades(&self) -> usize {
        self.upgrades.load(Ordering::SeqCst)
    }

    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().unwrap().clone()
    }

    pub fn count_frames(&self, payload: &str) -> usize {
        self.frames.lock().unwrap().iter().filter(|f| *f == payload).count()
    }
}

#[derive(Clone)]
struct ServerState {
    stats: Arc<ServerStats>,
    close_after: Option<usize>,
}

/// Start an echo server on an ephemeral port.
///
/// With `close_after` set, each session is closed by the server after that
/// many text frames have been echoed.
pub async fn start_echo_server(close_after: Option<usize>) -> (Url, Arc<ServerStats>) {
    let stats = Arc::new(ServerStats::default());
    let state = ServerState {
        stats: Arc::clone(&stats),
        close_after,
    };
    let app = Router::new().route("/ws", get(upgrade)).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (ws_url(addr), stats)
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn refused_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    ws_url(addr)
}

/// Poll `cond` until it holds or `limit` elapses.
pub async fn wait_until(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}

fn ws_url(addr: SocketAddr) -> Url {
    Url::parse(&format!("ws://{}/ws", addr)).unwrap()
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<ServerState>) -> impl IntoResponse {
    state.stats.upgrades.fetch_add(1, Ordering::SeqCst);
    ws.on_upgrade(move |socket| session(socket, state))
}

async fn session(mut socket: WebSocket, state: ServerState) {
    let mut echoed = 0usize;
    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                state.stats.frames.lock().unwrap().push(text.to_string());
                if socket.send(Message::Text(text)).await.is_err() {
                    return;
                }
                echoed += 1;
                if state.close_after.is_some_and(|limit| echoed >= limit) {
                    let _ = socket.send(Message::Close(None)).await;
                    while let Some(Ok(msg)) = socket.recv().await {
                        if matches!(msg, Message::Close(_)) {
                            break;
                        }
                    }
                    return;
                }
            }
            Message::Close(_) => return,
            _ => {}
        }
    }
}
