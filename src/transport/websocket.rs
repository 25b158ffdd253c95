//! WebSocket transport over tokio-tungstenite.
//!
//! # Responsibilities
//! - Perform the opening handshake (bounded by the connect timeout)
//! - Forward inbound text frames as `TransportEventKind::Message`
//! - Write outbound text frames queued by `send`
//! - Run the closing handshake when asked to close
//!
//! # Design Decisions
//! - One task per handle; the handle itself only holds an atomic status and
//!   an outbound queue, so `send` and `close` never block
//! - Binary frames are not part of the payload model and are dropped
//! - Ping/pong is answered by tungstenite and never surfaces as a message

use std::sync::Arc;
use std::time::Duration;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_tungstenite::tungstenite::Message;

use crate::connection::error::ConnectionError;
use crate::connection::state::{AtomicReadyState, ReadyState};
use crate::resilience::timeouts::connect_with_timeout;
use crate::transport::{ConnectRequest, Connector, TransportEventKind, TransportHandle};

/// How long to wait for the peer's close frame after sending ours.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

enum Outbound {
    Text(String),
    Close,
}

/// Opens real WebSocket connections.
#[derive(Debug, Clone, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, request: ConnectRequest) -> Box<dyn TransportHandle> {
        let state = Arc::new(AtomicReadyState::new(ReadyState::Connecting));
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        tracing::debug!(
            url = %request.url,
            generation = %request.generation,
            "Opening websocket"
        );

        let task = tokio::spawn(run_socket(request, Arc::clone(&state), outbound_rx));

        Box::new(WsHandle {
            state,
            outbound: outbound_tx,
            task,
        })
    }
}

struct WsHandle {
    state: Arc<AtomicReadyState>,
    outbound: mpsc::UnboundedSender<Outbound>,
    task: JoinHandle<()>,
}

impl TransportHandle for WsHandle {
    fn send(&self, payload: &str) -> bool {
        if self.state.load() != ReadyState::Open {
            return false;
        }
        self.outbound.send(Outbound::Text(payload.to_owned())).is_ok()
    }

    fn close(&self) {
        match self.state.load() {
            ReadyState::Connecting => {
                // Nothing to hand-shake yet.
                self.state.store(ReadyState::Closed);
                self.task.abort();
            }
            ReadyState::Open => {
                self.state.store(ReadyState::Closing);
                let _ = self.outbound.send(Outbound::Close);
            }
            ReadyState::Closing | ReadyState::Closed => {}
        }
    }

    fn ready_state(&self) -> ReadyState {
        self.state.load()
    }
}

impl Drop for WsHandle {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_socket(
    request: ConnectRequest,
    state: Arc<AtomicReadyState>,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
) {
    let handshake = tokio_tungstenite::connect_async(request.url.as_str());
    let stream = match connect_with_timeout(request.connect_timeout, handshake).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            tracing::debug!(generation = %request.generation, error = %e, "Websocket handshake failed");
            state.store(ReadyState::Closed);
            request.emit(TransportEventKind::Error(e));
            request.emit(TransportEventKind::Close);
            return;
        }
    };

    if !state.transition(ReadyState::Connecting, ReadyState::Open) {
        // Closed while the handshake was in flight.
        return;
    }
    request.emit(TransportEventKind::Open);

    let (mut sink, mut stream) = stream.split();

    loop {
        tokio::select! {
            queued = outbound.recv() => match queued {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = sink.send(Message::text(text)).await {
                        state.store(ReadyState::Closed);
                        request.emit(TransportEventKind::Error(ConnectionError::Transport(e.to_string())));
                        request.emit(TransportEventKind::Close);
                        return;
                    }
                }
                Some(Outbound::Close) | None => {
                    state.store(ReadyState::Closing);
                    let _ = sink.send(Message::Close(None)).await;
                    let _ = time::timeout(CLOSE_GRACE, async {
                        while let Some(Ok(frame)) = stream.next().await {
                            if frame.is_close() {
                                break;
                            }
                        }
                    })
                    .await;
                    state.store(ReadyState::Closed);
                    request.emit(TransportEventKind::Close);
                    return;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    request.emit(TransportEventKind::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    tracing::trace!(len = bytes.len(), "Dropping binary frame");
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(generation = %request.generation, frame = ?frame, "Peer started closing handshake");
                    state.store(ReadyState::Closing);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    state.store(ReadyState::Closed);
                    request.emit(TransportEventKind::Error(ConnectionError::Transport(e.to_string())));
                    request.emit(TransportEventKind::Close);
                    return;
                }
                None => {
                    state.store(ReadyState::Closed);
                    request.emit(TransportEventKind::Close);
                    return;
                }
            }
        }
    }
}
