//! Control loop and state machine of a resilient connection.
//!
//! # Responsibilities
//! - Consume transport events, the heartbeat deadline and the reconnect
//!   deadline one at a time
//! - Discard events from superseded transport handles
//! - Run the reconnect sequence within the attempt budget
//! - Invoke the owner's event handler
//!
//! # Design Decisions
//! - Timers are `Option<Pin<Box<Sleep>>>`: arming replaces, cancelling sets
//!   `None`, so at most one of each kind is ever pending
//! - The heartbeat timer is cancelled as soon as a failure is detected, so it
//!   only fires while the logical state is `Open`
//! - A failure starts the reconnect sequence at most once per generation;
//!   the close event that follows an error is reported but not acted on

use std::pin::Pin;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, Sleep};

use crate::connection::client::{Link, Shared};
use crate::connection::error::ConnectionError;
use crate::connection::handler::EventHandler;
use crate::connection::options::ConnectionConfig;
use crate::connection::state::{Generation, Lifecycle, ReadyState};
use crate::observability::metrics;
use crate::transport::{ConnectRequest, Connector, EventSender, TransportEvent, TransportEventKind};

type Timer = Option<Pin<Box<Sleep>>>;

pub(crate) struct Driver<C, H> {
    config: ConnectionConfig,
    connector: C,
    handler: H,
    shared: Arc<Shared>,
    events_tx: EventSender,
    events_rx: mpsc::UnboundedReceiver<TransportEvent>,
    generation: Generation,
    attempts: u32,
    heartbeat: Timer,
    reconnect: Timer,
    /// Generation that already started a reconnect sequence.
    failed: Option<Generation>,
    gave_up: bool,
    /// Whether this instance currently counts toward the connected gauge.
    connected: bool,
}

impl<C: Connector, H: EventHandler> Driver<C, H> {
    pub fn new(config: ConnectionConfig, connector: C, handler: H, shared: Arc<Shared>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config,
            connector,
            handler,
            shared,
            events_tx,
            events_rx,
            generation: Generation::FIRST,
            attempts: 0,
            heartbeat: None,
            reconnect: None,
            failed: None,
            gave_up: false,
            connected: false,
        }
    }

    /// Open the first transport handle.
    pub fn start(&mut self) {
        tracing::info!("Connecting");
        self.open_transport(Generation::FIRST);
    }

    pub async fn run(mut self) {
        loop {
            if self.shared.is_destroyed() {
                break;
            }

            tokio::select! {
                biased;
                _ = self.shared.destroyed() => break,
                Some(event) = self.events_rx.recv() => self.on_transport_event(event),
                _ = expired(&mut self.heartbeat) => {
                    self.heartbeat = None;
                    self.on_heartbeat_timer();
                }
                _ = expired(&mut self.reconnect) => {
                    self.reconnect = None;
                    self.on_reconnect_timer();
                }
            }
        }

        self.heartbeat = None;
        self.reconnect = None;
        self.shared.close_link();
        self.mark_disconnected();
        tracing::debug!("Control loop stopped");
    }

    fn on_transport_event(&mut self, event: TransportEvent) {
        if event.generation != self.generation {
            tracing::trace!(
                stale = %event.generation,
                current = %self.generation,
                "Discarding event from superseded transport"
            );
            metrics::record_stale_event();
            return;
        }

        match event.kind {
            TransportEventKind::Open => self.on_open(),
            TransportEventKind::Message(payload) => self.on_message(payload),
            TransportEventKind::Error(error) => {
                tracing::warn!(generation = %self.generation, error = %error, "Transport error");
                metrics::record_transport_error();
                self.notify(|h| h.on_error(&error));
                self.begin_recovery();
            }
            TransportEventKind::Close => {
                tracing::info!(generation = %self.generation, "Transport closed");
                self.mark_disconnected();
                self.notify(|h| h.on_close());
                if self.config.reconnect_on_close {
                    self.begin_recovery();
                } else if self.failed != Some(self.generation) {
                    self.shared.lifecycle.store(Lifecycle::Closed);
                }
            }
        }
    }

    fn on_open(&mut self) {
        tracing::info!(generation = %self.generation, "Connection open");
        metrics::record_open();
        self.mark_connected();

        self.attempts = 0;
        self.shared.attempts.store(0, Ordering::Release);
        self.gave_up = false;
        self.shared.lifecycle.store(Lifecycle::Open);

        if self.config.heartbeat_active() {
            self.arm_heartbeat();
        }
        self.notify(|h| h.on_open());
    }

    fn on_message(&mut self, payload: String) {
        if payload == self.config.heartbeat_payload {
            tracing::trace!("Heartbeat received");
        } else {
            metrics::record_message_received();
            self.notify(|h| h.on_message(payload));
        }

        // Any traffic proves liveness.
        if self.config.heartbeat_active() {
            self.arm_heartbeat();
        }
    }

    fn on_heartbeat_timer(&mut self) {
        let generation = self.generation;
        let live = self.shared.link.load_full().filter(|link| {
            link.generation == generation && link.transport.ready_state() == ReadyState::Open
        });

        let delivered =
            live.is_some_and(|link| link.transport.send(&self.config.heartbeat_payload));
        if delivered {
            metrics::record_heartbeat_sent();
            tracing::debug!(generation = %self.generation, "Heartbeat sent");
            self.arm_heartbeat();
            return;
        }

        tracing::warn!(generation = %self.generation, "Heartbeat could not be sent, transport is dead");
        metrics::record_liveness_failure();
        self.notify(|h| h.on_error(&ConnectionError::HeartbeatTimeout));
        self.begin_recovery();
    }

    fn on_reconnect_timer(&mut self) {
        self.attempts += 1;
        self.shared.attempts.store(self.attempts, Ordering::Release);
        metrics::record_reconnect();
        tracing::info!(
            attempt = self.attempts,
            max_attempts = self.config.max_reconnect_attempts,
            "Reconnecting"
        );
        self.open_transport(self.generation.next());
    }

    /// Start the reconnect sequence for the current generation, once.
    fn begin_recovery(&mut self) {
        if self.failed == Some(self.generation) {
            return;
        }
        self.failed = Some(self.generation);
        self.heartbeat = None;
        self.mark_disconnected();
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        self.reconnect = None;

        if self.attempts >= self.config.max_reconnect_attempts {
            self.shared.lifecycle.store(Lifecycle::GaveUp);
            if !self.gave_up {
                self.gave_up = true;
                tracing::warn!(attempts = self.attempts, "Reconnect budget exhausted, giving up");
                metrics::record_give_up();
                let attempts = self.attempts;
                self.notify(|h| h.on_give_up(attempts));
            }
            return;
        }

        let delay = self.config.reconnect_policy.delay(self.attempts + 1);
        tracing::info!(
            attempt = self.attempts + 1,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );
        self.shared.lifecycle.store(Lifecycle::Reconnecting);
        self.reconnect = Some(Box::pin(time::sleep(delay)));
    }

    fn arm_heartbeat(&mut self) {
        self.heartbeat = Some(Box::pin(time::sleep(self.config.heartbeat_interval)));
    }

    /// Replace the current transport with a fresh one tagged `generation`.
    fn open_transport(&mut self, generation: Generation) {
        if self.shared.is_destroyed() {
            return;
        }

        // The old handle is fully closed before the new one exists.
        self.mark_disconnected();
        self.shared.close_link();

        self.generation = generation;
        self.shared.generation.store(generation.as_u64(), Ordering::Release);
        self.shared.lifecycle.store(Lifecycle::Connecting);
        metrics::record_connect_attempt();

        let transport = self.connector.connect(ConnectRequest {
            url: self.config.url.clone(),
            generation,
            connect_timeout: self.config.connect_timeout,
            events: self.events_tx.clone(),
        });
        self.shared.link.store(Some(Arc::new(Link {
            generation,
            transport,
        })));

        // destroy() may have raced with the store above.
        if self.shared.is_destroyed() {
            self.shared.close_link();
        }
    }

    fn mark_connected(&mut self) {
        if !self.connected {
            self.connected = true;
            metrics::record_connected();
        }
    }

    fn mark_disconnected(&mut self) {
        if self.connected {
            self.connected = false;
            metrics::record_disconnected();
        }
    }

    /// Invoke the handler unless the connection has been destroyed.
    fn notify(&mut self, f: impl FnOnce(&mut H)) {
        if self.shared.is_destroyed() {
            return;
        }
        f(&mut self.handler);
    }
}

async fn expired(timer: &mut Timer) {
    match timer.as_mut() {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
