//! Public handle of a resilient connection.
//!
//! # Responsibilities
//! - Construct the control loop and open the first transport
//! - Synchronous `send`, `destroy` and status accessors
//! - Destroy on drop
//!
//! # Design Decisions
//! - The current transport is published through `ArcSwapOption`, so `send`
//!   and `status` read it without locking and without a round trip through
//!   the control loop
//! - `destroy` flips an atomic flag first; the loop checks it before every
//!   dispatch and every callback, which makes it safe from inside callbacks

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use arc_swap::ArcSwapOption;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::connection::driver::Driver;
use crate::connection::handler::EventHandler;
use crate::connection::options::ConnectionConfig;
use crate::connection::state::{AtomicLifecycle, Generation, Lifecycle, ReadyState};
use crate::transport::{Connector, TransportHandle, WsConnector};

/// The transport currently owned by a connection.
pub(crate) struct Link {
    pub generation: Generation,
    pub transport: Box<dyn TransportHandle>,
}

/// State shared between the public handle and the control loop.
///
/// Only the control loop writes `link`, `lifecycle`, `attempts` and
/// `generation`; handles only read them (and clear `link` on destroy).
pub(crate) struct Shared {
    pub id: Uuid,
    pub link: ArcSwapOption<Link>,
    pub lifecycle: AtomicLifecycle,
    pub attempts: AtomicU32,
    pub generation: AtomicU64,
    destroyed: AtomicBool,
    wake: Notify,
}

impl Shared {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            link: ArcSwapOption::empty(),
            lifecycle: AtomicLifecycle::new(Lifecycle::Connecting),
            attempts: AtomicU32::new(0),
            generation: AtomicU64::new(0),
            destroyed: AtomicBool::new(false),
            wake: Notify::new(),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Resolves once `destroy` has been called.
    pub async fn destroyed(&self) {
        self.wake.notified().await;
    }

    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.lifecycle.store(Lifecycle::Destroyed);
        self.close_link();
        self.wake.notify_one();
        tracing::debug!(client_id = %self.id, "Connection destroyed");
    }

    /// Close and drop the current transport, if any.
    pub fn close_link(&self) {
        if let Some(link) = self.link.swap(None) {
            link.transport.close();
        }
    }
}

/// Cloneable reference to a connection, for use inside callbacks or other
/// tasks. Unlike `ResilientConnection` it does not destroy on drop.
#[derive(Clone)]
pub struct ConnectionHandle {
    shared: Arc<Shared>,
}

impl ConnectionHandle {
    /// Transmit `payload` if the transport is open; otherwise drop it.
    ///
    /// Returns whether the payload was handed to the transport. Nothing is
    /// queued or retried.
    pub fn send(&self, payload: impl AsRef<str>) -> bool {
        if self.shared.is_destroyed() {
            return false;
        }
        let link = self.shared.link.load();
        match link.as_ref() {
            Some(link) if link.transport.ready_state() == ReadyState::Open => {
                link.transport.send(payload.as_ref())
            }
            _ => {
                tracing::debug!(client_id = %self.shared.id, "Transport not open, dropping payload");
                false
            }
        }
    }

    /// Close the transport and cancel both timers. Terminal and idempotent.
    pub fn destroy(&self) {
        self.shared.destroy();
    }

    /// Raw status of the current transport.
    pub fn status(&self) -> ReadyState {
        self.shared
            .link
            .load()
            .as_ref()
            .map(|link| link.transport.ready_state())
            .unwrap_or(ReadyState::Closed)
    }

    /// Logical state of the connection.
    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.lifecycle.load()
    }

    /// Reconnect attempts since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.attempts.load(Ordering::Acquire)
    }

    /// Generation of the current transport handle.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }

    /// Identifier carried in this connection's tracing span.
    pub fn id(&self) -> Uuid {
        self.shared.id
    }
}

/// A logically continuous message channel over a replaceable transport.
///
/// Owns one transport handle at a time, a heartbeat timer and a reconnect
/// timer, all driven by a dedicated control-loop task. Dropping the value
/// destroys the connection.
pub struct ResilientConnection {
    handle: ConnectionHandle,
    driver: Option<JoinHandle<()>>,
}

impl ResilientConnection {
    /// Connect over WebSocket.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn connect<H: EventHandler>(config: ConnectionConfig, handler: H) -> Self {
        Self::with_connector(config, WsConnector, handler)
    }

    /// Connect through an arbitrary transport.
    ///
    /// The first transport handle is opened before this returns, so
    /// `status()` reports `Connecting` immediately.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn with_connector<C: Connector, H: EventHandler>(
        config: ConnectionConfig,
        connector: C,
        handler: H,
    ) -> Self {
        let shared = Arc::new(Shared::new());
        let span = tracing::info_span!("ws_client", client_id = %shared.id, url = %config.url);

        let mut driver = Driver::new(config, connector, handler, Arc::clone(&shared));
        span.in_scope(|| driver.start());
        let task = tokio::spawn(driver.run().instrument(span));

        Self {
            handle: ConnectionHandle { shared },
            driver: Some(task),
        }
    }

    /// A cloneable handle to this connection.
    pub fn handle(&self) -> ConnectionHandle {
        self.handle.clone()
    }

    /// See [`ConnectionHandle::send`].
    pub fn send(&self, payload: impl AsRef<str>) -> bool {
        self.handle.send(payload)
    }

    /// See [`ConnectionHandle::destroy`].
    pub fn destroy(&self) {
        self.handle.destroy();
    }

    /// Raw status of the current transport.
    pub fn status(&self) -> ReadyState {
        self.handle.status()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.handle.lifecycle()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.handle.reconnect_attempts()
    }

    pub fn generation(&self) -> u64 {
        self.handle.generation()
    }

    /// Destroy and wait for the control loop to exit.
    pub async fn shutdown(mut self) {
        self.handle.destroy();
        if let Some(task) = self.driver.take() {
            if let Err(e) = task.await {
                tracing::error!(client_id = %self.handle.shared.id, error = %e, "Control loop terminated abnormally");
            }
        }
    }
}

impl Drop for ResilientConnection {
    fn drop(&mut self) {
        self.handle.destroy();
    }
}
