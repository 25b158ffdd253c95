//! Scripted in-memory transport for driving the control loop in tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

use crate::connection::error::ConnectionError;
use crate::connection::state::{AtomicReadyState, Generation, ReadyState};
use crate::transport::{ConnectRequest, Connector, TransportEventKind, TransportHandle};

/// Records every handle it opens; tests script events on them.
#[derive(Clone, Default)]
pub struct MockConnector {
    links: Arc<Mutex<Vec<Arc<MockLink>>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles opened so far.
    pub fn connects(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    /// The n-th opened handle, zero based.
    pub fn link(&self, index: usize) -> Arc<MockLink> {
        Arc::clone(&self.links.lock().unwrap()[index])
    }

    /// The most recently opened handle.
    pub fn latest(&self) -> Arc<MockLink> {
        let links = self.links.lock().unwrap();
        Arc::clone(links.last().expect("no handle opened yet"))
    }
}

impl Connector for MockConnector {
    fn connect(&self, request: ConnectRequest) -> Box<dyn TransportHandle> {
        let link = Arc::new(MockLink {
            state: AtomicReadyState::new(ReadyState::Connecting),
            sent: Mutex::new(Vec::new()),
            refuse_writes: AtomicBool::new(false),
            request,
        });
        self.links.lock().unwrap().push(Arc::clone(&link));
        Box::new(MockHandle(link))
    }
}

/// One scripted transport handle.
pub struct MockLink {
    state: AtomicReadyState,
    sent: Mutex<Vec<String>>,
    refuse_writes: AtomicBool,
    request: ConnectRequest,
}

impl MockLink {
    pub fn generation(&self) -> Generation {
        self.request.generation
    }

    pub fn url(&self) -> &Url {
        &self.request.url
    }

    pub fn ready_state(&self) -> ReadyState {
        self.state.load()
    }

    /// Payloads written through this handle.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn open(&self) {
        self.state.store(ReadyState::Open);
        self.request.emit(TransportEventKind::Open);
    }

    pub fn message(&self, payload: &str) {
        self.request.emit(TransportEventKind::Message(payload.to_string()));
    }

    pub fn error(&self, reason: &str) {
        self.state.store(ReadyState::Closed);
        self.request
            .emit(TransportEventKind::Error(ConnectionError::Transport(reason.to_string())));
    }

    /// Remote close: the transport goes away and reports it.
    pub fn close(&self) {
        self.state.store(ReadyState::Closed);
        self.request.emit(TransportEventKind::Close);
    }

    /// Stay open but reject every write.
    pub fn refuse_writes(&self) {
        self.refuse_writes.store(true, Ordering::SeqCst);
    }

    /// Transport dies without reporting anything.
    pub fn vanish(&self) {
        self.state.store(ReadyState::Closed);
    }
}

struct MockHandle(Arc<MockLink>);

impl TransportHandle for MockHandle {
    fn send(&self, payload: &str) -> bool {
        if self.0.state.load() != ReadyState::Open || self.0.refuse_writes.load(Ordering::SeqCst) {
            return false;
        }
        self.0.sent.lock().unwrap().push(payload.to_string());
        true
    }

    fn close(&self) {
        if self.0.state.close() != ReadyState::Closed {
            self.0.request.emit(TransportEventKind::Close);
        }
    }

    fn ready_state(&self) -> ReadyState {
        self.0.state.load()
    }
}
