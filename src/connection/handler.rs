//! Observer hooks invoked by the control loop toward the connection's owner.

use crate::connection::error::ConnectionError;

/// Receives lifecycle and message notifications from a `ResilientConnection`.
///
/// All methods run on the connection's control loop, one at a time. They
/// must not block; hand heavy work off to another task.
pub trait EventHandler: Send + 'static {
    /// A non-heartbeat payload arrived, passed through verbatim.
    fn on_message(&mut self, payload: String);

    /// The transport opened (initially or after a reconnect).
    fn on_open(&mut self) {}

    /// The transport failed, or the heartbeat found it dead.
    fn on_error(&mut self, _error: &ConnectionError) {}

    /// The transport closed.
    fn on_close(&mut self) {}

    /// The reconnect budget is exhausted; nothing further will be attempted.
    fn on_give_up(&mut self, _attempts: u32) {}
}

type Hook = Box<dyn FnMut() + Send>;

/// Closure-based `EventHandler`. Only the message callback is required.
pub struct Callbacks {
    on_message: Box<dyn FnMut(String) + Send>,
    on_open: Option<Hook>,
    on_error: Option<Box<dyn FnMut(&ConnectionError) + Send>>,
    on_close: Option<Hook>,
    on_give_up: Option<Box<dyn FnMut(u32) + Send>>,
}

impl Callbacks {
    pub fn new(on_message: impl FnMut(String) + Send + 'static) -> Self {
        Self {
            on_message: Box::new(on_message),
            on_open: None,
            on_error: None,
            on_close: None,
            on_give_up: None,
        }
    }

    pub fn on_open(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_open = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&ConnectionError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_close(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    pub fn on_give_up(mut self, f: impl FnMut(u32) + Send + 'static) -> Self {
        self.on_give_up = Some(Box::new(f));
        self
    }
}

impl EventHandler for Callbacks {
    fn on_message(&mut self, payload: String) {
        (self.on_message)(payload);
    }

    fn on_open(&mut self) {
        if let Some(f) = self.on_open.as_mut() {
            f();
        }
    }

    fn on_error(&mut self, error: &ConnectionError) {
        if let Some(f) = self.on_error.as_mut() {
            f(error);
        }
    }

    fn on_close(&mut self) {
        if let Some(f) = self.on_close.as_mut() {
            f();
        }
    }

    fn on_give_up(&mut self, attempts: u32) {
        if let Some(f) = self.on_give_up.as_mut() {
            f(attempts);
        }
    }
}
