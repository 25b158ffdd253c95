//! Connection state and generation tracking.
//!
//! # States
//! - Connecting: a transport handle is being opened
//! - Open: the current transport reported open
//! - Reconnecting: the current transport failed, a reconnect is scheduled
//! - GaveUp: reconnect budget exhausted, nothing further is scheduled
//! - Destroyed: terminal, no timers and no transports
//!
//! # State Transitions
//! ```text
//! Connecting → Open: transport open event
//! Open → Reconnecting: transport error, or heartbeat finds transport not open
//! Reconnecting → Connecting: reconnect timer fires, fresh handle opened
//! Reconnecting → GaveUp: attempts >= max_reconnect_attempts
//! any → Destroyed: destroy()
//! ```
//!
//! # Design Decisions
//! - Raw transport status (`ReadyState`) is tracked separately from the
//!   logical lifecycle; a clean remote close leaves the lifecycle untouched
//! - Both are stored as `AtomicU8` so accessors never lock

use std::sync::atomic::{AtomicU8, Ordering};

/// Tag attached to every transport handle and to every event it emits.
///
/// Generations increase by one per handle within a single connection
/// instance, so an event whose generation is not the current one came from a
/// superseded handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// The generation of the first handle.
    pub const FIRST: Generation = Generation(1);

    /// The generation of the handle that replaces this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Get the raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Raw status of the underlying transport.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl From<u8> for ReadyState {
    fn from(val: u8) -> Self {
        match val {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            2 => ReadyState::Closing,
            _ => ReadyState::Closed,
        }
    }
}

impl std::fmt::Display for ReadyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReadyState::Connecting => "connecting",
            ReadyState::Open => "open",
            ReadyState::Closing => "closing",
            ReadyState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Logical state of a resilient connection.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Connecting = 0,
    Open = 1,
    Reconnecting = 2,
    GaveUp = 3,
    /// Closed by the peer with no reconnect scheduled. A heartbeat still
    /// armed from the open period may yet move this to `Reconnecting`.
    Closed = 4,
    Destroyed = 5,
}

impl From<u8> for Lifecycle {
    fn from(val: u8) -> Self {
        match val {
            0 => Lifecycle::Connecting,
            1 => Lifecycle::Open,
            2 => Lifecycle::Reconnecting,
            3 => Lifecycle::GaveUp,
            4 => Lifecycle::Closed,
            _ => Lifecycle::Destroyed,
        }
    }
}

/// Atomic cell holding a `ReadyState`.
#[derive(Debug)]
pub struct AtomicReadyState(AtomicU8);

impl AtomicReadyState {
    pub fn new(state: ReadyState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn load(&self) -> ReadyState {
        ReadyState::from(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, state: ReadyState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move from `from` to `to` only if the current state is `from`.
    pub fn transition(&self, from: ReadyState, to: ReadyState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Move to `Closed` unless already there. Returns the previous state.
    pub fn close(&self) -> ReadyState {
        ReadyState::from(self.0.swap(ReadyState::Closed as u8, Ordering::AcqRel))
    }
}

/// Atomic cell holding a `Lifecycle`.
#[derive(Debug)]
pub struct AtomicLifecycle(AtomicU8);

impl AtomicLifecycle {
    pub fn new(state: Lifecycle) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn load(&self) -> Lifecycle {
        Lifecycle::from(self.0.load(Ordering::Acquire))
    }

    /// Store a new state. `Destroyed` is sticky and is never overwritten.
    pub fn store(&self, state: Lifecycle) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current == Lifecycle::Destroyed as u8 {
                    None
                } else {
                    Some(state as u8)
                }
            });
    }
}
