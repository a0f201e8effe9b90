//! Session state tracking
//!
//! A session represents one connection to a sensor and tracks the single
//! in-flight operation. The sensor cannot interleave exchanges, so at most
//! one operation may be pending at any time; starting a second one before
//! the first reaches a terminal outcome is a state error.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};

/// Operation currently in flight on the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingOperation {
    /// Enrollment exchange under way for `slot_id`
    Enrolling { slot_id: u32 },

    /// Deletion of `username`'s template at `slot_id`
    Deleting { username: String, slot_id: u32 },

    /// Detection/match in progress
    Verifying,
}

/// Session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Not connected
    Disconnected,

    /// Connected, no operation in flight
    Idle,

    /// Connected with an operation in flight
    Busy(PendingOperation),
}

/// Session tracker
///
/// Thread-safe and cheap to clone (Arc internally).
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    state: parking_lot::RwLock<SessionState>,
}

impl Session {
    /// Create a new disconnected session
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                state: parking_lot::RwLock::new(SessionState::Disconnected),
            }),
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.inner.state.read().clone()
    }

    /// Check if connected
    pub fn is_open(&self) -> bool {
        !matches!(self.state(), SessionState::Disconnected)
    }

    /// Check if an operation is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self.state(), SessionState::Busy(_))
    }

    /// Get the pending operation, if any
    pub fn pending(&self) -> Option<PendingOperation> {
        match self.state() {
            SessionState::Busy(op) => Some(op),
            _ => None,
        }
    }

    /// Mark the session as connected and idle
    pub fn open(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Disconnected {
            return Err(Error::InvalidSessionState(format!(
                "cannot open from state: {:?}",
                *state
            )));
        }

        *state = SessionState::Idle;
        debug!("Session opened");
        Ok(())
    }

    /// Begin an operation
    ///
    /// Fails unless the session is idle: operations run to a terminal
    /// outcome before the next may start.
    pub fn begin(&self, op: PendingOperation) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Idle {
            return Err(Error::InvalidSessionState(format!(
                "cannot begin {:?} from state: {:?}",
                op, *state
            )));
        }

        debug!("Session busy: {:?}", op);
        *state = SessionState::Busy(op);
        Ok(())
    }

    /// Mark the in-flight operation as finished (success or failure)
    pub fn finish(&self) {
        let mut state = self.inner.state.write();

        if matches!(*state, SessionState::Busy(_)) {
            *state = SessionState::Idle;
        }
    }

    /// Close the session
    pub fn close(&self) {
        *self.inner.state.write() = SessionState::Disconnected;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
