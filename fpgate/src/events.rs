//! Session event stream
//!
//! Every command line sent, every response line received, and every
//! enrollment prompt is published to subscribers. A presentation layer
//! renders these in a debug pane or as user-facing prompts instead of
//! blocking on the exchange itself.

use std::fmt;

use chrono::{DateTime, Utc};
use fpgate_core::EnrollPrompt;

/// One observable moment in a device session
#[derive(Debug, Clone)]
pub struct SessionEvent {
    /// When the event happened
    pub at: DateTime<Utc>,

    /// What happened
    pub kind: EventKind,
}

/// Event payload
#[derive(Debug, Clone)]
pub enum EventKind {
    /// Command line written to the sensor
    LineSent(String),

    /// Response line read from the sensor
    LineReceived(String),

    /// Enrollment progress prompt for the person at the sensor
    Prompt(EnrollPrompt),
}

impl SessionEvent {
    pub(crate) fn sent(line: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            kind: EventKind::LineSent(line.into()),
        }
    }

    pub(crate) fn received(line: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            kind: EventKind::LineReceived(line.into()),
        }
    }

    pub(crate) fn prompt(prompt: EnrollPrompt) -> Self {
        Self {
            at: Utc::now(),
            kind: EventKind::Prompt(prompt),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineSent(line) => write!(f, "Sent: {}", line),
            Self::LineReceived(line) => write!(f, "Received: {}", line),
            Self::Prompt(prompt) => write!(f, "Prompt: {}", prompt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        assert_eq!(
            EventKind::LineSent("fp_detect".into()).to_string(),
            "Sent: fp_detect"
        );
        assert_eq!(
            EventKind::Prompt(EnrollPrompt::PlaceFinger).to_string(),
            "Prompt: place finger"
        );
    }
}
