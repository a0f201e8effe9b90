//! Error types for fpgate-core

/// Result type alias for core protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid session state
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    /// Sensor reported a failure; reason is the verbatim firmware literal
    #[error("Sensor reported: {reason}")]
    DeviceError { reason: String },

    /// Response line outside what the command allows
    #[error("Unexpected response to {command}: {line:?}")]
    UnexpectedResponse {
        command: &'static str,
        line: String,
    },

    /// Response line recognized but missing or corrupting a required field
    #[error("Malformed response: {line:?}")]
    MalformedResponse { line: String },

    /// Sensor stopped answering before a terminal response
    #[error("Device unresponsive: no terminal response within {seconds}s")]
    Timeout { seconds: u64 },
}

impl Error {
    /// Check if error is recoverable (re-invoking the operation might succeed)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::DeviceError { .. }
                | Self::UnexpectedResponse { .. }
                | Self::MalformedResponse { .. }
        )
    }

    /// Check if error requires reconnection
    pub fn requires_reconnect(&self) -> bool {
        matches!(self, Self::InvalidSessionState(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_reason_verbatim() {
        let err = Error::DeviceError {
            reason: "Image too messy".into(),
        };
        assert_eq!(err.to_string(), "Sensor reported: Image too messy");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_timeout_display() {
        let err = Error::Timeout { seconds: 60 };
        assert!(err.to_string().contains("60s"));
        assert!(err.is_recoverable());
        assert!(!err.requires_reconnect());
    }
}
