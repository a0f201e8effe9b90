//! # fpgate-core
//!
//! Core protocol implementation for serial fingerprint sensors.
//!
//! This crate provides the low-level protocol primitives:
//! - Command definitions and wire encoding
//! - Response line classification
//! - Session state tracking
//! - Protocol constants

pub mod command;
pub mod constants;
pub mod error;
pub mod response;
pub mod session;

pub use command::Command;
pub use error::{Error, Result};
pub use response::{classify, EnrollPrompt, Response};
pub use session::{PendingOperation, Session, SessionState};

/// Protocol version information
pub const PROTOCOL_VERSION: &str = "1.0";

/// Maximum accepted response line length in bytes
///
/// The sensor firmware emits short status lines; anything beyond this is
/// treated as a framing fault by the transport.
pub const MAX_LINE_LEN: usize = 512;
