//! # fpgate
//!
//! Sessions against a serial fingerprint sensor, with a persistent
//! username registry.
//!
//! ## Features
//!
//! - Line-oriented sensor protocol (enroll / delete / detect)
//! - Async/await API using Tokio; no operation blocks a caller thread
//! - Deadline-bounded exchanges, typed error taxonomy
//! - Flat-file user registry, rewritten on every confirmed change
//! - Session event stream for debug panes and user prompts
//!
//! ## Quick Start
//!
//! ```no_run
//! use fpgate::Device;
//!
//! #[tokio::main]
//! async fn main() -> fpgate::Result<()> {
//!     // Connect to the sensor bridge
//!     let mut device = Device::new("/dev/ttyUSB0", 9600);
//!     device.connect().await?;
//!
//!     // Who is at the sensor?
//!     let outcome = device.verify().await?;
//!     println!("{}", outcome);
//!
//!     // Disconnect
//!     device.disconnect().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod error;
pub mod events;
pub mod registry;

// Re-exports
pub use device::Device;
pub use error::{Error, Result};
pub use events::{EventKind, SessionEvent};
pub use registry::UserRegistry;

// Re-export types
pub use fpgate_core::{Command, EnrollPrompt, Response, Session};
pub use fpgate_types::{UserRecord, Verification};
