//! Transport layer for the fingerprint sensor protocol
//!
//! Provides line-oriented channels to the sensor: a direct serial port and
//! a TCP bridge (ser2net style). The protocol itself only needs three I/O
//! primitives: write a line, read a line with a timeout, and check whether
//! bytes are waiting.

pub mod error;
pub mod serial;
pub mod tcp;

pub use error::{Error, Result};
pub use serial::SerialTransport;
pub use tcp::TcpTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;

/// Transport trait for different ways of reaching the sensor
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to the sensor
    async fn connect(&mut self) -> Result<()>;

    /// Disconnect from the sensor
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send one newline-terminated command line
    async fn write_line(&mut self, line: &str) -> Result<()>;

    /// Read one line, stripped of its terminator (with timeout)
    async fn read_line(&mut self, timeout: Duration) -> Result<String>;

    /// Check whether response bytes are waiting to be read
    async fn bytes_available(&mut self) -> Result<bool>;

    /// Get a printable name of the endpoint
    fn endpoint(&self) -> String;
}

/// Take one complete line off the front of `buf`, if present.
///
/// Strips the `\n` terminator and an optional preceding `\r`, then trims
/// surrounding whitespace the way the sensor firmware pads some lines.
/// A buffer growing past [`fpgate_core::MAX_LINE_LEN`] with no terminator
/// is a framing fault.
pub(crate) fn extract_line(buf: &mut BytesMut) -> Result<Option<String>> {
    let Some(pos) = buf.iter().position(|&b| b == b'\n') else {
        if buf.len() > fpgate_core::MAX_LINE_LEN {
            return Err(Error::LineTooLong {
                len: buf.len(),
                max: fpgate_core::MAX_LINE_LEN,
            });
        }
        return Ok(None);
    };

    let raw = buf.split_to(pos + 1);
    let raw = &raw[..pos];
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

    match std::str::from_utf8(raw) {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(_) => Err(Error::InvalidLine {
            bytes: hex::encode(raw),
        }),
    }
}
