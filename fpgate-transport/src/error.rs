//! Transport errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("Read timeout")]
    ReadTimeout,

    #[error("Connection closed by remote")]
    ConnectionClosed,

    #[error("Failed to open {port}: {source}")]
    OpenFailed {
        port: String,
        source: serialport::Error,
    },

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Line is not valid UTF-8 (bytes: {bytes})")]
    InvalidLine { bytes: String },

    #[error("Line exceeds {max} bytes without a terminator ({len} buffered)")]
    LineTooLong { len: usize, max: usize },
}
