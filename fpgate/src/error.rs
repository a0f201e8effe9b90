//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] fpgate_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] fpgate_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] fpgate_types::Error),

    #[error("Device not connected")]
    NotConnected,

    #[error("Registry storage error: {0}")]
    Storage(#[from] std::io::Error),
}
