//! Type definitions for fpgate

pub mod error;
pub mod user;

pub use error::{Error, Result};
pub use user::{validate_username, UserRecord, Verification};
