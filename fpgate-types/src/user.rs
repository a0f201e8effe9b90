//! User identity structures

use std::fmt;

use crate::error::{Error, Result};

/// A registered user
///
/// Maps a human-readable username to the slot id under which the sensor
/// stores that user's fingerprint template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Username (unique within a registry)
    pub username: String,

    /// Slot id on the device (positive)
    pub slot_id: u32,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, slot_id: u32) -> Self {
        Self {
            username: username.into(),
            slot_id,
        }
    }
}

impl fmt::Display for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (slot {})", self.username, self.slot_id)
    }
}

/// Outcome of a successful fingerprint verification
///
/// A matched finger that no registry record maps to is still a detection
/// success; it carries the device-reported slot id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The matched slot maps to a registered user
    Known { username: String, slot_id: u32 },

    /// The device matched a finger, but no user record has this slot
    Unknown { slot_id: u32 },
}

impl Verification {
    /// Slot id reported by the device
    pub fn slot_id(&self) -> u32 {
        match self {
            Self::Known { slot_id, .. } | Self::Unknown { slot_id } => *slot_id,
        }
    }

    /// Username if the slot maps to a registered user
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Known { username, .. } => Some(username),
            Self::Unknown { .. } => None,
        }
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known { username, slot_id } => write!(f, "{} (slot {})", username, slot_id),
            Self::Unknown { slot_id } => write!(f, "unknown user (slot {})", slot_id),
        }
    }
}

/// Validate a username before it reaches the device or the registry file.
///
/// Usernames are one registry column: they must be non-empty and must not
/// contain the column separator or line breaks.
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(Error::Validation("username must not be empty".into()));
    }

    if username.contains(['\t', '\n', '\r']) {
        return Err(Error::Validation(format!(
            "username {:?} contains tab or line break characters",
            username
        )));
    }

    Ok(())
}
