//! Sensor command definitions
//!
//! Commands are newline-terminated ASCII lines. The sensor echoes nothing;
//! each command is answered by one or more response lines (see
//! [`crate::response`]).

use std::fmt;

/// Commands understood by the sensor firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Begin enrollment of a new fingerprint under `slot_id`
    Enroll { slot_id: u32 },

    /// Remove the fingerprint template stored at `slot_id`
    Delete { slot_id: u32 },

    /// Capture the currently-presented fingerprint and attempt to match it
    Detect,
}

impl Command {
    /// Command verb as it appears on the wire
    pub fn name(self) -> &'static str {
        match self {
            Self::Enroll { .. } => "fp_enroll",
            Self::Delete { .. } => "fp_delete",
            Self::Detect => "fp_detect",
        }
    }

    /// Encode the command as a wire line (without the trailing newline)
    pub fn wire(self) -> String {
        match self {
            Self::Enroll { slot_id } => format!("fp_enroll {}", slot_id),
            Self::Delete { slot_id } => format!("fp_delete {}", slot_id),
            Self::Detect => "fp_detect".to_string(),
        }
    }

    /// Check if the command is answered by exactly one response line
    ///
    /// Enrollment is a multi-response exchange; delete and detect are
    /// single request/response pairs.
    pub fn is_single_response(self) -> bool {
        !matches!(self, Self::Enroll { .. })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_wire_encoding() {
        assert_eq!(Command::Enroll { slot_id: 1 }.wire(), "fp_enroll 1");
        assert_eq!(Command::Delete { slot_id: 42 }.wire(), "fp_delete 42");
        assert_eq!(Command::Detect.wire(), "fp_detect");
    }

    #[test]
    fn test_name() {
        assert_eq!(Command::Enroll { slot_id: 7 }.name(), "fp_enroll");
        assert_eq!(Command::Delete { slot_id: 7 }.name(), "fp_delete");
        assert_eq!(Command::Detect.name(), "fp_detect");
    }

    #[test]
    fn test_response_arity() {
        assert!(!Command::Enroll { slot_id: 1 }.is_single_response());
        assert!(Command::Delete { slot_id: 1 }.is_single_response());
        assert!(Command::Detect.is_single_response());
    }

    #[test]
    fn test_display_matches_wire() {
        let cmd = Command::Enroll { slot_id: 3 };
        assert_eq!(cmd.to_string(), cmd.wire());
    }
}
