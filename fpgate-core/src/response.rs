//! Response line classification
//!
//! The sensor answers commands with newline-terminated status lines. A
//! single classifier maps each line to a tagged variant; the operation in
//! progress decides which variants are terminal for it.
//!
//! # Examples
//!
//! ```
//! use fpgate_core::{classify, EnrollPrompt, Response};
//!
//! assert_eq!(classify("fp_enroll_press"), Response::Prompt(EnrollPrompt::PlaceFinger));
//! assert_eq!(classify("fp_enroll_ok"), Response::EnrollOk);
//! assert_eq!(
//!     classify("fp_detect_ok 3"),
//!     Response::Detected { slot: Some("3".to_string()) }
//! );
//! ```

use std::fmt;

use crate::constants::{lines, ENROLL_FAILURES, TELEMETRY_SUFFIXES};

/// Enrollment progress prompts meant for the person at the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollPrompt {
    /// Place a finger on the sensor
    PlaceFinger,

    /// Remove the finger
    RemoveFinger,

    /// Place the same finger again
    PlaceFingerAgain,
}

impl fmt::Display for EnrollPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::PlaceFinger => "place finger",
            Self::RemoveFinger => "remove finger",
            Self::PlaceFingerAgain => "place finger again",
        };
        write!(f, "{}", text)
    }
}

/// Classified sensor response line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Progress prompt during enrollment
    Prompt(EnrollPrompt),

    /// Sensor diagnostic line (image capture progress)
    Telemetry(String),

    /// Enrollment stored the template
    EnrollOk,

    /// Enrollment failed; reason is the verbatim firmware literal
    EnrollFailed(String),

    /// Deletion removed the template
    DeleteOk,

    /// Detection matched a template
    ///
    /// `slot` is the second whitespace-separated field of the line, kept
    /// as a string: registry lookups compare it textually.
    Detected { slot: Option<String> },

    /// Line not part of the known protocol vocabulary
    Unrecognized(String),
}

impl Response {
    /// Check if this response ends an enrollment exchange
    pub fn ends_enrollment(&self) -> bool {
        matches!(self, Self::EnrollOk | Self::EnrollFailed(_))
    }

    /// Check if this is a progress prompt
    pub fn is_prompt(&self) -> bool {
        matches!(self, Self::Prompt(_))
    }
}

/// Classify one response line
///
/// Lines are expected with the trailing newline already stripped, as the
/// transport delivers them. Classification is total; lines outside the
/// protocol vocabulary come back as [`Response::Unrecognized`].
pub fn classify(line: &str) -> Response {
    match line {
        lines::ENROLL_PRESS => return Response::Prompt(EnrollPrompt::PlaceFinger),
        lines::ENROLL_REMOVE => return Response::Prompt(EnrollPrompt::RemoveFinger),
        lines::ENROLL_PRESS_AGAIN => return Response::Prompt(EnrollPrompt::PlaceFingerAgain),
        lines::ENROLL_OK => return Response::EnrollOk,
        lines::DELETE_OK => return Response::DeleteOk,
        _ => {}
    }

    if line.starts_with(lines::DETECT_OK) {
        let slot = line.split_whitespace().nth(1).map(str::to_string);
        return Response::Detected { slot };
    }

    if ENROLL_FAILURES.contains(&line) {
        return Response::EnrollFailed(line.to_string());
    }

    if TELEMETRY_SUFFIXES.iter().any(|s| line.ends_with(s)) {
        return Response::Telemetry(line.to_string());
    }

    Response::Unrecognized(line.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_prompts() {
        assert_eq!(
            classify("fp_enroll_press"),
            Response::Prompt(EnrollPrompt::PlaceFinger)
        );
        assert_eq!(
            classify("fp_enroll_remove"),
            Response::Prompt(EnrollPrompt::RemoveFinger)
        );
        assert_eq!(
            classify("fp_enroll_press_again"),
            Response::Prompt(EnrollPrompt::PlaceFingerAgain)
        );
    }

    #[test]
    fn test_terminals() {
        assert_eq!(classify("fp_enroll_ok"), Response::EnrollOk);
        assert_eq!(classify("fp_delete_ok"), Response::DeleteOk);
        assert!(classify("fp_enroll_ok").ends_enrollment());
        assert!(!classify("fp_enroll_press").ends_enrollment());
    }

    #[test]
    fn test_every_failure_literal() {
        for literal in ENROLL_FAILURES {
            let response = classify(literal);
            assert_eq!(response, Response::EnrollFailed(literal.to_string()));
            assert!(response.ends_enrollment());
        }
    }

    #[test]
    fn test_detect_with_slot() {
        assert_eq!(
            classify("fp_detect_ok 3"),
            Response::Detected {
                slot: Some("3".to_string())
            }
        );
    }

    #[test]
    fn test_detect_without_slot() {
        assert_eq!(classify("fp_detect_ok"), Response::Detected { slot: None });
    }

    #[test]
    fn test_telemetry_suffixes() {
        assert_eq!(
            classify("Fingerprint sensor: Image taken"),
            Response::Telemetry("Fingerprint sensor: Image taken".to_string())
        );
        assert_eq!(
            classify("Image converted"),
            Response::Telemetry("Image converted".to_string())
        );
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(
            classify("no_match"),
            Response::Unrecognized("no_match".to_string())
        );
        assert_eq!(classify(""), Response::Unrecognized(String::new()));
    }

    proptest! {
        #[test]
        fn classification_is_total(line in ".*") {
            let _ = classify(&line);
        }

        #[test]
        fn unrecognized_preserves_line(line in "[a-z_ ]{1,40}") {
            if let Response::Unrecognized(raw) = classify(&line) {
                prop_assert_eq!(raw, line);
            }
        }

        #[test]
        fn detect_slot_is_second_field(slot in 0u32..100_000) {
            let line = format!("fp_detect_ok {}", slot);
            prop_assert_eq!(
                classify(&line),
                Response::Detected { slot: Some(slot.to_string()) }
            );
        }
    }
}
