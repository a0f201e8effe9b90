//! Protocol constants

/// Default serial baud rate for the sensor bridge firmware
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default timeout for a single line read (seconds)
pub const DEFAULT_READ_TIMEOUT: u64 = 5;

/// Default wall-clock bound on a full enrollment exchange (seconds)
pub const DEFAULT_ENROLL_DEADLINE: u64 = 60;

/// Default wall-clock bound on single-response commands (seconds)
pub const DEFAULT_RESPONSE_DEADLINE: u64 = 10;

/// Pause between reads while the enrollment exchange is in progress (milliseconds)
///
/// The firmware paces enrollment around finger placement; reading faster
/// than this only burns cycles on empty reads.
pub const ENROLL_POLL_INTERVAL_MS: u64 = 1000;

/// Availability poll cadence for single-response commands (milliseconds)
pub const LINE_POLL_INTERVAL_MS: u64 = 50;

/// Response line literals emitted by the sensor firmware
pub mod lines {
    /// Enrollment: place finger on the sensor
    pub const ENROLL_PRESS: &str = "fp_enroll_press";

    /// Enrollment: remove finger from the sensor
    pub const ENROLL_REMOVE: &str = "fp_enroll_remove";

    /// Enrollment: place the same finger again
    pub const ENROLL_PRESS_AGAIN: &str = "fp_enroll_press_again";

    /// Enrollment stored the template
    pub const ENROLL_OK: &str = "fp_enroll_ok";

    /// Deletion removed the template
    pub const DELETE_OK: &str = "fp_delete_ok";

    /// Detection matched a template; followed by the slot id
    pub const DETECT_OK: &str = "fp_detect_ok";
}

/// Terminal enrollment failure literals
///
/// The firmware reports these verbatim; each one ends the enrollment
/// exchange with the template not stored.
pub const ENROLL_FAILURES: [&str; 8] = [
    "fp_enroll_fail",
    "Communication error",
    "Imaging error",
    "Unknown error",
    "Image too messy",
    "Could not find fingerprint features",
    "Error writing to flash",
    "Could not store in that location",
];

/// Suffixes of sensor diagnostic lines interleaved with enrollment steps
pub const TELEMETRY_SUFFIXES: [&str; 2] = ["Image taken", "Image converted"];
