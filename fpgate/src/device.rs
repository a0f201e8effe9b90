//! High-level device interface

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use fpgate_core::{
    classify, constants, Command, PendingOperation, Response, Session,
};
use fpgate_transport::{SerialTransport, Transport};
use fpgate_types::{validate_username, UserRecord, Verification};

use crate::error::{Error, Result};
use crate::events::SessionEvent;
use crate::registry::UserRegistry;

/// Default registry file, relative to the working directory
pub const DEFAULT_REGISTRY_PATH: &str = "users.tsv";

/// Buffered session events per subscriber
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Fingerprint sensor device
///
/// High-level interface for one sensor session: enrollment, deletion and
/// verification of fingerprints, with the username registry kept in sync
/// once the sensor confirms each change.
///
/// # Examples
///
/// ```no_run
/// use fpgate::Device;
///
/// #[tokio::main]
/// async fn main() -> fpgate::Result<()> {
///     let mut device = Device::new("/dev/ttyUSB0", 9600);
///
///     device.connect().await?;
///
///     let record = device.enroll("alice").await?;
///     println!("Enrolled: {}", record);
///
///     device.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct Device {
    transport: Box<dyn Transport>,
    session: Session,
    registry: Option<UserRegistry>,
    registry_path: PathBuf,
    read_timeout: Duration,
    poll_interval: Duration,
    line_poll_interval: Duration,
    enroll_deadline: Duration,
    response_deadline: Duration,
    events: broadcast::Sender<SessionEvent>,
}

impl Device {
    /// Create a new device on a local serial port
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self::with_transport(Box::new(SerialTransport::new(port_name, baud_rate)))
    }

    /// Create a new device over an arbitrary transport
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            transport,
            session: Session::new(),
            registry: None,
            registry_path: PathBuf::from(DEFAULT_REGISTRY_PATH),
            read_timeout: Duration::from_secs(constants::DEFAULT_READ_TIMEOUT),
            poll_interval: Duration::from_millis(constants::ENROLL_POLL_INTERVAL_MS),
            line_poll_interval: Duration::from_millis(constants::LINE_POLL_INTERVAL_MS),
            enroll_deadline: Duration::from_secs(constants::DEFAULT_ENROLL_DEADLINE),
            response_deadline: Duration::from_secs(constants::DEFAULT_RESPONSE_DEADLINE),
            events,
        }
    }

    /// Set the registry file path
    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = path.into();
        self
    }

    /// Set the timeout for a single line read
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the pause between reads during enrollment
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the wall-clock bound on a full enrollment exchange
    pub fn with_enroll_deadline(mut self, deadline: Duration) -> Self {
        self.enroll_deadline = deadline;
        self
    }

    /// Set the wall-clock bound on single-response commands
    pub fn with_response_deadline(mut self, deadline: Duration) -> Self {
        self.response_deadline = deadline;
        self
    }

    /// Subscribe to session events (sent/received lines, prompts)
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.session.is_open() && self.transport.is_connected()
    }

    /// Registered users, in registry order (empty when disconnected)
    pub fn users(&self) -> &[UserRecord] {
        self.registry.as_ref().map(UserRegistry::users).unwrap_or(&[])
    }

    /// Connect to the sensor and load the user registry
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be opened or the registry
    /// file exists but cannot be parsed.
    pub async fn connect(&mut self) -> Result<()> {
        info!("Connecting to {}...", self.transport.endpoint());

        self.transport.connect().await?;

        let registry = match UserRegistry::load(&self.registry_path) {
            Ok(registry) => registry,
            Err(e) => {
                // Leave no half-open session behind
                let _ = self.transport.disconnect().await;
                return Err(e);
            }
        };

        info!(
            "Loaded {} user record(s) from {}",
            registry.len(),
            registry.path().display()
        );

        self.registry = Some(registry);
        self.session.open()?;

        info!("Connected to {}", self.transport.endpoint());
        Ok(())
    }

    /// Disconnect from the sensor
    pub async fn disconnect(&mut self) -> Result<()> {
        if !self.is_connected() {
            return Ok(());
        }

        info!("Disconnecting from {}...", self.transport.endpoint());

        self.transport.disconnect().await?;
        self.session.close();
        self.registry = None;

        info!("Disconnected");
        Ok(())
    }

    /// Enroll a new user
    ///
    /// Assigns the next free slot id, drives the sensor's multi-step
    /// enrollment exchange, and commits the record once the sensor
    /// confirms. Progress prompts are published to subscribers.
    ///
    /// # Errors
    ///
    /// Rejects empty or duplicate usernames before anything is sent.
    /// Sensor-reported failures carry the firmware's reason verbatim; a
    /// sensor that stops answering yields a timeout error.
    pub async fn enroll(&mut self, username: &str) -> Result<UserRecord> {
        self.ensure_connected()?;

        validate_username(username)?;
        let registry = self.registry()?;
        if registry.find(username).is_some() {
            return Err(fpgate_types::Error::Validation(format!(
                "username {:?} is already enrolled",
                username
            ))
            .into());
        }
        let slot_id = registry.next_slot_id();

        self.session
            .begin(PendingOperation::Enrolling { slot_id })?;

        let result = self.enroll_exchange(username, slot_id).await;
        self.session.finish();
        result
    }

    async fn enroll_exchange(&mut self, username: &str, slot_id: u32) -> Result<UserRecord> {
        self.send_command(Command::Enroll { slot_id }).await?;

        let deadline = tokio::time::Instant::now() + self.enroll_deadline;

        loop {
            // The firmware paces the exchange around finger placement
            tokio::time::sleep(self.poll_interval).await;

            if tokio::time::Instant::now() >= deadline {
                return Err(fpgate_core::Error::Timeout {
                    seconds: self.enroll_deadline.as_secs(),
                }
                .into());
            }

            let line = match self.transport.read_line(self.read_timeout).await {
                Ok(line) => line,
                Err(fpgate_transport::Error::ReadTimeout) => continue,
                Err(e) => return Err(e.into()),
            };
            self.emit(SessionEvent::received(line.as_str()));

            match classify(&line) {
                Response::Prompt(prompt) => {
                    debug!("Enrollment prompt: {}", prompt);
                    self.emit(SessionEvent::prompt(prompt));
                }
                Response::Telemetry(text) => {
                    trace!("Sensor telemetry: {}", text);
                }
                Response::EnrollOk => {
                    let record = UserRecord::new(username, slot_id);
                    self.registry_mut()?.add(record.clone())?;

                    info!("Enrolled {}", record);
                    return Ok(record);
                }
                Response::EnrollFailed(reason) => {
                    warn!("Enrollment failed: {}", reason);
                    return Err(fpgate_core::Error::DeviceError { reason }.into());
                }
                other => {
                    warn!("Unrecognized response during enrollment: {:?}", other);
                }
            }
        }
    }

    /// Delete a user's fingerprint
    ///
    /// The registry record is removed only after the sensor confirms the
    /// template is gone.
    pub async fn delete(&mut self, username: &str) -> Result<UserRecord> {
        self.ensure_connected()?;

        let record = self
            .registry()?
            .find(username)
            .cloned()
            .ok_or_else(|| {
                Error::from(fpgate_types::Error::Validation(format!(
                    "no user named {:?} to delete",
                    username
                )))
            })?;

        self.session.begin(PendingOperation::Deleting {
            username: record.username.clone(),
            slot_id: record.slot_id,
        })?;

        let result = self.delete_exchange(record).await;
        self.session.finish();
        result
    }

    async fn delete_exchange(&mut self, record: UserRecord) -> Result<UserRecord> {
        let command = Command::Delete {
            slot_id: record.slot_id,
        };
        self.send_command(command).await?;

        let line = self.read_single_response().await?;

        match classify(&line) {
            Response::DeleteOk => {
                let removed = self.registry_mut()?.remove(&record.username)?;
                info!("Deleted {}", removed);
                Ok(removed)
            }
            _ => Err(fpgate_core::Error::UnexpectedResponse {
                command: command.name(),
                line,
            }
            .into()),
        }
    }

    /// Verify the currently-presented finger
    ///
    /// A successful match whose slot id no registry record carries is
    /// still a detection success, reported as [`Verification::Unknown`].
    pub async fn verify(&mut self) -> Result<Verification> {
        self.ensure_connected()?;

        self.session.begin(PendingOperation::Verifying)?;

        let result = self.verify_exchange().await;
        self.session.finish();
        result
    }

    async fn verify_exchange(&mut self) -> Result<Verification> {
        self.send_command(Command::Detect).await?;

        let line = self.read_single_response().await?;

        match classify(&line) {
            Response::Detected { slot: Some(token) } => {
                if let Some(record) = self.registry()?.find_by_slot_token(&token) {
                    let verification = Verification::Known {
                        username: record.username.clone(),
                        slot_id: record.slot_id,
                    };
                    info!("Verified {}", verification);
                    return Ok(verification);
                }

                match token.parse::<u32>() {
                    Ok(slot_id) => {
                        info!("Matched unregistered slot {}", slot_id);
                        Ok(Verification::Unknown { slot_id })
                    }
                    Err(_) => Err(fpgate_core::Error::MalformedResponse { line }.into()),
                }
            }
            Response::Detected { slot: None } => {
                Err(fpgate_core::Error::MalformedResponse { line }.into())
            }
            _ => Err(fpgate_core::Error::UnexpectedResponse {
                command: Command::Detect.name(),
                line,
            }
            .into()),
        }
    }

    // Helper methods

    fn ensure_connected(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        Ok(())
    }

    fn registry(&self) -> Result<&UserRegistry> {
        self.registry.as_ref().ok_or(Error::NotConnected)
    }

    fn registry_mut(&mut self) -> Result<&mut UserRegistry> {
        self.registry.as_mut().ok_or(Error::NotConnected)
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }

    async fn send_command(&mut self, command: Command) -> Result<()> {
        let line = command.wire();
        debug!("Sending: {}", line);

        self.transport.write_line(&line).await?;
        self.emit(SessionEvent::sent(line));

        Ok(())
    }

    /// Wait for the single response line of a delete/detect exchange
    async fn read_single_response(&mut self) -> Result<String> {
        let deadline = tokio::time::Instant::now() + self.response_deadline;

        while !self.transport.bytes_available().await? {
            if tokio::time::Instant::now() >= deadline {
                return Err(fpgate_core::Error::Timeout {
                    seconds: self.response_deadline.as_secs(),
                }
                .into());
            }
            tokio::time::sleep(self.line_poll_interval).await;
        }

        let line = self.transport.read_line(self.read_timeout).await?;
        self.emit(SessionEvent::received(line.as_str()));

        Ok(line)
    }
}
