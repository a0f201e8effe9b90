//! Serial transport
//!
//! Drives the sensor over a local serial port. `serialport` I/O is
//! blocking, so reads are taken in short slices with async pauses in
//! between; the slice timeout bounds how long any single call may hold
//! the executor.

use std::io::{Read, Write};
use std::time::Duration;

use bytes::BytesMut;
use parking_lot::Mutex;
use serialport::SerialPort;
use tracing::{debug, trace, warn};

use crate::{error::*, extract_line, Transport};

use async_trait::async_trait;

/// Blocking-read slice handed to the serial port driver
const IO_SLICE: Duration = Duration::from_millis(50);

/// Async pause between read attempts
const READ_PAUSE: Duration = Duration::from_millis(10);

/// Serial transport for the fingerprint sensor
pub struct SerialTransport {
    port_name: String,
    baud_rate: u32,
    port: Option<Mutex<Box<dyn SerialPort>>>,
    rx_buf: BytesMut,
    settle_delay: Duration,
}

impl SerialTransport {
    /// Create new serial transport
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            port: None,
            rx_buf: BytesMut::with_capacity(1024),
            settle_delay: Duration::from_secs(2),
        }
    }

    /// Set the settle delay applied after opening the port
    ///
    /// Opening the port resets Arduino-style bridge boards; the sensor is
    /// not listening until the firmware has rebooted.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Pull whatever the driver has buffered into the line buffer
    fn fill_rx_buf(&mut self) -> Result<usize> {
        let port = self.port.as_ref().ok_or(Error::NotConnected)?;
        let mut port = port.lock();

        let mut chunk = [0u8; 256];
        match port.read(&mut chunk) {
            Ok(0) => Ok(0),
            Ok(n) => {
                trace!("Received {} bytes: {:02X?}", n, &chunk[..n.min(16)]);
                self.rx_buf.extend_from_slice(&chunk[..n]);
                Ok(n)
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        debug!("Opening {} at {} baud...", self.port_name, self.baud_rate);

        let port = serialport::new(&self.port_name, self.baud_rate)
            .timeout(IO_SLICE)
            .open()
            .map_err(|e| Error::OpenFailed {
                port: self.port_name.clone(),
                source: e,
            })?;

        self.port = Some(Mutex::new(port));
        self.rx_buf.clear();

        if !self.settle_delay.is_zero() {
            debug!("Waiting {:?} for the bridge firmware to boot", self.settle_delay);
            tokio::time::sleep(self.settle_delay).await;
        }

        debug!("Opened {}", self.port_name);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            debug!("Closing {}", self.port_name);
        }
        self.rx_buf.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        let port = self.port.as_ref().ok_or(Error::NotConnected)?;
        let mut port = port.lock();

        trace!("Sending line: {:?}", line);

        port.write_all(line.as_bytes())?;
        port.write_all(b"\n")?;
        port.flush()?;

        Ok(())
    }

    async fn read_line(&mut self, timeout: Duration) -> Result<String> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if let Some(line) = extract_line(&mut self.rx_buf)? {
                trace!("Received line: {:?}", line);
                return Ok(line);
            }

            self.fill_rx_buf()?;

            if let Some(line) = extract_line(&mut self.rx_buf)? {
                trace!("Received line: {:?}", line);
                return Ok(line);
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(Error::ReadTimeout);
            }

            tokio::time::sleep(READ_PAUSE).await;
        }
    }

    async fn bytes_available(&mut self) -> Result<bool> {
        if !self.rx_buf.is_empty() {
            return Ok(true);
        }

        let port = self.port.as_ref().ok_or(Error::NotConnected)?;
        let waiting = port.lock().bytes_to_read()?;

        Ok(waiting > 0)
    }

    fn endpoint(&self) -> String {
        format!("{}@{}", self.port_name, self.baud_rate)
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("Serial transport dropped while still connected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serial_transport_create() {
        let transport = SerialTransport::new("/dev/ttyUSB0", 9600);
        assert!(!transport.is_connected());
        assert_eq!(transport.endpoint(), "/dev/ttyUSB0@9600");
    }

    #[tokio::test]
    async fn test_serial_transport_open_missing_port() {
        let mut transport =
            SerialTransport::new("/dev/does-not-exist", 9600).with_settle_delay(Duration::ZERO);

        let result = transport.connect().await;
        assert!(matches!(result, Err(Error::OpenFailed { .. })));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_io_before_connect() {
        let mut transport = SerialTransport::new("/dev/ttyUSB0", 9600);

        assert!(matches!(
            transport.write_line("fp_detect").await,
            Err(Error::NotConnected)
        ));
        assert!(matches!(
            transport.read_line(Duration::from_millis(10)).await,
            Err(Error::NotConnected)
        ));
        assert!(matches!(
            transport.bytes_available().await,
            Err(Error::NotConnected)
        ));
    }
}
