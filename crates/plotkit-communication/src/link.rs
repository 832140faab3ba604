//! Device link abstraction.
//!
//! The concrete transport (serial, TCP, whatever drives the machine) lives
//! outside this crate; the sequencer only needs something that accepts one
//! outbound text command at a time. Inbound traffic is delivered by the
//! caller to [`crate::sequencer::JogSequencer::handle_response`].

use plotkit_core::DeviceError;

/// A one-way outbound command channel to the device.
pub trait DeviceLink: Send {
    /// Send a single command line (without trailing newline).
    fn send_line(&mut self, line: &str) -> Result<(), DeviceError>;

    fn is_connected(&self) -> bool {
        true
    }
}

/// Link that swallows commands; for tests, dry runs and simulation.
#[derive(Debug, Default)]
pub struct NoOpDeviceLink {
    /// Every line sent, in order.
    pub sent: Vec<String>,
    /// When false, sends fail as if the device vanished.
    pub connected: bool,
}

impl NoOpDeviceLink {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            connected: true,
        }
    }
}

impl DeviceLink for NoOpDeviceLink {
    fn send_line(&mut self, line: &str) -> Result<(), DeviceError> {
        if !self.connected {
            return Err(DeviceError::NotConnected);
        }
        self.sent.push(line.to_string());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
