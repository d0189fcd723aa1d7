//! Opening the physical device

use std::io::Read;
use std::time::Duration;

use crate::error::TransportError;

/// Default device path of the reader on a Raspberry Pi UART
pub const DEFAULT_PORT: &str = "/dev/serial0";

/// Default line speed of the reader firmware
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Something that can (re)open a byte stream to the reader.
///
/// [`crate::LineReader`] calls [`PortOpener::open`] every time it needs a fresh
/// connection, so implementations must be able to open repeatedly.
pub trait PortOpener {
    type Port: Read;

    /// Human readable name of the endpoint, used in diagnostics
    fn describe(&self) -> String;

    /// Open a new connection
    fn open(&mut self) -> Result<Self::Port, TransportError>;
}

/// Opens a real serial device through the `serialport` crate
#[derive(Debug, Clone)]
pub struct SerialPortOpener {
    path: String,
    baud_rate: u32,
    timeout: Duration,
}

impl SerialPortOpener {
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            timeout: Duration::from_secs(1),
        }
    }

    /// Per-read timeout; a timed-out read is treated as "no data"
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SerialPortOpener {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, DEFAULT_BAUD_RATE)
    }
}

impl PortOpener for SerialPortOpener {
    type Port = Box<dyn serialport::SerialPort>;

    fn describe(&self) -> String {
        format!("{} @ {} baud", self.path, self.baud_rate)
    }

    fn open(&mut self) -> Result<Self::Port, TransportError> {
        serialport::new(&self.path, self.baud_rate)
            .timeout(self.timeout)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|e| TransportError::Open {
                port: self.path.clone(),
                reason: e.to_string(),
            })
    }
}
