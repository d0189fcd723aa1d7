//! Serial transport for the RFID reader
//!
//! The reader firmware prints one JSON object per line. This crate turns a
//! flaky serial device into an endless iterator of complete text lines:
//!
//! ```rust,no_run
//! use serial_link::{Backoff, LineReader, SerialPortOpener};
//!
//! let opener = SerialPortOpener::new("/dev/serial0", 115_200);
//! for line in LineReader::new(opener, Backoff::default()) {
//!     println!("{}", line);
//! }
//! ```
//!
//! Link failures and transient read errors are handled inside the iterator
//! with a two-tier backoff (see [`Backoff`]); callers only ever see lines.

mod error;
mod framing;
mod port;
mod reader;

pub use error::TransportError;
pub use framing::{LineFramer, MAX_LINE_LEN};
pub use port::{PortOpener, SerialPortOpener, DEFAULT_BAUD_RATE, DEFAULT_PORT};
pub use reader::{Backoff, ConnectionState, LineReader, ReaderStats};
