//! Self-healing line reader
//!
//! `Disconnected --open ok--> Connected --link error--> Disconnected`
//!
//! A link failure (open failed, device gone) drops the port and waits the
//! long backoff before reopening. A transient read error keeps the port and
//! waits the short backoff. The reader never gives up.

use std::collections::VecDeque;
use std::io::Read;
use std::thread;
use std::time::Duration;

use crate::error::TransportError;
use crate::framing::LineFramer;
use crate::port::PortOpener;

/// Connection state of the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Waits applied after failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Wait before reopening after a link failure
    pub link_lost: Duration,
    /// Wait after a transient read error
    pub glitch: Duration,
}

impl Backoff {
    pub fn new(link_lost: Duration, glitch: Duration) -> Self {
        Self { link_lost, glitch }
    }

    /// Delay appropriate for `error`
    pub fn delay_for(&self, error: &TransportError) -> Duration {
        if error.is_link_failure() {
            self.link_lost
        } else {
            self.glitch
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            link_lost: Duration::from_secs(5),
            glitch: Duration::from_secs(1),
        }
    }
}

/// Counters describing the reader's history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Successful opens
    pub connects: u64,
    /// Failures that forced a reopen (including failed opens)
    pub link_failures: u64,
    /// Transient read errors
    pub glitches: u64,
    /// Complete lines handed out
    pub lines: u64,
    /// Frames discarded because they were not UTF-8
    pub discarded: u64,
}

/// Reads complete text lines from a reconnecting port.
///
/// Iterating never ends: when the device disappears the reader keeps trying
/// to reopen it, sleeping between attempts.
pub struct LineReader<O: PortOpener> {
    opener: O,
    port: Option<O::Port>,
    framer: LineFramer,
    backoff: Backoff,
    ready: VecDeque<String>,
    buf: Vec<u8>,
    stats: ReaderStats,
}

impl<O: PortOpener> LineReader<O> {
    pub fn new(opener: O, backoff: Backoff) -> Self {
        Self {
            opener,
            port: None,
            framer: LineFramer::new(),
            backoff,
            ready: VecDeque::new(),
            buf: vec![0u8; 256],
            stats: ReaderStats::default(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.port.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// Block until the next complete, non-empty line is available
    pub fn next_line(&mut self) -> String {
        loop {
            if let Some(line) = self.poll_line() {
                return line;
            }
        }
    }

    /// Perform at most one connect-or-read step and return a line if one is
    /// ready. Returns `None` after a read timeout or a recovered failure.
    pub fn poll_line(&mut self) -> Option<String> {
        if self.ready.is_empty() {
            if let Err(error) = self.poll() {
                self.recover(error);
            }
        }

        let line = self.ready.pop_front()?;
        self.stats.lines += 1;
        Some(line)
    }

    /// One connect-or-read step. Completed lines are queued in `ready`.
    fn poll(&mut self) -> Result<(), TransportError> {
        if self.port.is_none() {
            let port = self.opener.open()?;
            self.stats.connects += 1;
            tracing::info!("Connected to reader on {}", self.opener.describe());
            self.port = Some(port);
        }

        let port = match self.port.as_mut() {
            Some(port) => port,
            None => return Ok(()),
        };

        let n = match port.read(&mut self.buf) {
            Ok(0) => return Err(TransportError::Closed),
            Ok(n) => n,
            Err(e) => {
                return match TransportError::from_read_error(e) {
                    Some(error) => Err(error),
                    None => Ok(()),
                }
            }
        };

        for frame in self.framer.push(&self.buf[..n]) {
            match String::from_utf8(frame) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        self.ready.push_back(line.to_string());
                    }
                }
                Err(e) => {
                    self.stats.discarded += 1;
                    tracing::warn!("Discarding non UTF-8 frame from reader: {}", e);
                }
            }
        }
        Ok(())
    }

    fn recover(&mut self, error: TransportError) {
        let delay = self.backoff.delay_for(&error);

        if error.is_link_failure() {
            self.stats.link_failures += 1;
            if self.port.take().is_some() {
                tracing::warn!("Serial error: {}; reconnecting in {:?}", error, delay);
            } else {
                tracing::debug!("Serial error: {}; retrying in {:?}", error, delay);
            }
            // Never hand out the tail of a line that straddled the disconnect.
            self.framer.reset();
        } else {
            self.stats.glitches += 1;
            tracing::warn!("Serial read error: {}; retrying in {:?}", error, delay);
        }

        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

impl<O: PortOpener> Iterator for LineReader<O> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_line())
    }
}
