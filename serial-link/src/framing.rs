//! Newline framing of the raw byte stream

/// Lines longer than this are assumed to be line noise and dropped
pub const MAX_LINE_LEN: usize = 4096;

/// Buffers input and emits a frame whenever a newline is encountered.
///
/// Emitted frames exclude the `\n` and any `\r` right before it. Bytes after
/// the last newline stay buffered until the next push.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
    overflowed: bool,
}

impl LineFramer {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(256),
            overflowed: false,
        }
    }

    /// Feed bytes and collect every line they complete
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();

        for &b in bytes {
            if b == b'\n' {
                if self.overflowed {
                    tracing::warn!("Dropped oversized serial line (> {} bytes)", MAX_LINE_LEN);
                    self.overflowed = false;
                } else {
                    if self.buffer.last() == Some(&b'\r') {
                        self.buffer.pop();
                    }
                    frames.push(std::mem::take(&mut self.buffer));
                }
                self.buffer.clear();
                continue;
            }

            if self.overflowed {
                continue;
            }
            if self.buffer.len() >= MAX_LINE_LEN {
                self.overflowed = true;
                self.buffer.clear();
                continue;
            }
            self.buffer.push(b);
        }

        frames
    }

    /// Discard any partially assembled line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Number of bytes waiting for a terminator
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
