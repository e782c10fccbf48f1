//! Low-level blink-code decoding: turns the raw serial byte stream into integer codes.
//!
//! Digits are buffered until a `\n` terminator. Everything else is noise and is dropped
//! without ending the current line, including the `\r` of a `\r\n` pair.

use crate::protocol::BlinkCode;

/// Maximum number of digits kept for a single line. Further digits are dropped.
pub const MAX_LINE_DIGITS: usize = 15;

/// Stateful line decoder. Holds no knowledge of scanning semantics.
#[derive(Debug, Clone, Default)]
pub struct BlinkDecoder {
    buffer: [u8; MAX_LINE_DIGITS],
    len: usize,
}

impl BlinkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte, returning a code when it completes a non-empty line.
    pub fn push_byte(&mut self, byte: u8) -> Option<BlinkCode> {
        match byte {
            b'\n' => self.take_line(),
            b'0'..=b'9' => {
                if self.len < MAX_LINE_DIGITS {
                    self.buffer[self.len] = byte;
                    self.len += 1;
                }
                None
            }
            _ => None,
        }
    }

    /// Feed a chunk of bytes, collecting every completed code in order.
    pub fn decode(&mut self, bytes: &[u8]) -> Vec<BlinkCode> {
        bytes.iter().filter_map(|&b| self.push_byte(b)).collect()
    }

    /// Digits buffered for the line in progress.
    pub fn pending(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Drop any partially received line.
    pub fn reset(&mut self) {
        self.len = 0;
    }

    fn take_line(&mut self) -> Option<BlinkCode> {
        if self.len == 0 {
            return None;
        }
        // 15 decimal digits always fit in a u64.
        let code = self.buffer[..self.len]
            .iter()
            .fold(0u64, |acc, digit| acc * 10 + u64::from(digit - b'0'));
        self.len = 0;
        Some(code)
    }
}
