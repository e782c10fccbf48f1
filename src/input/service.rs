//! High-level input service.
//!
//! Pulls bytes from the blink-code source, runs them through the [`BlinkDecoder`], and maps the
//! resulting codes onto [`BlinkEvent`]s using the configured protocol variant.

use crate::error::{BlinkError, Result};
use crate::input::decoder::BlinkDecoder;
use crate::protocol::{BlinkEvent, ProtocolVariant};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Bytes requested from the source per read.
const READ_CHUNK_SIZE: usize = 64;

/// Boxed byte source so stdin, device nodes, and in-memory buffers share one loop.
pub type BlinkSource = Box<dyn AsyncRead + Unpin + Send>;

/// Open the blink-code source: a device node or file when `port` is given, stdin otherwise.
///
/// Line settings (baud rate, parity) are not touched here; configure the device beforehand.
/// A missing or inaccessible device is reported by kind; callers add the path as context.
pub async fn open_source(port: Option<&Path>) -> Result<BlinkSource> {
    match port {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            log::info!("Reading blink codes from {}", path.display());
            Ok(Box::new(file))
        }
        None => {
            log::info!("Reading blink codes from stdin");
            Ok(Box::new(tokio::io::stdin()))
        }
    }
}

/// Service responsible for producing [`BlinkEvent`]s from raw bytes.
#[derive(Debug, Clone, Default)]
pub struct InputService {
    decoder: BlinkDecoder,
    protocol: ProtocolVariant,
}

impl InputService {
    pub fn new(protocol: ProtocolVariant) -> Self {
        Self {
            decoder: BlinkDecoder::new(),
            protocol,
        }
    }

    pub fn protocol(&self) -> ProtocolVariant {
        self.protocol
    }

    /// Decode a chunk of bytes into events, in arrival order.
    pub fn process_bytes(&mut self, bytes: &[u8]) -> Vec<BlinkEvent> {
        self.decoder
            .decode(bytes)
            .into_iter()
            .map(|code| {
                log::debug!("Received blink code: {code}");
                self.protocol.interpret(code)
            })
            .collect()
    }

    /// Read the next chunk from `reader` and decode it.
    ///
    /// Returns `Ok(None)` at end of stream. A chunk that completes no line yields an empty
    /// vector. Any unterminated trailing digits are discarded at end of stream.
    pub async fn poll_events<R>(&mut self, reader: &mut R) -> Result<Option<Vec<BlinkEvent>>>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let read = reader
            .read(&mut chunk)
            .await
            .map_err(|err| BlinkError::io("Blink source read failed", err))?;

        if read == 0 {
            if !self.decoder.pending().is_empty() {
                log::debug!("Discarding unterminated line at end of stream");
                self.decoder.reset();
            }
            return Ok(None);
        }

        Ok(Some(self.process_bytes(&chunk[..read])))
    }
}
