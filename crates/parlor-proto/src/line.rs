//! Line-based codec for tokio.
//!
//! Reads and writes newline-terminated UTF-8 lines. Input may arrive split
//! across reads or several lines coalesced into one read; the decoder keeps a
//! buffer and only yields complete lines.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};

/// Default maximum line length in bytes, terminator included.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// Line-based codec that handles newline-terminated messages.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// Collapse embedded line breaks so one outbound message stays one line.
    pub fn sanitize(data: &str) -> String {
        data.chars()
            .map(|ch| if ch == '\r' || ch == '\n' { ' ' } else { ch })
            .collect()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        // Look for newline starting from where we left off
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ProtocolError::MessageTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            let text = std::str::from_utf8(&line).map_err(|e| ProtocolError::InvalidUtf8 {
                byte_pos: e.valid_up_to(),
                details: e.to_string(),
            })?;

            Ok(Some(text.trim_end_matches(&['\r', '\n'][..]).to_string()))
        } else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(ProtocolError::MessageTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> Result<()> {
        let line = Self::sanitize(&msg);
        dst.reserve(line.len() + 1);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\n");
        Ok(())
    }
}
