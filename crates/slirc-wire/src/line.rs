//! CR-LF line framing over a chunked byte stream.
//!
//! The transport hands the client arbitrary byte chunks with no message
//! framing; this codec splits them into protocol lines, buffering partial
//! lines across chunk boundaries, and terminates outbound lines with CR LF.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::command::Command;
use crate::error::{ProtocolError, Result};

/// Maximum IRC line length including the terminator (RFC 2812).
pub const MAX_LINE_LEN: usize = 512;

/// Line codec: decodes newline-terminated lines, encodes commands with a
/// CR-LF terminator.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of the next byte to check for a newline.
    next_index: usize,
    /// Maximum line length.
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with the standard 512-byte line limit.
    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: MAX_LINE_LEN,
        }
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        // Look for a newline starting from where the previous call stopped.
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            let text = String::from_utf8(line.to_vec()).map_err(|e| {
                let byte_pos = e.utf8_error().valid_up_to();
                ProtocolError::InvalidUtf8 {
                    raw_line: e.into_bytes(),
                    byte_pos,
                }
            })?;

            Ok(Some(text.trim_end_matches(&['\r', '\n'][..]).to_owned()))
        } else {
            // No complete line yet; remember where the scan stopped.
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }
}

impl Encoder<&Command> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, cmd: &Command, dst: &mut BytesMut) -> Result<()> {
        let line = cmd.to_string();
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

impl Encoder<&str> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: &str, dst: &mut BytesMut) -> Result<()> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
