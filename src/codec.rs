//! Newline-delimited text codec
//!
//! Byte-oriented: invalid UTF-8 is replaced rather than rejected, and a
//! trailing `\r` is dropped so CRLF clients work unchanged. Lines longer
//! than the configured maximum fail the stream with `InvalidData`.

use std::io;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Default cap on a single line, excluding the terminator
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Line codec for the relay protocol
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Bytes already scanned for a newline
    next_index: usize,
    max_length: usize,
}

impl LineCodec {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            next_index: 0,
            max_length,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn line_too_long(max_length: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("line exceeds {} bytes", max_length),
    )
}

fn decode_line(mut raw: BytesMut) -> String {
    if raw.last() == Some(&b'\r') {
        raw.truncate(raw.len() - 1);
    }
    String::from_utf8_lossy(&raw).into_owned()
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        let Some(offset) = buf[self.next_index..].iter().position(|b| *b == b'\n') else {
            if buf.len() > self.max_length {
                return Err(line_too_long(self.max_length));
            }
            self.next_index = buf.len();
            return Ok(None);
        };

        let newline = self.next_index + offset;
        self.next_index = 0;
        if newline > self.max_length {
            return Err(line_too_long(self.max_length));
        }

        let mut line = buf.split_to(newline + 1);
        line.truncate(newline);
        Ok(Some(decode_line(line)))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }

        // Unterminated final fragment
        self.next_index = 0;
        if buf.is_empty() {
            Ok(None)
        } else {
            let rest = buf.split_to(buf.len());
            Ok(Some(decode_line(rest)))
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = io::Error;

    fn encode(&mut self, line: String, buf: &mut BytesMut) -> Result<(), Self::Error> {
        buf.reserve(line.len() + 1);
        buf.put_slice(line.as_bytes());
        buf.put_u8(b'\n');
        Ok(())
    }
}
