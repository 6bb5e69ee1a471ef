//! Chat codec for tokio.
//!
//! Decodes newline-delimited JSON [`Request`]s and encodes plain text server
//! lines.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;
use crate::line::LineCodec;
use crate::request::Request;

/// Tokio codec for the chat protocol.
///
/// Wraps [`LineCodec`] and parses each non-blank line into a [`Request`].
#[derive(Debug, Default)]
pub struct ChatCodec {
    inner: LineCodec,
}

impl ChatCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }
}

impl Decoder for ChatCodec {
    type Item = Request;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Request>> {
        loop {
            match self.inner.decode(src)? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Request::parse(&line).map(Some),
                None => return Ok(None),
            }
        }
    }
}

impl Encoder<String> for ChatCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        self.inner.encode(line, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use crate::request::Target;

    #[test]
    fn test_decode_request_across_reads() {
        let mut codec = ChatCodec::new();
        let mut buf = BytesMut::from(r#"{"username":"alice","tar"#);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"get\":\"hello\"}\n");
        let req = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(req.username, "alice");
        assert_eq!(req.target, Target::Hello);
    }

    #[test]
    fn test_decode_two_requests_in_one_read() {
        let mut codec = ChatCodec::new();
        let mut buf = BytesMut::from(
            "{\"username\":\"a\",\"target\":\"hello\"}\n{\"username\":\"a\",\"message\":\"x\"}\n",
        );
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().target, Target::Hello);
        let second = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(second.target, Target::All);
        assert_eq!(second.message, "x");
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_skips_blank_lines() {
        let mut codec = ChatCodec::new();
        let mut buf = BytesMut::from("\r\n\n{\"username\":\"a\"}\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().username, "a");
    }

    #[test]
    fn test_decode_malformed_json() {
        let mut codec = ChatCodec::new();
        let mut buf = BytesMut::from("not json\n");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_encode_line() {
        let mut codec = ChatCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode("New guest in the chat! - bob".to_string(), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"New guest in the chat! - bob\n");
    }
}
