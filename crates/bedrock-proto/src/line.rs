//! Line framer for tokio.
//!
//! This module provides a codec that extracts delimiter-terminated lines out
//! of an arbitrarily fragmented byte stream. Lines are CRLF-terminated on the
//! wire; a bare LF is tolerated on input.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Default maximum line length in bytes (8 KiB).
pub const DEFAULT_MAX_LINE_LEN: usize = 8192;

/// Line framer that handles newline-terminated messages.
///
/// Incomplete trailing bytes stay buffered until the next read delivers the
/// rest of the line. Bytes that are not valid UTF-8 are replaced with U+FFFD
/// rather than failing the stream, so one garbled line can never corrupt the
/// framing of the lines after it. Lines that are empty after stripping the
/// delimiter are skipped, not yielded.
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: DEFAULT_MAX_LINE_LEN,
        }
    }

    /// Create a codec with a custom max line length.
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
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            // Look for a newline starting from where the previous call left off
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                self.next_index = src.len();

                // A partial line already over the limit will never frame
                if src.len() > self.max_len {
                    return Err(error::ProtocolError::MessageTooLong {
                        actual: src.len(),
                        limit: self.max_len,
                    });
                }
                return Ok(None);
            };

            let mut line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(error::ProtocolError::MessageTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            // Strip the delimiter: LF plus an optional preceding CR.
            line.truncate(line.len() - 1);
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            if line.is_empty() {
                continue;
            }

            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend(msg.into_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn feed(codec: &mut LineCodec, chunks: &[&[u8]]) -> Vec<String> {
        let mut buf = BytesMut::new();
        let mut lines = Vec::new();
        for chunk in chunks {
            buf.extend_from_slice(chunk);
            while let Some(line) = codec.decode(&mut buf).unwrap() {
                lines.push(line);
            }
        }
        lines
    }

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :test\r\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("PING :test".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"server\r\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("PING :server".to_string())
        );
    }

    #[test]
    fn test_decode_lf_only() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :server\n");

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("PING :server".to_string())
        );
    }

    #[test]
    fn test_decode_skips_empty_lines() {
        let mut codec = LineCodec::new();
        let lines = feed(&mut codec, &[b"\r\n\r\nPING a\r\n\nPING b\r\n"]);
        assert_eq!(lines, vec!["PING a".to_string(), "PING b".to_string()]);
    }

    #[test]
    fn test_decode_invalid_utf8_is_replaced() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PING \xff\xfe\r\nPING ok\r\n"[..]);

        let garbled = codec.decode(&mut buf).unwrap().unwrap();
        assert!(garbled.starts_with("PING "));
        assert!(garbled.contains('\u{fffd}'));

        // The following line frames normally
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING ok".to_string()));
    }

    #[test]
    fn test_decode_too_long_complete() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\n");

        let result = codec.decode(&mut buf);
        assert!(matches!(
            result,
            Err(error::ProtocolError::MessageTooLong { .. })
        ));
    }

    #[test]
    fn test_decode_too_long_without_delimiter() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("no delimiter here");

        let result = codec.decode(&mut buf);
        assert!(matches!(
            result,
            Err(error::ProtocolError::MessageTooLong { actual: 17, limit: 10 })
        ));
    }

    #[test]
    fn test_decode_fragmented_across_delimiter() {
        let mut codec = LineCodec::new();
        let lines = feed(
            &mut codec,
            &[b":irc.example.com NOTICE", b" AUTH :*** Processing\r", b"\n"],
        );
        assert_eq!(
            lines,
            vec![":irc.example.com NOTICE AUTH :*** Processing".to_string()]
        );
    }

    #[test]
    fn test_encode_passthrough() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("PONG :test\r\n".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"PONG :test\r\n");
    }

    proptest! {
        /// Feeding a byte stream in any chunking yields the same lines as
        /// feeding it all at once.
        #[test]
        fn split_invariance(
            lines in prop::collection::vec("[a-zA-Z0-9#: ]{1,30}", 1..8),
            cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
        ) {
            let wire: Vec<u8> = lines
                .iter()
                .flat_map(|l| format!("{l}\r\n").into_bytes())
                .collect();

            let mut cut_points: Vec<usize> = cuts.iter().map(|i| i.index(wire.len())).collect();
            cut_points.sort_unstable();
            cut_points.dedup();

            let mut chunks: Vec<&[u8]> = Vec::new();
            let mut start = 0;
            for cut in cut_points {
                chunks.push(&wire[start..cut]);
                start = cut;
            }
            chunks.push(&wire[start..]);

            let chunked = feed(&mut LineCodec::new(), &chunks);
            let whole = feed(&mut LineCodec::new(), &[&wire]);
            prop_assert_eq!(chunked, whole);
        }
    }
}
