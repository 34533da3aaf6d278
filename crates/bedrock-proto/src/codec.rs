//! Message codec for tokio.
//!
//! Wraps [`LineCodec`] to decode framed lines into [`Message`] values and
//! encode outbound messages back to wire lines. A framed line that fails to
//! parse is logged and dropped inside `decode`, never surfaced as a stream
//! error: `Framed` fuses its stream after any decoder error, so letting a
//! single bad line error out would kill the whole connection.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::error;
use crate::line::LineCodec;
use crate::message::Message;

/// Tokio codec for encoding/decoding IRC messages.
pub struct MessageCodec {
    inner: LineCodec,
}

impl MessageCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }

    /// Truncate outbound data at the first line ending, so one send can
    /// never smuggle a second wire line.
    fn sanitize(mut data: String) -> String {
        if let Some((pos, len)) = ["\r\n", "\r", "\n"]
            .iter()
            .flat_map(|needle| data.find(needle).map(|pos| (pos, needle.len())))
            .min_by_key(|&(pos, _)| pos)
        {
            data.truncate(pos + len);
        }
        data
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        while let Some(line) = self.inner.decode(src)? {
            match line.parse::<Message>() {
                Ok(message) => return Ok(Some(message)),
                Err(err) => debug!(%line, error = %err, "discarding unparseable line"),
            }
        }
        Ok(None)
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> error::Result<()> {
        self.inner.encode(Self::sanitize(msg.to_string()), dst)
    }
}
