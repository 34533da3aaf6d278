//! # bedrock-proto
//!
//! Wire-level IRC protocol support for the `bedrock` client: line framing
//! over a byte stream, message parsing, and serialization back to the wire.
//!
//! ## Parsing
//!
//! ```rust
//! use bedrock_proto::Message;
//!
//! let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.params, vec!["#channel", "Hello!"]);
//! ```
//!
//! ## Serialization
//!
//! [`Message`] implements `Display` and always emits a CRLF-terminated line,
//! re-introducing the `:` trailing marker where the final parameter needs it:
//!
//! ```rust
//! use bedrock_proto::Message;
//!
//! let msg = Message::new("PRIVMSG", ["#channel", "hello world"]);
//! assert_eq!(msg.to_string(), "PRIVMSG #channel :hello world\r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod codec;
pub mod error;
pub mod line;
pub mod message;

pub use self::codec::MessageCodec;
pub use self::error::{MessageParseError, ProtocolError};
pub use self::line::{LineCodec, DEFAULT_MAX_LINE_LEN};
pub use self::message::{Message, Tag};
