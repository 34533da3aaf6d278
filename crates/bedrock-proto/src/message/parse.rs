//! Message parsing implementation.
//!
//! Implements `FromStr` for [`Message`]. Parsing degrades gracefully:
//! malformed tag fragments are dropped and an empty prefix is ignored; the
//! only hard failures are an empty line and a line with no command token.
//!
//! Consecutive spaces between tokens are collapsed (treated as one
//! separator) rather than producing empty parameters.

use std::str::FromStr;

use crate::error::{MessageParseError, ProtocolError};

use super::tags::unescape_tag_value;
use super::types::{Message, Tag};

/// Parse the tags segment (without the leading `@`) into `Tag` values.
///
/// Tag values are unescaped; a fragment with an empty key is dropped.
fn parse_tags(raw: &str) -> Vec<Tag> {
    raw.split(';')
        .filter_map(|fragment| {
            let (key, value) = match fragment.split_once('=') {
                Some((k, v)) => (k, Some(unescape_tag_value(v))),
                None => (fragment, None),
            };
            (!key.is_empty()).then(|| Tag(key.to_string(), value))
        })
        .collect()
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let invalid = |cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        };

        if s.is_empty() {
            return Err(invalid(MessageParseError::EmptyMessage));
        }

        let mut rest = s.trim_end_matches(['\r', '\n']);

        let mut tags = Vec::new();
        if let Some(after) = rest.strip_prefix('@') {
            let (raw_tags, remainder) = after.split_once(' ').unwrap_or((after, ""));
            tags = parse_tags(raw_tags);
            rest = remainder.trim_start_matches(' ');
        }

        let mut prefix = None;
        if let Some(after) = rest.strip_prefix(':') {
            let (raw_prefix, remainder) = after.split_once(' ').unwrap_or((after, ""));
            if !raw_prefix.is_empty() {
                prefix = Some(raw_prefix.to_string());
            }
            rest = remainder.trim_start_matches(' ');
        }

        let (command, mut cursor) = rest.split_once(' ').unwrap_or((rest, ""));
        if command.is_empty() {
            return Err(invalid(MessageParseError::MissingCommand));
        }

        let mut params = Vec::new();
        loop {
            cursor = cursor.trim_start_matches(' ');
            if cursor.is_empty() {
                break;
            }
            // A `:`-led token swallows the rest of the line, spaces included
            if let Some(trailing) = cursor.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            match cursor.split_once(' ') {
                Some((token, remainder)) => {
                    params.push(token.to_string());
                    cursor = remainder;
                }
                None => {
                    params.push(cursor.to_string());
                    break;
                }
            }
        }

        Ok(Message {
            tags,
            prefix,
            command: command.to_string(),
            params,
        })
    }
}
