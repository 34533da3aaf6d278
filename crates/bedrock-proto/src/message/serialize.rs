//! Wire serialization for [`Message`].

use std::fmt::{self, Display, Formatter, Write};

use super::tags::escape_tag_value;
use super::types::{Message, Tag};

impl Display for Message {
    /// Serialize to IRC wire format, CRLF included.
    ///
    /// The last parameter gets the `:` trailing marker when it contains a
    /// space, is empty, or itself starts with `:`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.tags.is_empty() {
            f.write_char('@')?;
            for (i, Tag(key, value)) in self.tags.iter().enumerate() {
                if i > 0 {
                    f.write_char(';')?;
                }
                f.write_str(key)?;
                if let Some(value) = value {
                    f.write_char('=')?;
                    escape_tag_value(f, value)?;
                }
            }
            f.write_char(' ')?;
        }

        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }

        f.write_str(&self.command)?;

        for (i, param) in self.params.iter().enumerate() {
            let is_last = i + 1 == self.params.len();
            let needs_colon =
                is_last && (param.contains(' ') || param.is_empty() || param.starts_with(':'));
            if needs_colon {
                write!(f, " :{param}")?;
            } else {
                write!(f, " {param}")?;
            }
        }

        write!(f, "\r\n")
    }
}
