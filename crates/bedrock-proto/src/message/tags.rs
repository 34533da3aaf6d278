//! IRCv3 message tag escaping utilities.

use std::fmt::{Result as FmtResult, Write};

/// Escape a tag value for serialization, per the IRCv3 message-tags spec.
pub fn escape_tag_value<W: Write>(out: &mut W, value: &str) -> FmtResult {
    for c in value.chars() {
        match c {
            ';' => out.write_str("\\:")?,
            ' ' => out.write_str("\\s")?,
            '\\' => out.write_str("\\\\")?,
            '\r' => out.write_str("\\r")?,
            '\n' => out.write_str("\\n")?,
            c => out.write_char(c)?,
        }
    }
    Ok(())
}

/// Unescape a tag value from wire format.
///
/// Reverses [`escape_tag_value`]. Unknown escapes drop the backslash; a
/// trailing lone backslash is dropped entirely.
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}
