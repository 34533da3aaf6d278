//! Owned IRC message types.

/// A single IRCv3 message tag: key and optional value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag(pub String, pub Option<String>);

impl Tag {
    /// Create a new tag.
    pub fn new(key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Tag(key.into(), value.map(Into::into))
    }
}

/// An owned IRC message.
///
/// Contains the complete parsed representation of an IRC message: optional
/// IRCv3 tags, optional prefix/source, the command, and its parameters.
///
/// # Example
///
/// ```
/// use bedrock_proto::Message;
///
/// // Parse a message
/// let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
/// assert_eq!(msg.source_nickname(), Some("nick"));
///
/// // Construct a message
/// let msg = Message::new("PRIVMSG", ["#channel", "Hello!"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// IRCv3 message tags; empty when the message carries none.
    pub tags: Vec<Tag>,
    /// Message source (e.g. `nick!user@host` or a server name), without the
    /// leading `:`.
    pub prefix: Option<String>,
    /// The command name, exactly as it appeared on the wire or was supplied.
    pub command: String,
    /// Ordered parameters; only the last may contain spaces or be empty.
    pub params: Vec<String>,
}

impl Message {
    /// Create a message from a command and parameters, with no tags or prefix.
    pub fn new<C, P, S>(command: C, params: P) -> Self
    where
        C: Into<String>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Message {
            tags: Vec::new(),
            prefix: None,
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a tag. Chainable.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    /// Set the prefix. Chainable.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// The dispatch key for this message: the command, uppercased.
    ///
    /// The `command` field itself keeps its original casing for echo and
    /// debugging use.
    pub fn event_name(&self) -> String {
        self.command.to_ascii_uppercase()
    }

    /// Get the value of a tag by key. Tags present without a value yield
    /// `Some("")`.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|Tag(k, _)| k == key)
            .map(|Tag(_, v)| v.as_deref().unwrap_or(""))
    }

    /// The nickname portion of the prefix, if any.
    ///
    /// For a `nick!user@host` prefix this is everything before the `!` (or
    /// `@`); a plain server-name prefix comes back whole.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .and_then(|p| p.split(['!', '@']).next())
    }

    /// Check if this is a numeric reply (3-digit command).
    pub fn is_numeric(&self) -> bool {
        self.command.len() == 3 && self.command.chars().all(|c| c.is_ascii_digit())
    }

    /// Get the numeric reply code if this is a numeric reply.
    pub fn numeric_code(&self) -> Option<u16> {
        if self.is_numeric() {
            self.command.parse().ok()
        } else {
            None
        }
    }
}
