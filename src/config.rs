//! Client configuration.

use serde::{Deserialize, Serialize};

use bedrock_proto::line::DEFAULT_MAX_LINE_LEN;

/// Connection-scoped client configuration.
///
/// Carries only what the core needs; credentials, channels to join, and
/// reconnect policy belong to the application built on top.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Maximum accepted line length in bytes. A peer that sends more
    /// without a delimiter gets the connection dropped.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
}

fn default_max_line_len() -> usize {
    DEFAULT_MAX_LINE_LEN
}

impl ClientConfig {
    /// Configuration for `host:port` with default limits.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("irc.example.com", 6667);
        assert_eq!(config.host, "irc.example.com");
        assert_eq!(config.port, 6667);
        assert_eq!(config.max_line_len, DEFAULT_MAX_LINE_LEN);
    }
}
