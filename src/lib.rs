//! An asyncio-style IRC client core: a line codec, an RFC 2812 message
//! parser, and an event dispatcher, glued together by a small connection
//! lifecycle. No commands are interpreted for you; every inbound message
//! fires an event named after its command, and what the client *does* is
//! whatever handlers you register.
//!
//! ```no_run
//! use bedrock::{Client, ClientConfig, Event, CLIENT_CONNECT};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = Client::new(ClientConfig::new("irc.example.com", 6667));
//!
//! let registration = client.clone();
//! client.on(CLIENT_CONNECT, move |_event: Event| {
//!     let client = registration.clone();
//!     async move {
//!         client.send("NICK", ["amy"])?;
//!         client.send("USER", ["amy", "0", "*", "amy"])?;
//!         Ok(())
//!     }
//! });
//!
//! let pong = client.clone();
//! client.on("PING", move |event: Event| {
//!     let client = pong.clone();
//!     async move {
//!         let token = event.message.and_then(|m| m.params.into_iter().next());
//!         client.send("PONG", token)?;
//!         Ok(())
//!     }
//! });
//!
//! client.connect().await?;
//! // End of MOTD or "no MOTD" both mean registration finished
//! client.wait(&["376", "422"]).await;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod state;
pub mod transport;

pub use client::{Client, CLIENT_CONNECT, CLIENT_DISCONNECT};
pub use config::ClientConfig;
pub use dispatch::{Dispatch, Dispatcher, Event};
pub use error::{ClientError, Result};
pub use state::ConnectionState;
pub use transport::{Connector, TcpConnector, TlsConnector, Transport};

pub use bedrock_proto::{
    LineCodec, Message, MessageCodec, MessageParseError, ProtocolError, Tag, DEFAULT_MAX_LINE_LEN,
};
