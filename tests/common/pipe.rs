//! Connectors over in-memory transports.

use std::io;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::DuplexStream;

use bedrock::{Connector, Transport};

/// Hands out a pre-built duplex stream on the first connect call.
///
/// A second connect fails: each test connection gets its own pipe, the same
/// way a real dial produces a fresh socket.
pub struct PipeConnector {
    stream: Mutex<Option<DuplexStream>>,
}

impl PipeConnector {
    pub fn new(stream: DuplexStream) -> Self {
        Self {
            stream: Mutex::new(Some(stream)),
        }
    }
}

#[async_trait]
impl Connector for PipeConnector {
    async fn connect(&self) -> io::Result<Box<dyn Transport>> {
        match self.stream.lock().take() {
            Some(stream) => Ok(Box::new(stream)),
            None => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "pipe already consumed",
            )),
        }
    }
}

/// Always refuses the connection.
pub struct FailingConnector;

#[async_trait]
impl Connector for FailingConnector {
    async fn connect(&self) -> io::Result<Box<dyn Transport>> {
        Err(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "nothing listening",
        ))
    }
}
