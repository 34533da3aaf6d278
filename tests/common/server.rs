//! The server side of a test connection.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};
use tokio::time::timeout;

use bedrock::{Client, DEFAULT_MAX_LINE_LEN};

use super::pipe::PipeConnector;

/// Reads and writes raw lines on the far end of a piped connection.
pub struct ServerEnd {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
}

impl ServerEnd {
    /// A client wired to a fresh pipe, and the server end of that pipe.
    ///
    /// The client is not yet connected; tests register handlers first and
    /// then call `connect`.
    pub fn pair() -> (Client, ServerEnd) {
        let (client_io, server_io) = tokio::io::duplex(4096);
        let (read, write) = tokio::io::split(server_io);
        let client = Client::with_connector(
            Box::new(PipeConnector::new(client_io)),
            DEFAULT_MAX_LINE_LEN,
        );
        let server = ServerEnd {
            reader: BufReader::new(read),
            writer: write,
        };
        (client, server)
    }

    /// Send a line to the client, appending CRLF when missing.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send raw bytes as-is, for exercising partial-line delivery.
    #[allow(dead_code)]
    pub async fn send_bytes(&mut self, chunk: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(chunk).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive one line from the client, without its trailing CRLF.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(Duration::from_secs(5), self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("client closed the connection");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Close the server's write side; the client sees EOF.
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
