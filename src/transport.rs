//! Transport seam: pluggable connection establishment.
//!
//! The client core only needs a duplex byte stream; how that stream is
//! produced (plain TCP, TLS, or an in-memory pipe in tests) lives behind
//! [`Connector`]. No core logic depends on a specific transport
//! implementation.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use socket2::{SockRef, TcpKeepalive};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::ClientConfig as TlsConfig;
use tracing::warn;

/// Duplex byte stream usable as a client transport.
pub trait Transport: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Transport for T {}

/// Opens transports for the client, once per connection attempt.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a fresh transport to the configured peer.
    async fn connect(&self) -> io::Result<Box<dyn Transport>>;
}

/// Plain TCP connector with keepalive enabled.
pub struct TcpConnector {
    host: String,
    port: u16,
}

impl TcpConnector {
    /// Connector for `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    async fn open(&self) -> io::Result<TcpStream> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        if let Err(err) = enable_keepalive(&stream) {
            warn!(error = %err, "failed to enable TCP keepalive");
        }
        Ok(stream)
    }
}

fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    sock.set_tcp_keepalive(&keepalive)
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> io::Result<Box<dyn Transport>> {
        Ok(Box::new(self.open().await?))
    }
}

/// TLS connector for servers speaking IRC over TLS (port 6697 style).
///
/// Trust policy belongs to the caller: supply a ready `rustls` client
/// configuration (root store, ALPN, client certs as needed).
pub struct TlsConnector {
    tcp: TcpConnector,
    tls: tokio_rustls::TlsConnector,
    server_name: ServerName<'static>,
}

impl TlsConnector {
    /// Connector for `host:port`, validating the certificate against `host`.
    ///
    /// Fails when `host` is not usable as a TLS server name.
    pub fn new(host: impl Into<String>, port: u16, config: Arc<TlsConfig>) -> io::Result<Self> {
        let host = host.into();
        let server_name = ServerName::try_from(host.clone())
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        Ok(Self {
            tcp: TcpConnector::new(host, port),
            tls: tokio_rustls::TlsConnector::from(config),
            server_name,
        })
    }
}

#[async_trait]
impl Connector for TlsConnector {
    async fn connect(&self) -> io::Result<Box<dyn Transport>> {
        let tcp = self.tcp.open().await?;
        let stream = self.tls.connect(self.server_name.clone(), tcp).await?;
        Ok(Box::new(stream))
    }
}
