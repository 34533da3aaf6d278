//! The client facade: connection lifecycle, outbound sends, and the event
//! surface applications program against.
//!
//! A [`Client`] owns no I/O until [`Client::connect`] succeeds; after that,
//! one reader task turns inbound frames into dispatched events and one
//! writer task drains the outbound queue, so wire writes are serialized
//! without callers holding any lock across I/O.

use std::future::Future;
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio_util::codec::Framed;
use tracing::{debug, info};

use bedrock_proto::{Message, MessageCodec};

use crate::config::ClientConfig;
use crate::dispatch::{Dispatch, Dispatcher, Event};
use crate::error::{ClientError, Result};
use crate::state::{ConnectionState, StateMachine};
use crate::transport::{Connector, TcpConnector, Transport};

/// Synthetic event fired after the transport comes up.
pub const CLIENT_CONNECT: &str = "CLIENT_CONNECT";

/// Synthetic event fired exactly once per connection after the transport
/// goes away, whether by request, peer close, or error.
pub const CLIENT_DISCONNECT: &str = "CLIENT_DISCONNECT";

type Wire = Framed<Box<dyn Transport>, MessageCodec>;

/// An IRC client: event registry plus at most one live connection.
///
/// Cloning is cheap and every clone drives the same connection and the same
/// handler registry.
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
}

struct Shared {
    connector: Box<dyn Connector>,
    max_line_len: usize,
    dispatcher: Dispatcher,
    state: StateMachine,
    connection: Mutex<Option<Connection>>,
}

/// Handles to a live connection's tasks. The shutdown signal stops both the
/// reader and the writer; anything still queued on `outbound` dies with it.
struct Connection {
    outbound: mpsc::UnboundedSender<Message>,
    shutdown: watch::Sender<bool>,
}

impl Client {
    /// A client that will dial `config.host:config.port` over plain TCP.
    pub fn new(config: ClientConfig) -> Self {
        let max_line_len = config.max_line_len;
        let connector = Box::new(TcpConnector::new(config.host, config.port));
        Self::with_connector(connector, max_line_len)
    }

    /// A client over an arbitrary connector (TLS, an in-memory pipe, ...).
    pub fn with_connector(connector: Box<dyn Connector>, max_line_len: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                connector,
                max_line_len,
                dispatcher: Dispatcher::new(),
                state: StateMachine::default(),
                connection: Mutex::new(None),
            }),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state.current()
    }

    /// Open the connection and start the reader and writer tasks, then fire
    /// `CLIENT_CONNECT`.
    ///
    /// Calling this while already connecting or connected is a no-op; the
    /// existing connection stays untouched. A failed open rolls the state
    /// back to disconnected and fires no lifecycle event.
    pub async fn connect(&self) -> Result<()> {
        if !self.shared.state.begin_connect() {
            return Ok(());
        }

        let transport = match self.shared.connector.connect().await {
            Ok(transport) => transport,
            Err(err) => {
                self.shared.state.abort_connect();
                return Err(err.into());
            }
        };

        let framed = Framed::new(transport, MessageCodec::with_max_len(self.shared.max_line_len));
        let (sink, stream) = framed.split();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(false);

        *self.shared.connection.lock() = Some(Connection { outbound, shutdown });
        self.shared.state.set_connected();

        tokio::spawn(write_loop(sink, outbound_rx, shutdown_rx.clone()));
        tokio::spawn(read_loop(self.shared.clone(), stream, shutdown_rx));

        info!("connected");
        self.shared.dispatcher.trigger(Event::new(CLIENT_CONNECT));
        Ok(())
    }

    /// Close the connection, firing `CLIENT_DISCONNECT` with no reason.
    ///
    /// Queued outbound messages that the writer has not flushed yet are
    /// dropped. A no-op when not connected.
    pub async fn disconnect(&self) {
        if !self.shared.state.begin_close() {
            return;
        }
        info!("disconnecting");
        teardown(&self.shared, None);
    }

    /// Queue a command for sending, e.g. `send("NICK", ["amy"])`.
    ///
    /// Queuing preserves call order. Fails immediately when not connected;
    /// nothing is buffered for a future connection.
    pub fn send<C, P, S>(&self, command: C, params: P) -> Result<()>
    where
        C: Into<String>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.send_message(Message::new(command, params))
    }

    /// Queue a fully built message, tags and prefix included.
    pub fn send_message(&self, message: Message) -> Result<()> {
        if self.shared.state.current() != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }
        let connection = self.shared.connection.lock();
        connection
            .as_ref()
            .ok_or(ClientError::NotConnected)?
            .outbound
            .send(message)
            .map_err(|_| ClientError::NotConnected)
    }

    /// Register a handler for an event name (a command, a numeric, or one of
    /// the `CLIENT_*` lifecycle names). Handlers accumulate; there is no
    /// unregistration.
    pub fn on<F, Fut>(&self, event: &str, handler: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.shared.dispatcher.on(event, handler);
    }

    /// Fire an event locally, exactly as if it had arrived from the wire.
    pub fn trigger(&self, event: Event) -> Dispatch {
        self.shared.dispatcher.trigger(event)
    }

    /// Wait for the next firing of any of the named events.
    pub async fn wait(&self, events: &[&str]) -> Event {
        self.shared.dispatcher.wait(events).await
    }

    /// Wait until every one of the named events has fired, returning the
    /// payloads in argument order.
    pub async fn wait_all(&self, events: &[&str]) -> Vec<Event> {
        self.shared.dispatcher.wait_all(events).await
    }

    /// How many times the named event has fired. Only events with at least
    /// one past registration or wait are tracked.
    pub fn fired_count(&self, event: &str) -> u64 {
        self.shared.dispatcher.fired_count(event)
    }
}

/// Drop the connection handles and, if this is the first teardown for the
/// connection, fire `CLIENT_DISCONNECT`.
fn teardown(shared: &Shared, reason: Option<String>) {
    let connection = shared.connection.lock().take();
    if let Some(connection) = connection {
        let _ = connection.shutdown.send(true);
    }
    if shared.state.set_disconnected() {
        shared
            .dispatcher
            .trigger(Event::with_reason(CLIENT_DISCONNECT, reason));
    }
}

/// Drain the outbound queue into the wire. Exits on shutdown (dropping
/// whatever is still queued), when every sender is gone, or when the sink
/// errors. The select is biased so a queued backlog can never be flushed
/// past a shutdown signal.
async fn write_loop(
    mut sink: SplitSink<Wire, Message>,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            message = outbound.recv() => match message {
                Some(message) => {
                    if let Err(err) = sink.send(message).await {
                        debug!(error = %err, "outbound write failed");
                        break;
                    }
                }
                None => break,
            },
        }
    }
    // Flushes buffered frames and sends FIN where the transport has one
    let _ = sink.close().await;
}

/// Turn inbound frames into events until shutdown, EOF, or a fatal error.
/// Biased toward shutdown: once teardown has signalled, no further message
/// is dispatched even if frames are already buffered.
async fn read_loop(
    shared: Arc<Shared>,
    mut stream: SplitStream<Wire>,
    mut shutdown: watch::Receiver<bool>,
) {
    let reason = loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break None,
            frame = stream.next() => match frame {
                Some(Ok(message)) => {
                    shared.dispatcher.trigger(Event::from_message(message));
                }
                Some(Err(err)) => break Some(err.to_string()),
                None => break Some("connection closed by peer".to_owned()),
            },
        }
    };
    if let Some(reason) = &reason {
        info!(%reason, "connection lost");
    }
    teardown(&shared, reason);
}
