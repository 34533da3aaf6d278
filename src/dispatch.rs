//! Event registry and concurrent handler dispatch.
//!
//! Handlers are registered per event name and run as independent tokio
//! tasks when the event fires. Triggering never waits for handler
//! completion; a handler that fails or panics is logged and cannot take
//! down its siblings or the dispatch loop. [`Dispatcher::wait`] parks a
//! caller until the next firing of any of a set of events.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use bedrock_proto::Message;

/// Payload delivered to handlers and waiters when an event fires.
#[derive(Clone, Debug)]
pub struct Event {
    /// Normalized (uppercased) event name.
    pub name: String,
    /// The parsed message, for events derived from the wire. Synthetic
    /// lifecycle events carry `None`.
    pub message: Option<Message>,
    /// Human-readable failure reason; populated on `CLIENT_DISCONNECT`
    /// when the connection died rather than being closed on request.
    pub reason: Option<String>,
}

impl Event {
    /// A bare named event with no payload.
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize(name),
            message: None,
            reason: None,
        }
    }

    /// The event for a parsed wire message, keyed by the uppercased command.
    pub fn from_message(message: Message) -> Self {
        Self {
            name: message.event_name(),
            message: Some(message),
            reason: None,
        }
    }

    /// A named event carrying a failure reason.
    pub(crate) fn with_reason(name: &str, reason: Option<String>) -> Self {
        Self {
            name: normalize(name),
            message: None,
            reason,
        }
    }
}

type Handler = Arc<dyn Fn(Event) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

#[derive(Default)]
struct Slot {
    handlers: Vec<Handler>,
    waiters: Vec<mpsc::Sender<Event>>,
    fired: u64,
}

/// Event names are case-insensitive; `" ping "` and `"PING"` share a slot.
fn normalize(event: &str) -> String {
    event.trim().to_ascii_uppercase()
}

/// Registry of event handlers with concurrent fan-out dispatch.
#[derive(Default)]
pub struct Dispatcher {
    slots: Mutex<HashMap<String, Slot>>,
}

impl Dispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event. Registration is additive for the
    /// lifetime of the dispatcher: the same handler registered twice runs
    /// twice, and handlers are never removed.
    pub fn on<F, Fut>(&self, event: &str, handler: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |event| Box::pin(handler(event)));
        self.slots
            .lock()
            .entry(normalize(event))
            .or_default()
            .handlers
            .push(handler);
    }

    /// Fire an event: schedule every registered handler as its own task, in
    /// registration order, and resolve all pending waiters with a clone of
    /// the payload. Returns without waiting for handlers; the returned
    /// [`Dispatch`] can be awaited to join them (useful in tests and for
    /// callers that want a drain point). An event nobody registered for is
    /// dropped silently.
    pub fn trigger(&self, event: Event) -> Dispatch {
        let name = event.name.clone();
        // Only existing slots are touched: a stream of fabricated command
        // names from a hostile peer must not grow the registry unboundedly.
        let (handlers, waiters) = {
            let mut slots = self.slots.lock();
            match slots.get_mut(&name) {
                Some(slot) => {
                    slot.fired += 1;
                    (slot.handlers.clone(), std::mem::take(&mut slot.waiters))
                }
                None => (Vec::new(), Vec::new()),
            }
        };

        let mut tasks = Vec::with_capacity(handlers.len());
        for handler in handlers {
            let event = event.clone();
            let name = name.clone();
            tasks.push(tokio::spawn(async move {
                let run = AssertUnwindSafe(async move { handler(event).await });
                match run.catch_unwind().await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => warn!(event = %name, error = %err, "event handler failed"),
                    Err(_) => warn!(event = %name, "event handler panicked"),
                }
            }));
        }

        for waiter in waiters {
            // A waiter that already resolved through another of its events
            // is gone; failing to deliver is not an error.
            let _ = waiter.try_send(event.clone());
        }

        Dispatch { tasks }
    }

    /// Wait until the next firing of any of the named events, returning the
    /// payload of whichever fires first. Resolves at most once and never
    /// resolves if none of the events fire again; callers wanting a timeout
    /// apply one externally. Concurrent waits on the same event are
    /// independent and all resolve on the same firing.
    pub async fn wait(&self, events: &[&str]) -> Event {
        let (tx, mut rx) = mpsc::channel(1);
        {
            let mut slots = self.slots.lock();
            for event in events {
                slots
                    .entry(normalize(event))
                    .or_default()
                    .waiters
                    .push(tx.clone());
            }
        }
        drop(tx);

        match rx.recv().await {
            Some(event) => event,
            // No registered names means no firing can ever resolve this
            None => std::future::pending().await,
        }
    }

    /// Wait until every one of the named events has fired at least once
    /// after the call, returning the payloads in argument order.
    ///
    /// All waiters are registered before the first await, so an event firing
    /// while another is still pending is not missed. Like [`Dispatcher::wait`],
    /// this never resolves if one of the events never fires again.
    pub async fn wait_all(&self, events: &[&str]) -> Vec<Event> {
        let mut receivers = Vec::with_capacity(events.len());
        {
            let mut slots = self.slots.lock();
            for event in events {
                let (tx, rx) = mpsc::channel(1);
                slots
                    .entry(normalize(event))
                    .or_default()
                    .waiters
                    .push(tx);
                receivers.push(rx);
            }
        }

        let mut results = Vec::with_capacity(receivers.len());
        for mut rx in receivers {
            match rx.recv().await {
                Some(event) => results.push(event),
                None => std::future::pending().await,
            }
        }
        results
    }

    /// Number of times the named event has fired. Diagnostic only.
    ///
    /// Only events someone has registered a handler or waiter for are
    /// tracked; firings of a name nobody ever asked about count as zero.
    pub fn fired_count(&self, event: &str) -> u64 {
        self.slots
            .lock()
            .get(&normalize(event))
            .map_or(0, |slot| slot.fired)
    }
}

/// Join handle over the handler tasks scheduled by one trigger call.
pub struct Dispatch {
    tasks: Vec<JoinHandle<()>>,
}

impl Dispatch {
    /// Wait for every handler scheduled by the trigger call to finish.
    pub async fn join(self) {
        for task in self.tasks {
            if let Err(err) = task.await {
                warn!(error = %err, "event handler task aborted");
            }
        }
    }

    /// Number of handler tasks the trigger scheduled.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the trigger scheduled no handlers.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
