//! Connection lifecycle state machine.
//!
//! State is mutated only through [`StateMachine`]'s transition methods
//! (single writer); everything else reads it to gate operations such as
//! outbound sends.

use parking_lot::Mutex;
use tracing::debug;

/// Lifecycle state of a client connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport, nothing in flight.
    #[default]
    Disconnected,
    /// Transport open requested, not yet established.
    Connecting,
    /// Transport established; sends are allowed.
    Connected,
    /// Close requested or fatal error seen; waiting for transport teardown.
    Closing,
}

/// Guarded connection state with the legal transition set.
#[derive(Debug, Default)]
pub(crate) struct StateMachine {
    current: Mutex<ConnectionState>,
}

impl StateMachine {
    pub(crate) fn current(&self) -> ConnectionState {
        *self.current.lock()
    }

    /// Disconnected → Connecting. Returns `false` when a connection is
    /// already underway or established; connect is then a no-op.
    pub(crate) fn begin_connect(&self) -> bool {
        let mut state = self.current.lock();
        match *state {
            ConnectionState::Disconnected => {
                *state = ConnectionState::Connecting;
                debug!(state = ?*state, "connection state");
                true
            }
            _ => false,
        }
    }

    /// Connecting → Disconnected, for a failed open. Fires no lifecycle
    /// event: the connection never came up.
    pub(crate) fn abort_connect(&self) {
        let mut state = self.current.lock();
        if *state == ConnectionState::Connecting {
            *state = ConnectionState::Disconnected;
            debug!(state = ?*state, "connection state");
        }
    }

    /// Connecting → Connected.
    pub(crate) fn set_connected(&self) {
        let mut state = self.current.lock();
        if *state == ConnectionState::Connecting {
            *state = ConnectionState::Connected;
            debug!(state = ?*state, "connection state");
        }
    }

    /// Connected/Connecting → Closing. Returns `false` when there is
    /// nothing to close.
    pub(crate) fn begin_close(&self) -> bool {
        let mut state = self.current.lock();
        match *state {
            ConnectionState::Connected | ConnectionState::Connecting => {
                *state = ConnectionState::Closing;
                debug!(state = ?*state, "connection state");
                true
            }
            _ => false,
        }
    }

    /// Any non-Disconnected state → Disconnected. Returns `true` when a
    /// transition actually happened, so the disconnect event fires exactly
    /// once per connection.
    pub(crate) fn set_disconnected(&self) -> bool {
        let mut state = self.current.lock();
        if *state == ConnectionState::Disconnected {
            return false;
        }
        *state = ConnectionState::Disconnected;
        debug!(state = ?*state, "connection state");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let machine = StateMachine::default();
        assert_eq!(machine.current(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_full_lifecycle() {
        let machine = StateMachine::default();

        assert!(machine.begin_connect());
        assert_eq!(machine.current(), ConnectionState::Connecting);

        machine.set_connected();
        assert_eq!(machine.current(), ConnectionState::Connected);

        assert!(machine.begin_close());
        assert_eq!(machine.current(), ConnectionState::Closing);

        assert!(machine.set_disconnected());
        assert_eq!(machine.current(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_reentrant_connect_is_refused() {
        let machine = StateMachine::default();
        assert!(machine.begin_connect());
        assert!(!machine.begin_connect());

        machine.set_connected();
        assert!(!machine.begin_connect());
    }

    #[test]
    fn test_abort_connect_fires_nothing_later() {
        let machine = StateMachine::default();
        assert!(machine.begin_connect());
        machine.abort_connect();
        assert_eq!(machine.current(), ConnectionState::Disconnected);
        // No prior connection, so there is nothing to mark disconnected
        assert!(!machine.set_disconnected());
    }

    #[test]
    fn test_disconnect_only_once() {
        let machine = StateMachine::default();
        assert!(machine.begin_connect());
        machine.set_connected();

        assert!(machine.set_disconnected());
        assert!(!machine.set_disconnected());
    }

    #[test]
    fn test_close_requires_connection() {
        let machine = StateMachine::default();
        assert!(!machine.begin_close());
    }

    #[test]
    fn test_set_connected_ignored_after_close() {
        let machine = StateMachine::default();
        assert!(machine.begin_connect());
        assert!(machine.begin_close());
        machine.set_connected();
        assert_eq!(machine.current(), ConnectionState::Closing);
    }
}
