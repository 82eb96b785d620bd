//! Connection lifecycle states.
//!
//! A client session moves through these states:
//!
//! 1. **Disconnected** - no socket, before the first dial or after a failure
//! 2. **Authenticating** - socket open, greeting/login/logresp exchange running
//! 3. **Streaming** - logged in, receiving beacon lines
//! 4. **Reconnecting** - the stream failed and a new dial is being prepared
//! 5. **Closed** - terminal: cancelled, reconnect disabled, or retries exhausted
//!
//! A lost session or a failed dial drops back to `Disconnected`, from where
//! the client either moves to `Reconnecting` or to `Closed`. `Reconnecting`
//! leads back to `Authenticating`; `Closed` is never left.

use std::fmt;

/// Connection state for the APRS-IS client state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No live connection.
    #[default]
    Disconnected,

    /// Performing the login handshake.
    Authenticating,

    /// Logged in and receiving lines.
    Streaming,

    /// Waiting before the next dial attempt.
    Reconnecting,

    /// Connection is fully closed and will not be reopened.
    Closed,
}

impl ConnectionState {
    /// Returns true if a transition from `self` to `next` is legal.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        match (self, next) {
            (Closed, _) => false,
            (_, Closed) => true,
            (Disconnected, Authenticating) => true,
            (Disconnected, Reconnecting) => true,
            (Authenticating, Streaming) => true,
            (Authenticating, Disconnected) => true,
            (Streaming, Disconnected) => true,
            (Reconnecting, Authenticating) => true,
            _ => false,
        }
    }

    /// Returns true once the connection can no longer be used.
    pub fn is_terminal(self) -> bool {
        self == ConnectionState::Closed
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Authenticating => write!(f, "Authenticating"),
            Self::Streaming => write!(f, "Streaming"),
            Self::Reconnecting => write!(f, "Reconnecting"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_happy_path_transitions() {
        use ConnectionState::*;
        assert!(Disconnected.can_transition_to(Authenticating));
        assert!(Authenticating.can_transition_to(Streaming));
        assert!(Streaming.can_transition_to(Closed));
    }

    #[test]
    fn test_failure_passes_through_disconnected() {
        use ConnectionState::*;
        assert!(Streaming.can_transition_to(Disconnected));
        assert!(Authenticating.can_transition_to(Disconnected));
        assert!(Disconnected.can_transition_to(Reconnecting));
        assert!(Disconnected.can_transition_to(Closed));
        assert!(Reconnecting.can_transition_to(Authenticating));
        assert!(!Streaming.can_transition_to(Reconnecting));
    }

    #[test]
    fn test_closed_is_terminal() {
        use ConnectionState::*;
        assert!(Closed.is_terminal());
        assert!(!Closed.can_transition_to(Authenticating));
        assert!(!Closed.can_transition_to(Closed));
    }

    #[test]
    fn test_illegal_transitions() {
        use ConnectionState::*;
        assert!(!Disconnected.can_transition_to(Streaming));
        assert!(!Streaming.can_transition_to(Authenticating));
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionState::Streaming.to_string(), "Streaming");
        assert_eq!(ConnectionState::Reconnecting.to_string(), "Reconnecting");
    }
}
