//! Error types for the APRS client.

use aprs_protocol::LoginStatus;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during APRS client operation.
#[derive(Debug, Error)]
pub enum OgnClientError {
    /// TCP connection to the server could not be established.
    #[error("Failed to connect to {address}: {source}")]
    DialFailed {
        /// Address that was dialled.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The server greeting could not be read.
    #[error("Failed to read server greeting: {0}")]
    GreetingFailed(#[source] io::Error),

    /// Sending the login line or reading the confirmation failed.
    #[error("Login exchange failed: {0}")]
    HandshakeIo(#[source] io::Error),

    /// The server answered the login with something other than `# logresp`.
    #[error("Received invalid response from APRS server: {0}")]
    InvalidHandshakeResponse(String),

    /// A passcode was sent but the server did not verify it.
    #[error("Login attempt failed: {user} is {status}")]
    LoginRejected {
        /// Call sign the server reported.
        user: String,
        /// Status the server reported.
        status: LoginStatus,
    },

    /// No line arrived within the read deadline.
    #[error("Read from APRS server timed out after {0:?}")]
    ReadTimeout(Duration),

    /// Reading from the server failed (I/O error or peer closed).
    #[error("Read from APRS server failed: {0}")]
    ReadFailed(#[source] io::Error),

    /// Every reconnection attempt failed.
    #[error("Failed to reconnect to APRS server after {attempts} attempts")]
    ReconnectExhausted {
        /// Number of dial attempts made.
        attempts: u32,
    },

    /// The caller cancelled the client. Not a failure.
    #[error("Cancelled")]
    Cancelled,

    /// The output queue was closed on the other side.
    #[error("Line queue closed")]
    QueueClosed,

    /// `run` was called on a client that already ran.
    #[error("Client has already been started")]
    AlreadyStarted,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OgnClientError {
    /// Returns true if this error is potentially retryable.
    ///
    /// Retryable errors are transient network conditions; a reconnect may
    /// get past them.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DialFailed { .. }
                | Self::GreetingFailed(_)
                | Self::HandshakeIo(_)
                | Self::InvalidHandshakeResponse(_)
                | Self::ReadTimeout(_)
                | Self::ReadFailed(_)
        )
    }

    /// Returns true if this is a fatal error that should not be retried.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }

    /// Returns true for failures of the dial and login sequence.
    #[must_use]
    pub fn is_dial_failure(&self) -> bool {
        matches!(
            self,
            Self::DialFailed { .. }
                | Self::GreetingFailed(_)
                | Self::HandshakeIo(_)
                | Self::InvalidHandshakeResponse(_)
                | Self::LoginRejected { .. }
        )
    }

    /// Returns true if this is the cancellation outcome.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
