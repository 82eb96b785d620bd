//! Async APRS-IS client for the Open Glider Network.
//!
//! This crate connects to an APRS server such as `aprs.glidernet.org`, logs
//! in, and streams the raw beacon lines it receives. It is built on top of the
//! low-level `aprs-protocol` crate and leaves decoding to `ogn-message`.
//!
//! # Features
//!
//! - **Async I/O**: Built on tokio; the read loop, keepalive and reconnect
//!   supervisor are coordinated through cancellation tokens
//! - **Keepalive**: `#keepalive` every 180 seconds by default
//! - **Automatic reconnection**: Exponential backoff with a cap
//! - **Backpressure**: Lines are handed over through a rendezvous queue, so
//!   the client reads no faster than the consumer takes lines
//! - **Configuration management**: TOML files and a fluent builder
//!
//! # Quick Start
//!
//! ```no_run
//! use ogn_client::{AprsClient, Config};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::builder().username("N0CALL").build()?;
//!     let client = Arc::new(AprsClient::new(config)?);
//!     let lines = client.receiver();
//!
//!     let cancel = CancellationToken::new();
//!     let runner = Arc::clone(&client);
//!     let token = cancel.clone();
//!     tokio::spawn(async move { runner.run(token).await });
//!
//!     while let Ok(line) = lines.recv_async().await {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Supervisor** ([`AprsClient::run`]): dial, stream, reconnect
//! - **Read loop**: one read attempt at a time, each with its own deadline
//! - **Keepalive task**: owns the write half for the session's lifetime
//!
//! # Error Handling
//!
//! Errors are categorized as either:
//! - **Retryable**: Dial, login and read failures (when reconnection is enabled)
//! - **Fatal**: Configuration errors, exhausted retries, a closed queue
//!
//! Cancellation is not an error: `run` returns `Ok(())`.

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// Public modules
pub mod config;
pub mod endpoint;
pub mod errors;
pub mod transport;

// Private implementation modules
mod connection;
mod event_loop;
mod protocol_trace;
mod reconnect;

// Optional CLI support
#[cfg(feature = "cli")]
pub mod args;

// Re-exports
pub use aprs_protocol::ConnectionState;
pub use config::{Config, ConfigBuilder};
pub use endpoint::{Authenticator, Credentials, Endpoint, Server};
pub use errors::OgnClientError;
pub use reconnect::Backoff;

use event_loop::SessionTiming;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Enables or disables line-level protocol tracing at runtime.
///
/// Tracing can also be enabled with `OGN_APRS_TRACE=1`. Traced lines are
/// logged at info level with target `protocol_trace`.
pub fn set_protocol_trace(on: bool) {
    protocol_trace::set_enabled(on);
}

pub(crate) fn set_state(state: &watch::Sender<ConnectionState>, next: ConnectionState) {
    let prev = state.send_replace(next);
    if prev != next {
        if !prev.can_transition_to(next) {
            tracing::warn!(from = %prev, to = %next, "Unexpected state transition");
        }
        tracing::debug!(from = %prev, to = %next, "Connection state changed");
    }
}

/// APRS client.
///
/// Create it with [`AprsClient::new`], drive it with [`AprsClient::run`] on
/// one task, and consume lines from [`AprsClient::receiver`] on another.
pub struct AprsClient {
    config: Config,
    server: Server,
    credentials: Credentials,
    lines_tx: Mutex<Option<flume::Sender<String>>>,
    lines_rx: flume::Receiver<String>,
    state_tx: watch::Sender<ConnectionState>,
}

impl AprsClient {
    /// Creates a client. No connection is made until [`run`](Self::run).
    ///
    /// # Errors
    ///
    /// Returns [`OgnClientError::Config`] if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self, OgnClientError> {
        config.validate()?;

        let (lines_tx, lines_rx) = flume::bounded(0);
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Self {
            server: config.server(),
            credentials: config.credentials(),
            config,
            lines_tx: Mutex::new(Some(lines_tx)),
            lines_rx,
            state_tx,
        })
    }

    /// Returns the configuration the client was created with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Connects and streams until cancelled or a failure cannot be recovered.
    ///
    /// The first dial is not retried. Once streaming, retryable failures are
    /// followed by reconnect attempts on the configured backoff schedule, and
    /// lines keep flowing into the same queue. When `run` returns the state is
    /// [`ConnectionState::Closed`] and the queue is closed, so blocked
    /// consumers wake up with [`OgnClientError::QueueClosed`].
    ///
    /// # Errors
    ///
    /// - [`OgnClientError::AlreadyStarted`] if `run` was called before
    /// - the initial dial or login failure
    /// - the session failure when reconnection is disabled
    /// - [`OgnClientError::ReconnectExhausted`] when every attempt failed
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), OgnClientError> {
        let lines = self
            .lines_tx
            .lock()
            .take()
            .ok_or(OgnClientError::AlreadyStarted)?;

        let reason = self.supervise(&lines, &cancel).await;

        set_state(&self.state_tx, ConnectionState::Closed);
        drop(lines);

        match reason {
            OgnClientError::Cancelled => {
                tracing::info!("APRS client cancelled");
                Ok(())
            }
            e => {
                tracing::error!(error = %e, "APRS client stopped");
                Err(e)
            }
        }
    }

    async fn supervise(
        &self,
        lines: &flume::Sender<String>,
        cancel: &CancellationToken,
    ) -> OgnClientError {
        let connect_timeout = self.config.connect_timeout();
        let timing = SessionTiming {
            read_timeout: self.config.read_timeout(),
            keepalive_interval: self.config.keepalive_interval(),
        };
        let backoff = self.config.backoff();

        set_state(&self.state_tx, ConnectionState::Authenticating);
        let dialled = tokio::select! {
            biased;
            _ = cancel.cancelled() => return OgnClientError::Cancelled,
            res = connection::establish(&self.server, &self.credentials, connect_timeout) => res,
        };
        let mut conn = match dialled {
            Ok(conn) => conn,
            Err(e) => return e,
        };

        loop {
            set_state(&self.state_tx, ConnectionState::Streaming);
            tracing::info!(server = %conn.login.server, "Streaming from {}", self.server);
            let reason = event_loop::run_session(conn, lines, cancel, timing).await;
            if reason.is_cancelled() {
                return reason;
            }
            set_state(&self.state_tx, ConnectionState::Disconnected);

            if !reason.is_retryable() {
                return reason;
            }
            if !self.config.reconnect.enabled {
                tracing::warn!(error = %reason, "Connection lost, reconnect disabled");
                return reason;
            }
            tracing::warn!(error = %reason, "Connection lost");

            conn = match reconnect::reconnect(
                &self.server,
                &self.credentials,
                &backoff,
                connect_timeout,
                &self.state_tx,
                cancel,
            )
            .await
            {
                Ok(conn) => conn,
                Err(e) => return e,
            };
        }
    }

    /// Receives the next line, blocking the current thread.
    ///
    /// Must not be called from inside the async runtime; use
    /// [`read_async`](Self::read_async) there.
    pub fn read(&self) -> Result<String, OgnClientError> {
        self.lines_rx.recv().map_err(|_| OgnClientError::QueueClosed)
    }

    /// Receives the next line.
    pub async fn read_async(&self) -> Result<String, OgnClientError> {
        self.lines_rx
            .recv_async()
            .await
            .map_err(|_| OgnClientError::QueueClosed)
    }

    /// Returns a handle on the output queue.
    #[must_use]
    pub fn receiver(&self) -> LineReceiver {
        LineReceiver {
            inner: self.lines_rx.clone(),
        }
    }

    /// Returns a watch on the connection state.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }
}

/// Consumer end of the output queue.
///
/// The queue has no buffer: each line is handed over directly and the client
/// waits until some receiver takes it. Clones share the same queue, so every
/// line goes to exactly one of them.
#[derive(Clone)]
pub struct LineReceiver {
    inner: flume::Receiver<String>,
}

impl LineReceiver {
    /// Receives the next line, blocking the current thread.
    pub fn recv(&self) -> Result<String, OgnClientError> {
        self.inner.recv().map_err(|_| OgnClientError::QueueClosed)
    }

    /// Receives the next line.
    pub async fn recv_async(&self) -> Result<String, OgnClientError> {
        self.inner
            .recv_async()
            .await
            .map_err(|_| OgnClientError::QueueClosed)
    }

    /// Receives the next line, blocking for at most `timeout`.
    ///
    /// Returns `Ok(None)` if no line arrived in time.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<String>, OgnClientError> {
        match self.inner.recv_timeout(timeout) {
            Ok(line) => Ok(Some(line)),
            Err(flume::RecvTimeoutError::Timeout) => Ok(None),
            Err(flume::RecvTimeoutError::Disconnected) => Err(OgnClientError::QueueClosed),
        }
    }
}
