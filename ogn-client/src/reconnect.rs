//! Reconnection with exponential backoff.

use crate::config::duration_ms;
use crate::connection::{self, TcpConnection};
use crate::endpoint::{Authenticator, Endpoint};
use crate::errors::OgnClientError;
use aprs_protocol::ConnectionState;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Backoff schedule: attempt `i` waits `min(base * 2^i, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    max_retries: u32,
}

impl Backoff {
    /// Creates a schedule of `max_retries` attempts.
    pub fn new(base: Duration, max: Duration, max_retries: u32) -> Self {
        Self {
            base,
            max,
            max_retries,
        }
    }

    /// Number of attempts in the schedule.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before attempt `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .map_or(self.max, |d| d.min(self.max))
    }

    /// Iterator over every delay of the schedule.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries).map(move |i| self.delay(i))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60), 6)
    }
}

/// Dial again until a connection logs in, the schedule runs out or `cancel`
/// fires.
///
/// Every failure, a rejected login included, counts as one used attempt.
pub async fn reconnect(
    endpoint: &dyn Endpoint,
    auth: &dyn Authenticator,
    backoff: &Backoff,
    connect_timeout: Duration,
    state: &watch::Sender<ConnectionState>,
    cancel: &CancellationToken,
) -> Result<TcpConnection, OgnClientError> {
    for attempt in 0..backoff.max_retries() {
        let delay = backoff.delay(attempt);
        crate::set_state(state, ConnectionState::Reconnecting);
        tracing::info!(
            attempt = attempt + 1,
            max = backoff.max_retries(),
            delay_ms = duration_ms(delay),
            "Reconnecting to {}",
            endpoint.address()
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(OgnClientError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
        if cancel.is_cancelled() {
            return Err(OgnClientError::Cancelled);
        }

        crate::set_state(state, ConnectionState::Authenticating);
        let dialled = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(OgnClientError::Cancelled),
            res = connection::establish(endpoint, auth, connect_timeout) => res,
        };

        match dialled {
            Ok(conn) => {
                tracing::info!(attempt = attempt + 1, "Reconnected to {}", endpoint.address());
                return Ok(conn);
            }
            Err(e) => {
                crate::set_state(state, ConnectionState::Disconnected);
                tracing::warn!(attempt = attempt + 1, error = %e, "Reconnect attempt failed");
            }
        }
    }

    Err(OgnClientError::ReconnectExhausted {
        attempts: backoff.max_retries(),
    })
}
