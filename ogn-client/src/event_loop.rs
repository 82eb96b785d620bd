//! Streaming session: read loop and keepalive.
//!
//! A session owns one logged-in [`Connection`]. The read half stays on the
//! calling task; the write half moves into a keepalive task. Both observe a
//! session token that is a child of the caller's token, and the session always
//! cancels and joins the keepalive task before returning.

use crate::connection::Connection;
use crate::errors::OgnClientError;
use crate::protocol_trace;
use aprs_protocol::io::{AprsInStream, AprsOutStream};
use aprs_protocol::KEEPALIVE_LINE;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Timings for one streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    /// Deadline for one read attempt.
    pub read_timeout: Duration,
    /// Interval between keepalive lines.
    pub keepalive_interval: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(15),
            keepalive_interval: Duration::from_secs(180),
        }
    }
}

/// Stream lines from `conn` into `lines` until something ends the session.
///
/// Always returns the reason the session ended. [`OgnClientError::Cancelled`]
/// means `cancel` fired; everything else is a failure for the supervisor to
/// judge.
pub async fn run_session<R, W>(
    conn: Connection<R, W>,
    lines: &flume::Sender<String>,
    cancel: &CancellationToken,
    timing: SessionTiming,
) -> OgnClientError
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let Connection {
        mut input, output, ..
    } = conn;

    let session = cancel.child_token();
    let keepalive = tokio::spawn(keepalive_loop(
        output,
        session.clone(),
        timing.keepalive_interval,
    ));

    let reason = read_loop(&mut input, lines, &session, timing.read_timeout).await;

    session.cancel();
    if let Err(e) = keepalive.await {
        tracing::error!(error = %e, "Keepalive task failed");
    }

    if cancel.is_cancelled() {
        return OgnClientError::Cancelled;
    }
    tracing::debug!(reason = %reason, "Streaming session ended");
    reason
}

async fn read_loop<R: AsyncRead + Unpin>(
    input: &mut AprsInStream<R>,
    lines: &flume::Sender<String>,
    cancel: &CancellationToken,
    read_timeout: Duration,
) -> OgnClientError {
    loop {
        let attempt = tokio::select! {
            biased;
            _ = cancel.cancelled() => return OgnClientError::Cancelled,
            res = tokio::time::timeout(
                read_timeout,
                AssertUnwindSafe(input.read_line()).catch_unwind(),
            ) => res,
        };

        let line = match attempt {
            Err(_) => return OgnClientError::ReadTimeout(read_timeout),
            Ok(Err(panic)) => {
                tracing::error!(panic = %panic_message(&panic), "Read attempt panicked");
                continue;
            }
            Ok(Ok(Err(e))) => return OgnClientError::ReadFailed(e),
            Ok(Ok(Ok(line))) => line,
        };
        protocol_trace::in_line(&line);

        // Rendezvous: completes only once the consumer has taken the line.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return OgnClientError::Cancelled,
            res = lines.send_async(line) => {
                if res.is_err() {
                    return OgnClientError::QueueClosed;
                }
            }
        }
    }
}

async fn keepalive_loop<W: AsyncWrite + Unpin>(
    mut output: AprsOutStream<W>,
    session: CancellationToken,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = session.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let res = tokio::select! {
            biased;
            _ = session.cancelled() => break,
            res = output.send_line(KEEPALIVE_LINE) => res,
        };

        match res {
            Ok(()) => {
                protocol_trace::out_line(KEEPALIVE_LINE);
                tracing::debug!("Sent keepalive");
            }
            Err(e) => {
                // The read side notices the broken connection on its own.
                tracing::warn!(error = %e, "Keepalive write failed");
                break;
            }
        }
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
