//! Line-level trace of the APRS-IS conversation.
//!
//! When enabled, every line the client reads from the server (greeting,
//! `# logresp`, beacons, server comments) and every line it writes (login,
//! `#keepalive`) is logged at info level under the `protocol_trace` target,
//! prefixed with `IN` or `OUT`. The passcode in the login line is masked.
//!
//! Off by default; `OGN_APRS_TRACE=1` turns it on at start-up and
//! [`crate::set_protocol_trace`] toggles it at runtime.

use aprs_protocol::handshake::NO_PASSCODE;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};

const TRACE_ENV: &str = "OGN_APRS_TRACE";

static TRACE_ENABLED: Lazy<AtomicBool> =
    Lazy::new(|| AtomicBool::new(flag_set(std::env::var(TRACE_ENV).ok().as_deref())));

fn flag_set(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "TRUE" | "on"))
}

#[inline]
pub fn enabled() -> bool {
    TRACE_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn set_enabled(on: bool) {
    TRACE_ENABLED.store(on, Ordering::Relaxed);
}

/// Line written to the server.
#[inline]
pub fn out_line(line: &str) {
    if enabled() {
        tracing::info!(target: "protocol_trace", "OUT {}", line);
    }
}

/// Line read from the server.
#[inline]
pub fn in_line(line: &str) {
    if enabled() {
        tracing::info!(target: "protocol_trace", "IN  {}", line);
    }
}

/// Traces the login line with its passcode masked.
pub fn out_login(line: &str) {
    if enabled() {
        out_line(&redact_login(line));
    }
}

/// Login line with the passcode masked. The read-only `-1` and an empty
/// passcode are left as they are.
pub fn redact_login(line: &str) -> String {
    let mut words: Vec<&str> = line.split(' ').collect();
    if let Some(pos) = words.iter().position(|w| *w == "pass") {
        if let Some(code) = words.get_mut(pos + 1) {
            if !code.is_empty() && *code != NO_PASSCODE {
                *code = "***";
            }
        }
    }
    words.join(" ")
}
