//! APRS-IS login handshake.
//!
//! The exchange is three lines long:
//!
//! 1. **Greeting** - the server announces itself (`# aprsc 2.1.4-g408ed49`)
//! 2. **Login** - the client sends
//!    `user <call> pass <passcode> ver <software> <version> [filter <...>]`
//! 3. **Confirmation** - the server answers
//!    `# logresp <call> verified|unverified, server <name>`
//!
//! A passcode of `-1` requests a read-only, unverified login, which is what
//! OGN receivers and most listeners use. The passcode is sent as given.
//!
//! This module only knows the grammar. Deciding whether an `unverified`
//! answer is acceptable is left to the caller, since it depends on the
//! credentials that were sent.

use crate::io::{AprsInStream, AprsOutStream};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};

/// Passcode sent when no verification is requested.
pub const NO_PASSCODE: &str = "-1";

static LOGIN_RESPONSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"# logresp (?P<user>\w+) (?P<status>verified|unverified), server (?P<server>\w+)")
        .expect("login response pattern is valid")
});

/// Verification status reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginStatus {
    /// Passcode accepted, the client may transmit.
    Verified,
    /// Read-only session.
    Unverified,
}

impl LoginStatus {
    /// Wire representation of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Unverified => "unverified",
        }
    }
}

impl fmt::Display for LoginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed `# logresp` confirmation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    /// Call sign the server logged us in as.
    pub user: String,
    /// Whether the passcode was accepted.
    pub status: LoginStatus,
    /// Name of the server handling the session.
    pub server: String,
}

impl LoginResponse {
    /// Parse a confirmation line. Returns `None` if the line does not follow
    /// the `# logresp` grammar.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = LOGIN_RESPONSE.captures(line)?;
        let status = match &caps["status"] {
            "verified" => LoginStatus::Verified,
            _ => LoginStatus::Unverified,
        };
        Some(Self {
            user: caps["user"].to_string(),
            status,
            server: caps["server"].to_string(),
        })
    }

    /// Returns true if the server accepted the passcode.
    pub fn is_verified(&self) -> bool {
        self.status == LoginStatus::Verified
    }
}

/// Build the login line sent after the greeting.
///
/// An empty `filter` is omitted entirely.
pub fn login_line(username: &str, password: &str, product: &str, version: &str, filter: &str) -> String {
    let mut line = format!("user {} pass {} ver {} {}", username, password, product, version);
    if !filter.is_empty() {
        line.push(' ');
        line.push_str(filter);
    }
    line
}

/// Read the server greeting.
pub async fn read_greeting<R: AsyncRead + Unpin>(
    instream: &mut AprsInStream<R>,
) -> std::io::Result<String> {
    instream.read_line().await
}

/// Send the login line.
pub async fn send_login<W: AsyncWrite + Unpin>(
    outstream: &mut AprsOutStream<W>,
    login: &str,
) -> std::io::Result<()> {
    outstream.send_line(login).await
}

/// Read the raw login confirmation line. Use [`LoginResponse::parse`] to
/// interpret it.
pub async fn recv_login_response<R: AsyncRead + Unpin>(
    instream: &mut AprsInStream<R>,
) -> std::io::Result<String> {
    instream.read_line().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create_duplex_pair() -> (
        (AprsInStream<tokio::io::DuplexStream>, AprsOutStream<tokio::io::DuplexStream>),
        (AprsInStream<tokio::io::DuplexStream>, AprsOutStream<tokio::io::DuplexStream>),
    ) {
        let (client_read, server_write) = tokio::io::duplex(1024);
        let (server_read, client_write) = tokio::io::duplex(1024);
        (
            (AprsInStream::new(client_read), AprsOutStream::new(client_write)),
            (AprsInStream::new(server_read), AprsOutStream::new(server_write)),
        )
    }

    #[test]
    fn test_parse_verified() {
        let resp = LoginResponse::parse("# logresp bob verified, server TEST").unwrap();
        assert_eq!(
            resp,
            LoginResponse {
                user: "bob".to_string(),
                status: LoginStatus::Verified,
                server: "TEST".to_string(),
            }
        );
        assert!(resp.is_verified());
    }

    #[test]
    fn test_parse_unverified() {
        let resp = LoginResponse::parse("# logresp N0CALL unverified, server GLIDERN2").unwrap();
        assert_eq!(resp.user, "N0CALL");
        assert_eq!(resp.status, LoginStatus::Unverified);
        assert_eq!(resp.server, "GLIDERN2");
        assert!(!resp.is_verified());
    }

    #[test]
    fn test_parse_rejects_other_lines() {
        assert!(LoginResponse::parse("# aprsc 2.1.4-g408ed49").is_none());
        assert!(LoginResponse::parse("# logresp bob maybe, server TEST").is_none());
        assert!(LoginResponse::parse("").is_none());
    }

    #[test]
    fn test_login_status_display() {
        assert_eq!(LoginStatus::Verified.to_string(), "verified");
        assert_eq!(LoginStatus::Unverified.to_string(), "unverified");
    }

    #[test]
    fn test_login_line_without_filter() {
        assert_eq!(
            login_line("bob", "-1", "ogn-client", "0.1.0", ""),
            "user bob pass -1 ver ogn-client 0.1.0"
        );
    }

    #[test]
    fn test_login_line_with_filter() {
        assert_eq!(
            login_line("bob", "12345", "ogn-client", "0.1.0", "filter r/48/11/100"),
            "user bob pass 12345 ver ogn-client 0.1.0 filter r/48/11/100"
        );
    }

    #[tokio::test]
    async fn test_handshake_exchange() {
        let ((mut client_in, mut client_out), (mut server_in, mut server_out)) = create_duplex_pair();

        server_out.send_line("# aprsc 2.1.4").await.unwrap();
        let greeting = read_greeting(&mut client_in).await.unwrap();
        assert_eq!(greeting, "# aprsc 2.1.4");

        send_login(&mut client_out, "user bob pass -1 ver test 1.0").await.unwrap();
        assert_eq!(
            server_in.read_line().await.unwrap(),
            "user bob pass -1 ver test 1.0"
        );

        server_out
            .send_line("# logresp bob unverified, server TEST")
            .await
            .unwrap();
        let line = recv_login_response(&mut client_in).await.unwrap();
        let resp = LoginResponse::parse(&line).unwrap();
        assert_eq!(resp.status, LoginStatus::Unverified);
    }

    #[tokio::test]
    async fn test_greeting_fails_on_closed_connection() {
        let ((mut client_in, _), (_, server_out)) = create_duplex_pair();
        drop(server_out);

        let err = read_greeting(&mut client_in).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }
}
