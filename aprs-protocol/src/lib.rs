//! APRS-IS line protocol implementation.
//!
//! This crate provides the wire layer for connecting to an APRS-IS server such
//! as the Open Glider Network's `aprs.glidernet.org`. It handles line framing,
//! the login handshake grammar, and the connection state vocabulary shared by
//! the client.
//!
//! # Modules
//!
//! - [`io`] - Buffered line streams (AprsInStream, AprsOutStream)
//! - [`handshake`] - Greeting, login line and `# logresp` parsing
//! - [`connection`] - Connection state machine
//!
//! # Examples
//!
//! ```no_run
//! use aprs_protocol::{handshake, AprsInStream, AprsOutStream, LoginResponse};
//! use tokio::net::TcpStream;
//!
//! # async fn example() -> std::io::Result<()> {
//! let socket = TcpStream::connect("aprs.glidernet.org:10152").await?;
//! let (reader, writer) = tokio::io::split(socket);
//! let (mut input, mut output) = (AprsInStream::new(reader), AprsOutStream::new(writer));
//!
//! handshake::read_greeting(&mut input).await?;
//! let login = handshake::login_line("N0CALL", "-1", "demo", "0.1", "");
//! handshake::send_login(&mut output, &login).await?;
//! let line = handshake::recv_login_response(&mut input).await?;
//! println!("{:?}", LoginResponse::parse(&line));
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod handshake;
pub mod io;

// Re-export commonly used types
pub use connection::ConnectionState;
pub use handshake::{LoginResponse, LoginStatus};
pub use io::{AprsInStream, AprsOutStream};

/// Line sent periodically to keep an idle connection open.
pub const KEEPALIVE_LINE: &str = "#keepalive";

/// Returns true for server-generated comment lines (greeting, logresp,
/// periodic server banners). Beacon lines never start with `#`.
pub fn is_server_comment(line: &str) -> bool {
    line.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keepalive_is_a_comment() {
        assert!(is_server_comment(KEEPALIVE_LINE));
    }

    #[test]
    fn test_beacon_is_not_a_comment() {
        assert!(!is_server_comment("FLRDD89C9>APRS,qAS,EDER:/114500h4803.32N/01140.36E'"));
        assert!(is_server_comment("# aprsc 2.1.4-g408ed49 19 Oct 2026 11:45:00 GMT GLIDERN1"));
    }
}
