//! Server address and login credentials.
//!
//! The connection engine only sees these through the [`Endpoint`] and
//! [`Authenticator`] traits, so tests and embedders can supply their own.

use aprs_protocol::handshake::{login_line, NO_PASSCODE};
use std::fmt;

/// Something the engine can dial.
pub trait Endpoint: Send + Sync {
    /// Address in `host:port` form.
    fn address(&self) -> String;
}

/// Something that can log in to an APRS server.
pub trait Authenticator: Send + Sync {
    /// Call sign used for the login.
    fn username(&self) -> &str;

    /// Full login line, without terminator.
    fn login_command(&self) -> String;

    /// Returns true if a real passcode is sent, in which case the server must
    /// answer `verified`.
    fn has_password(&self) -> bool;
}

/// APRS server address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Server {
    /// Creates a new server address.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Endpoint for Server {
    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Call sign.
    pub username: String,
    /// APRS passcode, sent as given. `-1` requests a read-only login.
    pub password: String,
    /// Server-side filter expression, appended verbatim when non-empty.
    pub filter: String,
}

impl Credentials {
    /// Creates credentials with an explicit passcode and filter.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        filter: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            filter: filter.into(),
        }
    }

    /// Read-only credentials with the `-1` passcode.
    pub fn anonymous(username: impl Into<String>) -> Self {
        Self::new(username, NO_PASSCODE, "")
    }
}

impl Authenticator for Credentials {
    fn username(&self) -> &str {
        &self.username
    }

    fn login_command(&self) -> String {
        login_line(
            &self.username,
            &self.password,
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            &self.filter,
        )
    }

    fn has_password(&self) -> bool {
        !self.password.is_empty() && self.password != NO_PASSCODE
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field(
                "password",
                &if self.has_password() { "***" } else { self.password.as_str() },
            )
            .field("filter", &self.filter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_server_address() {
        let server = Server::new("aprs.glidernet.org", 10152);
        assert_eq!(server.address(), "aprs.glidernet.org:10152");
        assert_eq!(server.to_string(), server.address());
    }

    #[test]
    fn test_login_command_anonymous() {
        let creds = Credentials::anonymous("N0CALL");
        assert_eq!(
            creds.login_command(),
            format!("user N0CALL pass -1 ver ogn-client {}", env!("CARGO_PKG_VERSION"))
        );
        assert!(!creds.has_password());
    }

    #[test]
    fn test_login_command_with_filter() {
        let creds = Credentials::new("bob", "12345", "filter r/48/11/100");
        let line = creds.login_command();
        assert!(line.starts_with("user bob pass 12345 ver ogn-client "));
        assert!(line.ends_with(" filter r/48/11/100"));
        assert!(creds.has_password());
    }

    #[test]
    fn test_password_sent_verbatim() {
        let creds = Credentials::new("bob", "", "");
        assert_eq!(
            creds.login_command(),
            format!("user bob pass  ver ogn-client {}", env!("CARGO_PKG_VERSION"))
        );
        assert!(!creds.has_password());

        let creds = Credentials::new("bob", "0042", "");
        assert!(creds.login_command().starts_with("user bob pass 0042 ver "));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("bob", "12345", "");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("12345"));
        assert!(debug.contains("***"));
    }
}
