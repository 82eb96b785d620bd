//! Dial and login.
//!
//! Opens the TCP transport, reads the server greeting, sends the login line and
//! checks the `# logresp` confirmation. Returns buffered line streams ready for
//! streaming.

use crate::endpoint::{Authenticator, Endpoint};
use crate::errors::OgnClientError;
use crate::protocol_trace;
use crate::transport::{Transport, TransportRead, TransportWrite};
use aprs_protocol::handshake::{read_greeting, recv_login_response, send_login};
use aprs_protocol::io::{AprsInStream, AprsOutStream};
use aprs_protocol::LoginResponse;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

/// Logged-in APRS session components.
pub struct Connection<R, W> {
    /// Buffered input stream for reading beacon lines.
    pub input: AprsInStream<R>,
    /// Buffered output stream for keepalives.
    pub output: AprsOutStream<W>,
    /// Server confirmation of the login.
    pub login: LoginResponse,
}

/// Connection over a TCP transport.
pub type TcpConnection = Connection<TransportRead, TransportWrite>;

/// Establish a new APRS connection.
///
/// Steps:
/// 1) Open TCP to the endpoint (TCP_NODELAY)
/// 2) Read the greeting, send the login line, read the confirmation
///
/// Both steps share `connect_timeout`.
pub async fn establish(
    endpoint: &dyn Endpoint,
    auth: &dyn Authenticator,
    connect_timeout: Duration,
) -> Result<TcpConnection, OgnClientError> {
    let address = endpoint.address();
    let started = tokio::time::Instant::now();

    let transport = Transport::connect(&address, connect_timeout).await?;
    let (mut input, mut output) = transport.split();

    let remaining = connect_timeout.saturating_sub(started.elapsed());
    let login = tokio::time::timeout(remaining, login(&mut input, &mut output, auth))
        .await
        .map_err(|_| {
            OgnClientError::HandshakeIo(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("login to {} timed out", address),
            ))
        })??;

    Ok(Connection {
        input,
        output,
        login,
    })
}

/// Run the login exchange on an already open connection.
pub async fn login<R, W>(
    input: &mut AprsInStream<R>,
    output: &mut AprsOutStream<W>,
    auth: &dyn Authenticator,
) -> Result<LoginResponse, OgnClientError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let greeting = read_greeting(input)
        .await
        .map_err(OgnClientError::GreetingFailed)?;
    protocol_trace::in_line(&greeting);
    tracing::debug!(greeting = %greeting, "Received server greeting");

    let command = auth.login_command();
    protocol_trace::out_login(&command);
    send_login(output, &command)
        .await
        .map_err(OgnClientError::HandshakeIo)?;

    let line = recv_login_response(input)
        .await
        .map_err(OgnClientError::HandshakeIo)?;
    protocol_trace::in_line(&line);

    let response = LoginResponse::parse(&line)
        .ok_or_else(|| OgnClientError::InvalidHandshakeResponse(line.clone()))?;

    if auth.has_password() && !response.is_verified() {
        return Err(OgnClientError::LoginRejected {
            user: response.user,
            status: response.status,
        });
    }

    tracing::info!(
        user = %response.user,
        status = %response.status,
        server = %response.server,
        "Logged in to APRS server"
    );
    Ok(response)
}
