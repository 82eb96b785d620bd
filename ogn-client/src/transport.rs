//! TCP transport for APRS-IS connections.
//!
//! # Examples
//!
//! ```no_run
//! use ogn_client::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Transport::connect("aprs.glidernet.org:10152", Duration::from_secs(10)).await?;
//! let (input, output) = transport.split();
//! # Ok(())
//! # }
//! ```

use crate::errors::OgnClientError;
use aprs_protocol::io::{AprsInStream, AprsOutStream};
use std::io;
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// Read half of a split transport.
pub type TransportRead = OwnedReadHalf;

/// Write half of a split transport.
pub type TransportWrite = OwnedWriteHalf;

/// Plain TCP connection to an APRS server.
pub struct Transport {
    stream: TcpStream,
}

impl Transport {
    /// Connect to `address` (`host:port`).
    ///
    /// TCP_NODELAY is enabled so keepalive lines leave immediately.
    ///
    /// # Errors
    ///
    /// Returns [`OgnClientError::DialFailed`] if DNS resolution or the
    /// connection fails, or if the connection does not complete within
    /// `timeout`.
    pub async fn connect(address: &str, timeout: Duration) -> Result<Self, OgnClientError> {
        let dial_failed = |source: io::Error| OgnClientError::DialFailed {
            address: address.to_string(),
            source,
        };

        let stream = tokio::time::timeout(timeout, TcpStream::connect(address))
            .await
            .map_err(|_| dial_failed(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")))?
            .map_err(dial_failed)?;

        stream.set_nodelay(true).map_err(dial_failed)?;

        // Log local and remote addresses for correlation with server logs
        if let (Ok(local), Ok(peer)) = (stream.local_addr(), stream.peer_addr()) {
            tracing::info!("Connected via TCP: local={} -> remote={}", local, peer);
        } else {
            tracing::info!("Connected to {} via TCP", address);
        }
        Ok(Self { stream })
    }

    /// Split the transport into line-oriented input and output streams.
    ///
    /// The halves are owned, so the reader and the keepalive writer can live
    /// on different tasks.
    pub fn split(self) -> (AprsInStream<TransportRead>, AprsOutStream<TransportWrite>) {
        let (read, write) = self.stream.into_split();
        (AprsInStream::new(read), AprsOutStream::new(write))
    }
}
