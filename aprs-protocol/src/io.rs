//! Buffered line-oriented I/O streams for APRS-IS communication.
//!
//! APRS-IS is a plain text protocol: every message in either direction is a
//! single line terminated by `\r\n` (servers in the wild sometimes send a bare
//! `\n`, which is accepted as well).
//!
//! # Examples
//!
//! ```no_run
//! use aprs_protocol::io::{AprsInStream, AprsOutStream};
//! use tokio::net::TcpStream;
//!
//! # async fn example() -> std::io::Result<()> {
//! let socket = TcpStream::connect("aprs.glidernet.org:10152").await?;
//! let (reader, writer) = tokio::io::split(socket);
//!
//! let mut input = AprsInStream::new(reader);
//! let greeting = input.read_line().await?;
//!
//! let mut output = AprsOutStream::new(writer);
//! output.write_line("user N0CALL pass -1 ver demo 0.1");
//! output.flush().await?;
//! # Ok(())
//! # }
//! ```

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single line. APRS-IS caps packets at 512 bytes; anything
/// far beyond that means the peer is not speaking the protocol.
pub const MAX_LINE_LENGTH: usize = 8192;

/// Buffered input stream yielding one line at a time.
///
/// Data read from the socket is kept in an internal buffer, so
/// [`read_line`](Self::read_line) is cancel-safe: if the future is dropped
/// half way through a line, the bytes already received stay in the buffer and
/// the next call picks up where the previous one stopped.
pub struct AprsInStream<R> {
    reader: R,
    buffer: BytesMut,
}

impl<R: AsyncRead + Unpin> AprsInStream<R> {
    /// Create a new input stream with the default buffer size (8KB).
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, 8192)
    }

    /// Create a new input stream with the specified buffer capacity.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Read the next line, without its terminator.
    ///
    /// # Errors
    ///
    /// - `UnexpectedEof` if the peer closes the connection, even part way
    ///   through a line
    /// - `InvalidData` if a line grows beyond [`MAX_LINE_LENGTH`]
    /// - any I/O error from the underlying reader
    pub async fn read_line(&mut self) -> std::io::Result<String> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                let raw = self.buffer.split_to(pos + 1);
                return Ok(decode_line(&raw));
            }

            if self.buffer.len() > MAX_LINE_LENGTH {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("line exceeds {} bytes without terminator", MAX_LINE_LENGTH),
                ));
            }

            let bytes_read = self.reader.read_buf(&mut self.buffer).await?;
            if bytes_read == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    if self.buffer.is_empty() {
                        "connection closed by peer".to_string()
                    } else {
                        format!(
                            "connection closed with {} bytes of unterminated line",
                            self.buffer.len()
                        )
                    },
                ));
            }
        }
    }

    /// Number of bytes received but not yet returned as a line.
    pub fn available(&self) -> usize {
        self.buffer.len()
    }

    /// Discard any buffered, not yet returned data.
    pub fn clear(&mut self) {
        self.buffer.advance(self.buffer.len());
    }
}

fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    while end > 0 && matches!(raw[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Buffered output stream writing `\r\n`-terminated lines.
///
/// Lines are buffered and only sent when [`flush()`](Self::flush) is called.
pub struct AprsOutStream<W> {
    writer: W,
    buffer: BytesMut,
}

impl<W: AsyncWrite + Unpin> AprsOutStream<W> {
    /// Create a new output stream with the default buffer size (1KB).
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, 1024)
    }

    /// Create a new output stream with the specified buffer capacity.
    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        Self {
            writer,
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Buffer a single line. Any trailing line terminator in `line` is
    /// replaced by the protocol's `\r\n`.
    pub fn write_line(&mut self, line: &str) {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        self.buffer.extend_from_slice(line.as_bytes());
        self.buffer.extend_from_slice(b"\r\n");
    }

    /// Flush all buffered lines to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing the underlying writer fails.
    pub async fn flush(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            self.writer.write_all(&self.buffer).await?;
            self.buffer.clear();
        }
        self.writer.flush().await
    }

    /// Buffer a line and flush it immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing the underlying writer fails.
    pub async fn send_line(&mut self, line: &str) -> std::io::Result<()> {
        self.write_line(line);
        self.flush().await
    }

    /// Get the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
