//! Error types for message extraction and dispatch.

use thiserror::Error;

/// Error produced by a decoder. Opaque to the registry and passed through
/// unchanged; callers can `downcast_ref` to the decoder's own type.
pub type DecodeError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while routing a raw line to its decoder.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The line lacks the `sender>marker,` structure.
    #[error("Cannot parse message: {0}")]
    MalformedMessage(String),

    /// No decoder is registered for the extracted marker.
    #[error("Parser for message type {marker} not found: {line}")]
    ParserNotFound {
        /// The marker that was looked up.
        marker: String,
        /// The offending line.
        line: String,
    },

    /// A decoder is already registered for the marker.
    #[error("Parser for message type {0} already exists")]
    ParserAlreadyRegistered(String),

    /// The decoder rejected the line.
    #[error("Decoder failed: {0}")]
    Decoder(#[source] DecodeError),
}

impl MessageError {
    /// Returns the decoder's own error, if this is a decoder failure.
    #[must_use]
    pub fn decoder_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Decoder(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("bad latitude")]
    struct BadLatitude;

    #[test]
    fn test_error_display() {
        let err = MessageError::ParserNotFound {
            marker: "OGFLR".to_string(),
            line: "X>OGFLR,rest".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parser for message type OGFLR not found: X>OGFLR,rest"
        );

        let err = MessageError::ParserAlreadyRegistered("APRS".to_string());
        assert_eq!(err.to_string(), "Parser for message type APRS already exists");

        let err = MessageError::MalformedMessage("garbage".to_string());
        assert_eq!(err.to_string(), "Cannot parse message: garbage");
    }

    #[test]
    fn test_decoder_error_is_preserved() {
        let err = MessageError::Decoder(Box::new(BadLatitude));
        let inner = err.decoder_error().unwrap();
        assert!(inner.downcast_ref::<BadLatitude>().is_some());
        assert!(MessageError::ParserAlreadyRegistered("X".into())
            .decoder_error()
            .is_none());
    }
}
