//! Decoder registry and dispatch.
//!
//! A [`MessageRegistry`] maps type markers to [`Decoder`]s. Registration is
//! meant to happen during start-up; afterwards the registry is shared (usually
//! behind an `Arc`) and any number of tasks may call
//! [`decode`](MessageRegistry::decode) concurrently.

use crate::beacon::Message;
use crate::errors::{DecodeError, MessageError};
use crate::marker::extract_message_type;
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

/// Decoder for one message type.
///
/// Any `Fn(&str) -> Result<Message, DecodeError>` closure is a decoder.
///
/// # Contract
///
/// Implementors receive the full raw line, marker included, and must:
/// - return [`Message::Aircraft`] or [`Message::Station`] on success
/// - fail with their own error type (boxed) on malformed payloads
pub trait Decoder: Send + Sync {
    /// Decode a full raw line.
    fn decode(&self, line: &str) -> Result<Message, DecodeError>;
}

impl<F> Decoder for F
where
    F: Fn(&str) -> Result<Message, DecodeError> + Send + Sync,
{
    fn decode(&self, line: &str) -> Result<Message, DecodeError> {
        self(line)
    }
}

/// Mapping from type marker to decoder.
#[derive(Default)]
pub struct MessageRegistry {
    decoders: RwLock<HashMap<String, Arc<dyn Decoder>>>,
}

impl MessageRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `decoder` for `marker`.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::ParserAlreadyRegistered`] if the marker already
    /// has a decoder. The existing decoder stays in place.
    pub fn register<D>(&self, marker: impl Into<String>, decoder: D) -> Result<(), MessageError>
    where
        D: Decoder + 'static,
    {
        let marker = marker.into();
        match self.decoders.write().entry(marker) {
            Entry::Occupied(entry) => {
                Err(MessageError::ParserAlreadyRegistered(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                tracing::debug!(marker = %entry.key(), "Registered message decoder");
                entry.insert(Arc::new(decoder));
                Ok(())
            }
        }
    }

    /// Decodes a raw line with the decoder registered for its marker.
    ///
    /// # Errors
    ///
    /// - [`MessageError::MalformedMessage`] if no marker can be extracted
    /// - [`MessageError::ParserNotFound`] if the marker has no decoder
    /// - [`MessageError::Decoder`] wrapping whatever the decoder returned
    pub fn decode(&self, line: &str) -> Result<Message, MessageError> {
        let marker = extract_message_type(line)?;

        // Clone the handle so the decoder runs without holding the lock.
        let decoder = self.decoders.read().get(marker).cloned();
        let decoder = decoder.ok_or_else(|| MessageError::ParserNotFound {
            marker: marker.to_string(),
            line: line.to_string(),
        })?;

        decoder.decode(line).map_err(MessageError::Decoder)
    }

    /// Returns true if `marker` has a decoder.
    pub fn contains(&self, marker: &str) -> bool {
        self.decoders.read().contains_key(marker)
    }

    /// Registered markers, sorted.
    pub fn markers(&self) -> Vec<String> {
        let mut markers: Vec<String> = self.decoders.read().keys().cloned().collect();
        markers.sort();
        markers
    }

    /// Number of registered decoders.
    pub fn len(&self) -> usize {
        self.decoders.read().len()
    }

    /// Returns true if no decoder is registered.
    pub fn is_empty(&self) -> bool {
        self.decoders.read().is_empty()
    }
}

impl std::fmt::Debug for MessageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRegistry")
            .field("markers", &self.markers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon::StationBeacon;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct TestStation(&'static str);

    impl StationBeacon for TestStation {
        fn name(&self) -> &str {
            self.0
        }
        fn message_type(&self) -> &str {
            "TEST-1"
        }
        fn server(&self) -> &str {
            "TEST"
        }
        fn latitude(&self) -> f64 {
            0.0
        }
        fn longitude(&self) -> f64 {
            0.0
        }
        fn altitude(&self) -> i32 {
            0
        }
    }

    fn first_parser(_line: &str) -> Result<Message, DecodeError> {
        Ok(Message::Station(Box::new(TestStation("first"))))
    }

    fn second_parser(_line: &str) -> Result<Message, DecodeError> {
        Ok(Message::Station(Box::new(TestStation("second"))))
    }

    #[derive(Debug, thiserror::Error)]
    #[error("unsupported payload")]
    struct UnsupportedPayload;

    #[test]
    fn test_register_type() {
        let registry = MessageRegistry::new();
        assert!(registry.is_empty());

        registry.register("TEST-1", first_parser).unwrap();

        assert!(registry.contains("TEST-1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_duplicate_keeps_first() {
        let registry = MessageRegistry::new();
        registry.register("TEST-1", first_parser).unwrap();

        let err = registry.register("TEST-1", second_parser).unwrap_err();
        assert!(matches!(err, MessageError::ParserAlreadyRegistered(ref m) if m == "TEST-1"));

        let msg = registry.decode("SENDER>TEST-1,rest").unwrap();
        assert_eq!(msg.as_station().unwrap().name(), "first");
    }

    #[test]
    fn test_decode_dispatches_full_line() {
        let registry = MessageRegistry::new();
        let seen = Arc::new(parking_lot::Mutex::new(String::new()));
        let captured = Arc::clone(&seen);
        registry
            .register("TEST-1", move |line: &str| -> Result<Message, DecodeError> {
                *captured.lock() = line.to_string();
                Ok(Message::Station(Box::new(TestStation("captured"))))
            })
            .unwrap();

        registry.decode("EDER>TEST-1,TCPIP*,qAC,GLIDERN1:/114500h").unwrap();
        assert_eq!(*seen.lock(), "EDER>TEST-1,TCPIP*,qAC,GLIDERN1:/114500h");
    }

    #[test]
    fn test_decode_unknown_marker() {
        let registry = MessageRegistry::new();
        registry.register("TEST-1", first_parser).unwrap();

        let err = registry.decode("SENDER>OTHER,rest").unwrap_err();
        match err {
            MessageError::ParserNotFound { marker, line } => {
                assert_eq!(marker, "OTHER");
                assert_eq!(line, "SENDER>OTHER,rest");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_line_never_reaches_lookup() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry = MessageRegistry::new();
        registry
            .register("", move |_: &str| -> Result<Message, DecodeError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Message::Station(Box::new(TestStation("empty"))))
            })
            .unwrap();

        let err = registry.decode("no separators here").unwrap_err();
        assert!(matches!(err, MessageError::MalformedMessage(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_decoder_error_propagates_unchanged() {
        let registry = MessageRegistry::new();
        registry
            .register("TEST-1", |_: &str| -> Result<Message, DecodeError> {
                Err(Box::new(UnsupportedPayload))
            })
            .unwrap();

        let err = registry.decode("SENDER>TEST-1,rest").unwrap_err();
        let inner = err.decoder_error().unwrap();
        assert!(inner.downcast_ref::<UnsupportedPayload>().is_some());
    }

    #[test]
    fn test_markers_sorted() {
        let registry = MessageRegistry::new();
        registry.register("OGNSDR", first_parser).unwrap();
        registry.register("APRS", first_parser).unwrap();
        registry.register("OGFLR", first_parser).unwrap();

        assert_eq!(registry.markers(), vec!["APRS", "OGFLR", "OGNSDR"]);
    }

    #[test]
    fn test_concurrent_registration_admits_one_winner() {
        let registry = Arc::new(MessageRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.register("RACE", first_parser).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_concurrent_decode() {
        let registry = Arc::new(MessageRegistry::new());
        registry.register("TEST-1", first_parser).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let line = format!("S{}>TEST-1,x", i);
                        assert!(registry.decode(&line).is_ok());
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
    }
}
