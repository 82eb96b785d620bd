//! Message contracts and type-marker dispatch for OGN APRS beacons.
//!
//! Raw lines received from an APRS server look like
//! `FLRDD89C9>APRS,qAS,EDER:/114500h4803.32N/01140.36E'342/049/A=005524`.
//! The text between `>` and the first `,` after it is the *type marker*; it
//! selects the decoder that turns the line into a typed [`Message`].
//!
//! This crate defines:
//!
//! - the [`AircraftBeacon`] and [`StationBeacon`] capability sets decoders
//!   produce
//! - [`extract_message_type`], the marker extractor
//! - [`MessageRegistry`], the marker → [`Decoder`] table
//!
//! It ships no concrete decoders.
//!
//! # Example
//!
//! ```
//! use ogn_message::{DecodeError, Message, MessageError, MessageRegistry};
//!
//! # #[derive(Debug)] struct Station;
//! # impl ogn_message::StationBeacon for Station {
//! #     fn name(&self) -> &str { "EDER" }
//! #     fn message_type(&self) -> &str { "OGNSDR" }
//! #     fn server(&self) -> &str { "GLIDERN1" }
//! #     fn latitude(&self) -> f64 { 49.8 }
//! #     fn longitude(&self) -> f64 { 9.9 }
//! #     fn altitude(&self) -> i32 { 300 }
//! # }
//! fn decode_receiver(_line: &str) -> Result<Message, DecodeError> {
//!     Ok(Message::Station(Box::new(Station)))
//! }
//!
//! let registry = MessageRegistry::new();
//! registry.register("OGNSDR", decode_receiver)?;
//!
//! let msg = registry.decode("EDER>OGNSDR,TCPIP*,qAC,GLIDERN1:/114500h")?;
//! assert_eq!(msg.as_station().unwrap().name(), "EDER");
//!
//! assert!(matches!(
//!     registry.decode("EDER>OGFLR,qAS"),
//!     Err(MessageError::ParserNotFound { .. })
//! ));
//! # Ok::<(), MessageError>(())
//! ```

pub mod beacon;
pub mod errors;
pub mod marker;
pub mod registry;

pub use beacon::{
    valid_heading, valid_latitude, valid_longitude, AircraftBeacon, FieldValue, Message,
    StationBeacon,
};
pub use errors::{DecodeError, MessageError};
pub use marker::extract_message_type;
pub use registry::{Decoder, MessageRegistry};
