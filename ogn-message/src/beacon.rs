//! Decoded message contracts.
//!
//! Concrete beacon formats (FLARM, OGN tracker, receiver status, ...) live in
//! decoder implementations outside this crate. They hand their results back
//! as a [`Message`], whose variants only expose the capability sets below.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Value of a single field in the generic [`AircraftBeacon::as_map`] view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free text (identifiers, names).
    Text(String),
    /// Whole number.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Point in time.
    Time(DateTime<Utc>),
    /// Field present in the format but not set in this message.
    Absent,
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u16> for FieldValue {
    fn from(value: u16) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Time(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

/// Position report originating from an aircraft.
pub trait AircraftBeacon: fmt::Debug + Send + Sync {
    /// Unique identifier of the sender.
    fn sender(&self) -> &str;

    /// Format marker the message was encoded with.
    fn message_type(&self) -> &str;

    /// Identifier of the aircraft that relayed the message, `None` if it was
    /// received directly.
    fn relayer(&self) -> Option<&str>;

    /// Name of the ground station that received the message.
    fn receiver(&self) -> &str;

    /// Time of the report.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Latitude in decimal degrees, within [-90, 90].
    fn latitude(&self) -> f64;

    /// Longitude in decimal degrees, within [-180, 180].
    fn longitude(&self) -> f64;

    /// Heading in degrees, within [0, 360]. 0 means no data.
    fn heading(&self) -> u16;

    /// Speed reported by the aircraft, in m/s.
    fn speed(&self) -> f64;

    /// Altitude reported by the aircraft, in m.
    fn altitude(&self) -> i32;

    /// Generic mapping from field names to values.
    ///
    /// The default covers the common fields; formats with extra fields
    /// should extend it.
    fn as_map(&self) -> BTreeMap<String, FieldValue> {
        let mut map = BTreeMap::new();
        map.insert("sender".to_string(), self.sender().into());
        map.insert("type".to_string(), self.message_type().into());
        map.insert("relayer".to_string(), self.relayer().into());
        map.insert("receiver".to_string(), self.receiver().into());
        map.insert("time".to_string(), self.timestamp().into());
        map.insert("latitude".to_string(), self.latitude().into());
        map.insert("longitude".to_string(), self.longitude().into());
        map.insert("heading".to_string(), self.heading().into());
        map.insert("speed".to_string(), self.speed().into());
        map.insert("altitude".to_string(), self.altitude().into());
        map
    }

    /// Encode the message back into an APRS line.
    fn as_aprs(&self) -> String;
}

/// Status or position report from a ground station (receiver).
pub trait StationBeacon: fmt::Debug + Send + Sync {
    /// Name of the ground station.
    fn name(&self) -> &str;

    /// Format marker the message was encoded with.
    fn message_type(&self) -> &str;

    /// Identifier of the server that relayed the message.
    fn server(&self) -> &str;

    /// Latitude in decimal degrees, within [-90, 90].
    fn latitude(&self) -> f64;

    /// Longitude in decimal degrees, within [-180, 180].
    fn longitude(&self) -> f64;

    /// Altitude of the station, in m.
    fn altitude(&self) -> i32;
}

/// A decoded line.
#[derive(Debug)]
pub enum Message {
    /// Aircraft position beacon.
    Aircraft(Box<dyn AircraftBeacon>),
    /// Ground station beacon.
    Station(Box<dyn StationBeacon>),
}

impl Message {
    /// Format marker of the decoded line.
    pub fn message_type(&self) -> &str {
        match self {
            Self::Aircraft(b) => b.message_type(),
            Self::Station(b) => b.message_type(),
        }
    }

    /// Returns the aircraft view, if this is an aircraft beacon.
    pub fn as_aircraft(&self) -> Option<&dyn AircraftBeacon> {
        match self {
            Self::Aircraft(b) => Some(b.as_ref()),
            Self::Station(_) => None,
        }
    }

    /// Returns the station view, if this is a station beacon.
    pub fn as_station(&self) -> Option<&dyn StationBeacon> {
        match self {
            Self::Station(b) => Some(b.as_ref()),
            Self::Aircraft(_) => None,
        }
    }
}

/// Returns true if `lat` is a valid latitude in decimal degrees.
pub fn valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat)
}

/// Returns true if `lon` is a valid longitude in decimal degrees.
pub fn valid_longitude(lon: f64) -> bool {
    (-180.0..=180.0).contains(&lon)
}

/// Returns true if `heading` is within [0, 360].
pub fn valid_heading(heading: u16) -> bool {
    heading <= 360
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct StubAircraft;

    impl AircraftBeacon for StubAircraft {
        fn sender(&self) -> &str {
            "FLRDD89C9"
        }
        fn message_type(&self) -> &str {
            "APRS"
        }
        fn relayer(&self) -> Option<&str> {
            None
        }
        fn receiver(&self) -> &str {
            "EDER"
        }
        fn timestamp(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 10, 19, 11, 45, 0).unwrap()
        }
        fn latitude(&self) -> f64 {
            48.0553
        }
        fn longitude(&self) -> f64 {
            11.6727
        }
        fn heading(&self) -> u16 {
            342
        }
        fn speed(&self) -> f64 {
            25.2
        }
        fn altitude(&self) -> i32 {
            1684
        }
        fn as_aprs(&self) -> String {
            "FLRDD89C9>APRS,qAS,EDER:/114500h4803.32N/01140.36E'342/049/A=005524".to_string()
        }
    }

    #[derive(Debug)]
    struct StubStation;

    impl StationBeacon for StubStation {
        fn name(&self) -> &str {
            "EDER"
        }
        fn message_type(&self) -> &str {
            "OGNSDR"
        }
        fn server(&self) -> &str {
            "GLIDERN1"
        }
        fn latitude(&self) -> f64 {
            49.8
        }
        fn longitude(&self) -> f64 {
            9.9
        }
        fn altitude(&self) -> i32 {
            300
        }
    }

    #[test]
    fn test_default_as_map() {
        let map = StubAircraft.as_map();
        assert_eq!(map["sender"], FieldValue::Text("FLRDD89C9".to_string()));
        assert_eq!(map["relayer"], FieldValue::Absent);
        assert_eq!(map["heading"], FieldValue::Integer(342));
        assert_eq!(map["altitude"], FieldValue::Integer(1684));
        assert_eq!(map.len(), 10);
    }

    #[test]
    fn test_field_values_serialize_untagged() {
        let json = serde_json::to_value(StubAircraft.as_map()).unwrap();
        assert_eq!(json["sender"], "FLRDD89C9");
        assert_eq!(json["speed"], 25.2);
        assert!(json["relayer"].is_null());
        assert_eq!(json["time"], "2026-10-19T11:45:00Z");
    }

    #[test]
    fn test_message_views() {
        let msg = Message::Aircraft(Box::new(StubAircraft));
        assert_eq!(msg.message_type(), "APRS");
        assert!(msg.as_aircraft().is_some());
        assert!(msg.as_station().is_none());

        let msg = Message::Station(Box::new(StubStation));
        assert_eq!(msg.message_type(), "OGNSDR");
        assert_eq!(msg.as_station().unwrap().server(), "GLIDERN1");
    }

    #[test]
    fn test_range_checks() {
        assert!(valid_latitude(-90.0) && valid_latitude(90.0));
        assert!(!valid_latitude(90.5));
        assert!(valid_longitude(-180.0) && valid_longitude(180.0));
        assert!(!valid_longitude(-180.01));
        assert!(valid_heading(0) && valid_heading(360));
        assert!(!valid_heading(361));
    }
}
