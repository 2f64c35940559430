//! JSON envelope types for CLI output.
//!
//! Machine-readable command output is wrapped in a versioned envelope so
//! scripts can rely on a stable shape.

use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

/// Current format version for JSON envelope.
pub const FORMAT_VERSION: &str = "1.0";

/// JSON envelope wrapping all CLI output events.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct JsonEnvelope<T> {
    /// API specification version.
    pub format_version: String,
    /// Event timestamp.
    pub timestamp: DateTime<Utc>,
    /// Event type.
    pub event: EventType,
    /// Event-specific payload.
    pub payload: T,
}

impl<T: Serialize> JsonEnvelope<T> {
    /// Create a new envelope with the current timestamp.
    pub fn new(event: EventType, payload: T) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            timestamp: Utc::now(),
            event,
            payload,
        }
    }

    /// Write the envelope as one line of JSON.
    pub fn write_line<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer(&mut writer, self).map_err(|e| Error::JsonWrite { source: e })?;
        writeln!(writer)?;
        Ok(())
    }
}

/// Event types for JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Final result.
    Result,
    /// Error occurred.
    Error,
}

/// Result type discriminator for result payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    /// Image geolocation.
    Geolocation,
}

/// Geolocation of one image file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatedFile {
    /// Image path as given on the command line.
    pub file: PathBuf,
    /// Position, `null` when the image carries no usable GPS data.
    pub location: Option<GeoPoint>,
    /// Read failure, if the file could not be opened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Payload of the `locate` result event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationPayload {
    /// Result discriminator.
    pub result_type: ResultType,
    /// One entry per input file, in input order.
    pub files: Vec<LocatedFile>,
}

impl GeolocationPayload {
    /// Wrap located files.
    #[must_use]
    pub const fn new(files: Vec<LocatedFile>) -> Self {
        Self {
            result_type: ResultType::Geolocation,
            files,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let payload = GeolocationPayload::new(vec![
            LocatedFile {
                file: PathBuf::from("paris.jpg"),
                location: Some(GeoPoint {
                    latitude: 48.85822,
                    longitude: 2.2945,
                }),
                error: None,
            },
            LocatedFile {
                file: PathBuf::from("plain.png"),
                location: None,
                error: None,
            },
        ]);

        let mut out = Vec::new();
        JsonEnvelope::new(EventType::Result, payload)
            .write_line(&mut out)
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["format_version"], FORMAT_VERSION);
        assert_eq!(value["event"], "result");
        assert_eq!(value["payload"]["result_type"], "geolocation");
        assert_eq!(value["payload"]["files"][0]["location"]["latitude"], 48.85822);
        assert!(value["payload"]["files"][1]["location"].is_null());
        assert!(value["payload"]["files"][1].get("error").is_none());
    }

    #[test]
    fn test_envelope_round_trips() {
        let envelope = JsonEnvelope::new(EventType::Error, GeolocationPayload::new(vec![]));
        let text = serde_json::to_string(&envelope).unwrap();
        let parsed: JsonEnvelope<GeolocationPayload> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.event, EventType::Error);
        assert!(parsed.payload.files.is_empty());
    }
}
