//! Machine-readable command output.

pub mod json_envelope;

pub use json_envelope::{EventType, GeolocationPayload, JsonEnvelope, LocatedFile};
