//! GPS geolocation from EXIF metadata.
//!
//! The pipeline is three small pure steps:
//!
//! 1. [`resolve_geotagging`] names the sub-tags of the EXIF `GPSInfo` block,
//! 2. [`dms_to_decimal`] turns a degrees/minutes/seconds triple into signed
//!    decimal degrees,
//! 3. [`extract_geolocation`] combines both into an optional coordinate pair.
//!
//! Missing or malformed GPS data is a normal outcome and yields `None`.

mod dms;
mod extract;
mod reader;
mod tags;

pub use dms::{Dms, dms_to_decimal, round_to_places};
pub use extract::{ExifSource, extract_geolocation};
pub use tags::{ExifDictionary, GPS_INFO_TAG, GeoTagging, GpsTag, TagValue, resolve_geotagging};

use serde::{Deserialize, Serialize};

/// A decimal-degree coordinate pair. Negative values are south/west.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}
