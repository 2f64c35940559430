//! Geolocation extraction from an image's EXIF data.

use super::GeoPoint;
use super::dms::{Dms, dms_to_decimal};
use super::tags::{ExifDictionary, GeoTagging, GpsTag, TagValue, resolve_geotagging};
use tracing::debug;

/// Anything that can expose a raw EXIF dictionary.
///
/// Sources without EXIF support return `None`, which is treated the same as
/// an empty dictionary.
pub trait ExifSource {
    /// The raw EXIF dictionary, if any.
    fn raw_exif(&self) -> Option<ExifDictionary>;
}

impl ExifSource for ExifDictionary {
    fn raw_exif(&self) -> Option<ExifDictionary> {
        Some(self.clone())
    }
}

impl ExifSource for Option<ExifDictionary> {
    fn raw_exif(&self) -> Option<ExifDictionary> {
        self.clone()
    }
}

/// Extract the decimal latitude and longitude of an image.
///
/// Returns `None` when the image has no EXIF block, no GPS block, only one
/// of the two coordinates, or coordinates that do not form a valid DMS
/// triple. Missing hemisphere references are treated as N/E.
pub fn extract_geolocation<S: ExifSource + ?Sized>(image: &S) -> Option<GeoPoint> {
    let exif = image.raw_exif();
    let tagging = resolve_geotagging(exif.as_ref());

    let (Some(latitude), Some(longitude)) = (
        tagging.get(&GpsTag::Latitude),
        tagging.get(&GpsTag::Longitude),
    ) else {
        return None;
    };

    let latitude = coordinate(latitude, reference(&tagging, GpsTag::LatitudeRef))?;
    let longitude = coordinate(longitude, reference(&tagging, GpsTag::LongitudeRef))?;

    Some(GeoPoint {
        latitude,
        longitude,
    })
}

fn reference(tagging: &GeoTagging, tag: GpsTag) -> &str {
    tagging
        .get(&tag)
        .and_then(TagValue::as_text)
        .unwrap_or_default()
}

fn coordinate(value: &TagValue, reference: &str) -> Option<f64> {
    match Dms::try_from(value) {
        Ok(dms) => Some(dms_to_decimal(dms, reference)),
        Err(e) => {
            debug!("Ignoring unusable GPS coordinate: {e}");
            None
        }
    }
}
