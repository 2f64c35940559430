//! EXIF dictionary model and GPS tag resolution.

use serde::Serialize;
use std::collections::BTreeMap;

/// Top-level EXIF tag id of the GPS information sub-directory (`GPSInfo`).
pub const GPS_INFO_TAG: u16 = 0x8825;

/// A raw EXIF tag value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    /// Single numeric value.
    Number(f64),
    /// Sequence of numeric values (rationals are stored as their quotient).
    Numbers(Vec<f64>),
    /// ASCII or otherwise textual value.
    Text(String),
    /// Nested directory of tag id to value, used for the GPS sub-block.
    Directory(BTreeMap<u16, TagValue>),
}

impl TagValue {
    /// Numeric components of this value, if it is numeric.
    pub fn as_numbers(&self) -> Option<Vec<f64>> {
        match self {
            Self::Number(n) => Some(vec![*n]),
            Self::Numbers(values) => Some(values.clone()),
            Self::Text(_) | Self::Directory(_) => None,
        }
    }

    /// Textual content of this value, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Raw EXIF dictionary of an image: top-level tag id to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifDictionary {
    entries: BTreeMap<u16, TagValue>,
}

impl ExifDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a top-level tag, replacing any existing value.
    pub fn insert(&mut self, tag: u16, value: TagValue) {
        self.entries.insert(tag, value);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, tag: u16, value: TagValue) -> Self {
        self.insert(tag, value);
        self
    }

    /// Look up a top-level tag.
    pub fn get(&self, tag: u16) -> Option<&TagValue> {
        self.entries.get(&tag)
    }

    /// Whether the dictionary holds no tags at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(u16, TagValue)> for ExifDictionary {
    fn from_iter<I: IntoIterator<Item = (u16, TagValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Standard EXIF GPS sub-tags (EXIF 2.32, tags 0x00 through 0x1F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum GpsTag {
    VersionId = 0x00,
    LatitudeRef = 0x01,
    Latitude = 0x02,
    LongitudeRef = 0x03,
    Longitude = 0x04,
    AltitudeRef = 0x05,
    Altitude = 0x06,
    TimeStamp = 0x07,
    Satellites = 0x08,
    Status = 0x09,
    MeasureMode = 0x0A,
    Dop = 0x0B,
    SpeedRef = 0x0C,
    Speed = 0x0D,
    TrackRef = 0x0E,
    Track = 0x0F,
    ImgDirectionRef = 0x10,
    ImgDirection = 0x11,
    MapDatum = 0x12,
    DestLatitudeRef = 0x13,
    DestLatitude = 0x14,
    DestLongitudeRef = 0x15,
    DestLongitude = 0x16,
    DestBearingRef = 0x17,
    DestBearing = 0x18,
    DestDistanceRef = 0x19,
    DestDistance = 0x1A,
    ProcessingMethod = 0x1B,
    AreaInformation = 0x1C,
    DateStamp = 0x1D,
    Differential = 0x1E,
    HPositioningError = 0x1F,
}

impl GpsTag {
    /// Every known GPS tag, in id order.
    pub const ALL: [Self; 32] = [
        Self::VersionId,
        Self::LatitudeRef,
        Self::Latitude,
        Self::LongitudeRef,
        Self::Longitude,
        Self::AltitudeRef,
        Self::Altitude,
        Self::TimeStamp,
        Self::Satellites,
        Self::Status,
        Self::MeasureMode,
        Self::Dop,
        Self::SpeedRef,
        Self::Speed,
        Self::TrackRef,
        Self::Track,
        Self::ImgDirectionRef,
        Self::ImgDirection,
        Self::MapDatum,
        Self::DestLatitudeRef,
        Self::DestLatitude,
        Self::DestLongitudeRef,
        Self::DestLongitude,
        Self::DestBearingRef,
        Self::DestBearing,
        Self::DestDistanceRef,
        Self::DestDistance,
        Self::ProcessingMethod,
        Self::AreaInformation,
        Self::DateStamp,
        Self::Differential,
        Self::HPositioningError,
    ];

    /// Numeric sub-tag id.
    pub const fn id(self) -> u16 {
        self as u16
    }

    /// Resolve a numeric sub-tag id. Unknown ids yield `None`.
    pub fn from_id(id: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|tag| tag.id() == id)
    }

    /// Canonical EXIF name of the tag.
    pub const fn name(self) -> &'static str {
        match self {
            Self::VersionId => "GPSVersionID",
            Self::LatitudeRef => "GPSLatitudeRef",
            Self::Latitude => "GPSLatitude",
            Self::LongitudeRef => "GPSLongitudeRef",
            Self::Longitude => "GPSLongitude",
            Self::AltitudeRef => "GPSAltitudeRef",
            Self::Altitude => "GPSAltitude",
            Self::TimeStamp => "GPSTimeStamp",
            Self::Satellites => "GPSSatellites",
            Self::Status => "GPSStatus",
            Self::MeasureMode => "GPSMeasureMode",
            Self::Dop => "GPSDOP",
            Self::SpeedRef => "GPSSpeedRef",
            Self::Speed => "GPSSpeed",
            Self::TrackRef => "GPSTrackRef",
            Self::Track => "GPSTrack",
            Self::ImgDirectionRef => "GPSImgDirectionRef",
            Self::ImgDirection => "GPSImgDirection",
            Self::MapDatum => "GPSMapDatum",
            Self::DestLatitudeRef => "GPSDestLatitudeRef",
            Self::DestLatitude => "GPSDestLatitude",
            Self::DestLongitudeRef => "GPSDestLongitudeRef",
            Self::DestLongitude => "GPSDestLongitude",
            Self::DestBearingRef => "GPSDestBearingRef",
            Self::DestBearing => "GPSDestBearing",
            Self::DestDistanceRef => "GPSDestDistanceRef",
            Self::DestDistance => "GPSDestDistance",
            Self::ProcessingMethod => "GPSProcessingMethod",
            Self::AreaInformation => "GPSAreaInformation",
            Self::DateStamp => "GPSDateStamp",
            Self::Differential => "GPSDifferential",
            Self::HPositioningError => "GPSHPositioningError",
        }
    }
}

impl std::fmt::Display for GpsTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// GPS sub-tags of an image, keyed by their standard name.
pub type GeoTagging = BTreeMap<GpsTag, TagValue>;

/// Translate the GPS sub-block of an EXIF dictionary into named GPS tags.
///
/// Absent or empty dictionaries, a missing `GPSInfo` entry, and a `GPSInfo`
/// entry that is not a directory all yield an empty mapping. Unknown
/// sub-tag ids are skipped.
pub fn resolve_geotagging(exif: Option<&ExifDictionary>) -> GeoTagging {
    let Some(exif) = exif.filter(|e| !e.is_empty()) else {
        return GeoTagging::new();
    };

    let Some(TagValue::Directory(gps)) = exif.get(GPS_INFO_TAG) else {
        return GeoTagging::new();
    };

    gps.iter()
        .filter_map(|(&id, value)| GpsTag::from_id(id).map(|tag| (tag, value.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gps_block(entries: &[(u16, TagValue)]) -> TagValue {
        TagValue::Directory(entries.iter().cloned().collect())
    }

    #[test]
    fn test_gps_tag_ids_round_trip() {
        for tag in GpsTag::ALL {
            assert_eq!(GpsTag::from_id(tag.id()), Some(tag));
        }
        assert_eq!(GpsTag::from_id(0x20), None);
        assert_eq!(GpsTag::from_id(0xFFFF), None);
    }

    #[test]
    fn test_gps_tag_names() {
        assert_eq!(GpsTag::Latitude.name(), "GPSLatitude");
        assert_eq!(GpsTag::LongitudeRef.to_string(), "GPSLongitudeRef");
        assert_eq!(GpsTag::Dop.name(), "GPSDOP");
    }

    #[test]
    fn test_resolve_absent_dictionary() {
        assert!(resolve_geotagging(None).is_empty());
        assert!(resolve_geotagging(Some(&ExifDictionary::new())).is_empty());
    }

    #[test]
    fn test_resolve_without_gps_info() {
        // Make and Model only
        let exif = ExifDictionary::new()
            .with(0x010F, TagValue::Text("Canon".into()))
            .with(0x0110, TagValue::Text("EOS 80D".into()));
        assert!(resolve_geotagging(Some(&exif)).is_empty());
    }

    #[test]
    fn test_resolve_malformed_gps_info() {
        let exif = ExifDictionary::new().with(GPS_INFO_TAG, TagValue::Number(1234.0));
        assert!(resolve_geotagging(Some(&exif)).is_empty());
    }

    #[test]
    fn test_resolve_names_known_tags_and_drops_unknown() {
        let exif = ExifDictionary::new().with(
            GPS_INFO_TAG,
            gps_block(&[
                (0x01, TagValue::Text("N".into())),
                (0x02, TagValue::Numbers(vec![48.0, 51.0, 29.6])),
                (0x06, TagValue::Number(35.0)),
                (0x7F, TagValue::Text("vendor".into())),
            ]),
        );

        let tagging = resolve_geotagging(Some(&exif));
        assert_eq!(tagging.len(), 3);
        assert_eq!(
            tagging.get(&GpsTag::LatitudeRef),
            Some(&TagValue::Text("N".into()))
        );
        assert_eq!(
            tagging.get(&GpsTag::Latitude),
            Some(&TagValue::Numbers(vec![48.0, 51.0, 29.6]))
        );
        assert!(tagging.contains_key(&GpsTag::Altitude));
    }

    #[test]
    fn test_tag_value_accessors() {
        assert_eq!(TagValue::Number(2.0).as_numbers(), Some(vec![2.0]));
        assert_eq!(TagValue::Text("W".into()).as_text(), Some("W"));
        assert!(TagValue::Text("W".into()).as_numbers().is_none());
        assert!(TagValue::Numbers(vec![1.0]).as_text().is_none());
    }
}
