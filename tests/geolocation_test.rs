//! Geolocation from real EXIF containers.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

mod common;

use bugbloom::geo::{
    ExifDictionary, GPS_INFO_TAG, GeoPoint, GpsTag, TagValue, extract_geolocation,
    resolve_geotagging,
};
use common::{PARIS, SYDNEY, jpeg_with_gps, plain_png, png_with_gps, tiff_with_gps};
use std::collections::BTreeMap;

#[test]
fn test_tiff_gps_block_is_read() {
    let exif = ExifDictionary::from_bytes(&tiff_with_gps(&PARIS)).unwrap();
    let tagging = resolve_geotagging(Some(&exif));

    assert_eq!(tagging.len(), 4);
    assert_eq!(
        tagging.get(&GpsTag::LatitudeRef),
        Some(&TagValue::Text("N".into()))
    );
    assert_eq!(
        tagging.get(&GpsTag::Latitude),
        Some(&TagValue::Numbers(vec![48.0, 51.0, 29.6]))
    );
}

#[test]
fn test_paris_from_tiff() {
    let exif = ExifDictionary::from_bytes(&tiff_with_gps(&PARIS));
    assert_eq!(
        extract_geolocation(&exif),
        Some(GeoPoint {
            latitude: 48.85822,
            longitude: 2.2945,
        })
    );
}

#[test]
fn test_southern_hemisphere_from_png() {
    let exif = ExifDictionary::from_bytes(&png_with_gps(&SYDNEY));
    assert_eq!(
        extract_geolocation(&exif),
        Some(GeoPoint {
            latitude: -33.85667,
            longitude: 151.215,
        })
    );
}

#[test]
fn test_jpeg_app1_segment_is_read() {
    let exif = ExifDictionary::from_bytes(&jpeg_with_gps(&SYDNEY));
    assert_eq!(
        extract_geolocation(&exif),
        Some(GeoPoint {
            latitude: -33.85667,
            longitude: 151.215,
        })
    );

    let exif = ExifDictionary::from_bytes(&jpeg_with_gps(&PARIS));
    assert_eq!(
        extract_geolocation(&exif),
        Some(GeoPoint {
            latitude: 48.85822,
            longitude: 2.2945,
        })
    );
}

#[test]
fn test_image_without_exif_has_no_location() {
    let exif = ExifDictionary::from_bytes(&plain_png());
    assert!(exif.is_none());
    assert!(extract_geolocation(&exif).is_none());
}

#[test]
fn test_gps_block_without_coordinates() {
    let mut gps = BTreeMap::new();
    gps.insert(0x00, TagValue::Numbers(vec![2.0, 3.0, 0.0, 0.0]));
    gps.insert(0x12, TagValue::Text("WGS-84".into()));
    let exif = ExifDictionary::new().with(GPS_INFO_TAG, TagValue::Directory(gps));

    assert_eq!(resolve_geotagging(Some(&exif)).len(), 2);
    assert!(extract_geolocation(&exif).is_none());
}

#[test]
fn test_extraction_is_repeatable() {
    let exif = ExifDictionary::from_bytes(&png_with_gps(&PARIS));
    let first = extract_geolocation(&exif);
    assert!(first.is_some());
    assert_eq!(first, extract_geolocation(&exif));
}
