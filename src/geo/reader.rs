//! Reading EXIF dictionaries from encoded image bytes.

use super::tags::{ExifDictionary, GPS_INFO_TAG, TagValue};
use exif::{Context, Field, In, Value};
use std::collections::BTreeMap;
use std::io::Cursor;
use tracing::debug;

impl ExifDictionary {
    /// Read the primary-image EXIF fields of an encoded image.
    ///
    /// Supports the containers `kamadak-exif` understands (JPEG, TIFF, PNG,
    /// WebP, HEIF). GPS fields are grouped in a directory under
    /// [`GPS_INFO_TAG`]. Returns `None` when the bytes carry no readable EXIF.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            Err(e) => {
                debug!("No readable EXIF data: {e}");
                return None;
            }
        };

        Some(Self::from_fields(exif.fields()))
    }

    /// Build a dictionary from decoded EXIF fields.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a Field>) -> Self {
        let mut dictionary = Self::new();
        let mut gps = BTreeMap::new();
        let mut has_gps_pointer = false;

        for field in fields.into_iter().filter(|f| f.ifd_num == In::PRIMARY) {
            let number = field.tag.number();

            if field.tag == exif::Tag::GPSInfoIFDPointer {
                has_gps_pointer = true;
                continue;
            }

            let Some(value) = convert_value(&field.value) else {
                continue;
            };

            if field.tag.context() == Context::Gps {
                gps.insert(number, value);
            } else {
                dictionary.insert(number, value);
            }
        }

        if has_gps_pointer || !gps.is_empty() {
            dictionary.insert(GPS_INFO_TAG, TagValue::Directory(gps));
        }

        dictionary
    }
}

fn convert_value(value: &Value) -> Option<TagValue> {
    let numbers: Vec<f64> = match value {
        Value::Byte(v) => v.iter().map(|&n| f64::from(n)).collect(),
        Value::Short(v) => v.iter().map(|&n| f64::from(n)).collect(),
        Value::Long(v) => v.iter().map(|&n| f64::from(n)).collect(),
        Value::SByte(v) => v.iter().map(|&n| f64::from(n)).collect(),
        Value::SShort(v) => v.iter().map(|&n| f64::from(n)).collect(),
        Value::SLong(v) => v.iter().map(|&n| f64::from(n)).collect(),
        Value::Rational(v) => v.iter().map(exif::Rational::to_f64).collect(),
        Value::SRational(v) => v.iter().map(exif::SRational::to_f64).collect(),
        Value::Float(v) => v.iter().map(|&n| f64::from(n)).collect(),
        Value::Double(v) => v.clone(),
        Value::Ascii(lines) => {
            let text = lines
                .first()
                .map(|line| String::from_utf8_lossy(line).trim_end_matches('\0').to_string())
                .unwrap_or_default();
            return Some(TagValue::Text(text));
        }
        Value::Undefined(bytes, _) => {
            return Some(TagValue::Text(
                String::from_utf8_lossy(bytes).trim_end_matches('\0').to_string(),
            ));
        }
        _ => return None,
    };

    match numbers.as_slice() {
        [single] => Some(TagValue::Number(*single)),
        _ => Some(TagValue::Numbers(numbers)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use exif::{Rational, Tag};

    fn field(tag: Tag, value: Value) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value,
        }
    }

    #[test]
    fn test_from_bytes_without_exif() {
        assert!(ExifDictionary::from_bytes(b"not an image").is_none());
        assert!(ExifDictionary::from_bytes(&[]).is_none());
    }

    #[test]
    fn test_gps_fields_are_nested() {
        let fields = [
            field(Tag::Make, Value::Ascii(vec![b"Nikon".to_vec()])),
            field(Tag::GPSLatitudeRef, Value::Ascii(vec![b"N".to_vec()])),
            field(
                Tag::GPSLatitude,
                Value::Rational(vec![
                    Rational::from((48, 1)),
                    Rational::from((51, 1)),
                    Rational::from((296, 10)),
                ]),
            ),
        ];

        let dictionary = ExifDictionary::from_fields(&fields);
        assert_eq!(
            dictionary.get(Tag::Make.number()),
            Some(&TagValue::Text("Nikon".into()))
        );

        let Some(TagValue::Directory(gps)) = dictionary.get(GPS_INFO_TAG) else {
            panic!("GPS directory missing");
        };
        assert_eq!(gps.get(&1), Some(&TagValue::Text("N".into())));
        assert_eq!(gps.get(&2), Some(&TagValue::Numbers(vec![48.0, 51.0, 29.6])));
    }

    #[test]
    fn test_no_gps_fields_means_no_gps_directory() {
        let fields = [field(Tag::Model, Value::Ascii(vec![b"X100V".to_vec()]))];
        let dictionary = ExifDictionary::from_fields(&fields);
        assert!(dictionary.get(GPS_INFO_TAG).is_none());
    }

    #[test]
    fn test_single_values_are_scalars() {
        assert_eq!(
            convert_value(&Value::Short(vec![6])),
            Some(TagValue::Number(6.0))
        );
        assert_eq!(
            convert_value(&Value::Byte(vec![2, 3, 0, 0])),
            Some(TagValue::Numbers(vec![2.0, 3.0, 0.0, 0.0]))
        );
    }
}
