//! Degrees/minutes/seconds to decimal degree conversion.

use super::tags::TagValue;
use crate::constants::COORDINATE_DECIMAL_PLACES;
use crate::error::{Error, Result};

/// An angle in degrees, minutes and seconds. All components are non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    /// Whole or fractional degrees.
    pub degrees: f64,
    /// Minutes of arc.
    pub minutes: f64,
    /// Seconds of arc.
    pub seconds: f64,
}

impl Dms {
    /// Create a DMS triple.
    pub const fn new(degrees: f64, minutes: f64, seconds: f64) -> Self {
        Self {
            degrees,
            minutes,
            seconds,
        }
    }
}

impl TryFrom<&TagValue> for Dms {
    type Error = Error;

    /// Read a DMS triple from an EXIF value.
    ///
    /// Extra trailing components are ignored. Text, directories, fewer than
    /// three components, and negative or non-finite components are rejected.
    fn try_from(value: &TagValue) -> Result<Self> {
        let numbers = value.as_numbers().ok_or_else(|| Error::InvalidDms {
            reason: "value is not numeric".to_string(),
        })?;

        let [degrees, minutes, seconds] = match numbers.as_slice() {
            [d, m, s, ..] => [*d, *m, *s],
            other => {
                return Err(Error::InvalidDms {
                    reason: format!("expected 3 components, got {}", other.len()),
                });
            }
        };

        if let Some(bad) = [degrees, minutes, seconds]
            .into_iter()
            .find(|c| !c.is_finite() || *c < 0.0)
        {
            return Err(Error::InvalidDms {
                reason: format!("component {bad} is not a non-negative number"),
            });
        }

        Ok(Self::new(degrees, minutes, seconds))
    }
}

/// Convert a DMS angle and hemisphere reference to signed decimal degrees.
///
/// Exactly `S` or `W` negates the result (trailing NUL terminators are
/// dropped). Any other reference, including an empty or padded one, leaves
/// it positive. The result is rounded half away from zero to
/// [`COORDINATE_DECIMAL_PLACES`] places; negation happens before rounding.
pub fn dms_to_decimal(dms: Dms, reference: &str) -> f64 {
    let magnitude = dms.degrees + dms.minutes / 60.0 + dms.seconds / 3600.0;

    let signed = match reference.trim_end_matches('\0') {
        "S" | "W" => -magnitude,
        _ => magnitude,
    };

    round_to_places(signed, COORDINATE_DECIMAL_PLACES)
}

/// Round half away from zero to a fixed number of decimal places.
pub fn round_to_places(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_half_degree() {
        assert_eq!(dms_to_decimal(Dms::new(51.0, 30.0, 0.0), "N"), 51.5);
        assert_eq!(dms_to_decimal(Dms::new(51.0, 30.0, 0.0), "S"), -51.5);
    }

    #[test]
    fn test_seconds_contribute() {
        assert_eq!(dms_to_decimal(Dms::new(51.0, 30.0, 36.0), "N"), 51.51);
    }

    #[test]
    fn test_longitude_hemispheres() {
        assert_eq!(dms_to_decimal(Dms::new(0.0, 30.0, 0.0), "W"), -0.5);
        assert_eq!(dms_to_decimal(Dms::new(0.0, 30.0, 0.0), "E"), 0.5);
    }

    #[test]
    fn test_unknown_reference_stays_positive() {
        assert_eq!(dms_to_decimal(Dms::new(10.0, 0.0, 0.0), "X"), 10.0);
        assert_eq!(dms_to_decimal(Dms::new(10.0, 0.0, 0.0), ""), 10.0);
        assert_eq!(dms_to_decimal(Dms::new(10.0, 0.0, 0.0), "s"), 10.0);
    }

    #[test]
    fn test_nul_terminated_reference() {
        assert_eq!(dms_to_decimal(Dms::new(10.0, 0.0, 0.0), "S\0"), -10.0);
        assert_eq!(dms_to_decimal(Dms::new(10.0, 0.0, 0.0), "W\0\0"), -10.0);
    }

    #[test]
    fn test_whitespace_padded_reference_stays_positive() {
        assert_eq!(dms_to_decimal(Dms::new(10.0, 0.0, 0.0), " W "), 10.0);
        assert_eq!(dms_to_decimal(Dms::new(10.0, 0.0, 0.0), "\tS"), 10.0);
        assert_eq!(dms_to_decimal(Dms::new(10.0, 0.0, 0.0), "S "), 10.0);
    }

    #[test]
    fn test_rounds_to_five_places() {
        // 48 + 51/60 + 29.6/3600 = 48.858222...
        let value = dms_to_decimal(Dms::new(48.0, 51.0, 29.6), "N");
        assert_eq!(value, 48.85822);
    }

    #[test]
    fn test_southern_is_exact_negation() {
        let north = dms_to_decimal(Dms::new(33.0, 52.0, 7.68), "N");
        let south = dms_to_decimal(Dms::new(33.0, 52.0, 7.68), "S");
        assert_eq!(north, -south);
    }

    #[test]
    fn test_round_to_places() {
        assert_eq!(round_to_places(1.234_567, 5), 1.234_57);
        assert_eq!(round_to_places(-1.234_567, 5), -1.234_57);
        assert_eq!(round_to_places(2.0, 5), 2.0);
    }

    #[test]
    fn test_dms_from_tag_value() {
        let dms = Dms::try_from(&TagValue::Numbers(vec![48.0, 51.0, 29.6])).unwrap();
        assert_eq!(dms, Dms::new(48.0, 51.0, 29.6));
    }

    #[test]
    fn test_dms_from_invalid_tag_values() {
        assert!(Dms::try_from(&TagValue::Text("48 51 29.6".into())).is_err());
        assert!(Dms::try_from(&TagValue::Numbers(vec![48.0, 51.0])).is_err());
        assert!(Dms::try_from(&TagValue::Number(48.0)).is_err());
        assert!(Dms::try_from(&TagValue::Numbers(vec![48.0, -1.0, 0.0])).is_err());
        assert!(Dms::try_from(&TagValue::Numbers(vec![f64::NAN, 0.0, 0.0])).is_err());
    }
}
