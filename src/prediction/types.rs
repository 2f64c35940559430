//! Response types.

use crate::geo::GeoPoint;
use crate::reference::ReferenceImage;
use serde::Serialize;

/// Taxonomic classification of a predicted species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonInfo {
    /// Accepted scientific name.
    pub scientific_name: Option<String>,
    /// Taxonomic rank.
    pub rank: Option<String>,
}

/// One ranked species prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Classifier label.
    pub name: String,
    /// Classifier confidence in `[0, 1]`.
    pub probability: f32,
    /// Taxonomy, when the lookup succeeded.
    pub taxonomy: Option<TaxonInfo>,
    /// Common name in the configured language.
    pub vernacular_name: Option<String>,
    /// Sample photo of the species.
    pub reference_image: Option<ReferenceImage>,
}

/// Outcome of insect classification.
///
/// Serialized as `{"status": "empty"}` or
/// `{"status": "found", "predictions": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "predictions", rename_all = "lowercase")]
pub enum Detections {
    /// The detector found no insects.
    Empty,
    /// Ranked insect predictions.
    Found(Vec<Prediction>),
}

/// Full result for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    /// GPS position from EXIF, `null` when absent.
    pub location: Option<GeoPoint>,
    /// Ranked flower predictions.
    pub flower_predictions: Vec<Prediction>,
    /// Insect predictions, present only when insects were detected.
    pub insect_predictions: Detections,
    /// Number of detected insects.
    pub insect_count: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prediction(name: &str) -> Prediction {
        Prediction {
            name: name.to_string(),
            probability: 0.5,
            taxonomy: None,
            vernacular_name: None,
            reference_image: None,
        }
    }

    #[test]
    fn test_detections_serialization() {
        assert_eq!(
            serde_json::to_value(Detections::Empty).unwrap(),
            json!({"status": "empty"})
        );

        let found = serde_json::to_value(Detections::Found(vec![prediction("Apis mellifera")]))
            .unwrap();
        assert_eq!(found["status"], "found");
        assert_eq!(found["predictions"][0]["name"], "Apis mellifera");
        assert!(found["predictions"][0]["taxonomy"].is_null());
    }

    #[test]
    fn test_missing_location_serializes_as_null() {
        let response = PredictionResponse {
            location: None,
            flower_predictions: vec![],
            insect_predictions: Detections::Empty,
            insect_count: 0,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value["location"].is_null());
        assert_eq!(value["insect_count"], 0);
        assert_eq!(value["insect_predictions"], serde_json::json!({"status": "empty"}));
    }
}
