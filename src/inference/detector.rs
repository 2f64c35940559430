//! YOLO-style ONNX specimen detector.

use super::classifier::preprocess;
use super::session::{first_input_name, first_output, load_session};
use super::{BoundingBox, DetectedObject, DetectionThresholds, SpecimenDetector};
use crate::config::{DetectorModelConfig, InferenceDevice, TensorLayout};
use crate::error::{Error, Result};
use ort::session::Session;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// Object detector producing `[1, 4 + classes, anchors]` predictions.
pub struct OnnxDetector {
    session: Mutex<Session>,
    input_name: String,
    input_size: u32,
}

impl std::fmt::Debug for OnnxDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxDetector")
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .finish_non_exhaustive()
    }
}

impl OnnxDetector {
    /// Load the detector from its model configuration.
    pub fn from_config(config: &DetectorModelConfig, device: InferenceDevice) -> Result<Self> {
        let session = load_session(&config.path, device)?;
        let input_name = first_input_name(&session, "images");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            input_size: config.input_size,
        })
    }
}

impl SpecimenDetector for OnnxDetector {
    fn detect(&self, path: &Path, thresholds: DetectionThresholds) -> Result<Vec<DetectedObject>> {
        let image = image::open(path).map_err(|e| Error::ImageDecode { source: e })?;
        let input = preprocess(&image, self.input_size, TensorLayout::Nchw);
        let input_ref =
            ort::value::TensorRef::from_array_view(&input).map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;

        let mut session = self.session.lock().map_err(|_| Error::Internal {
            message: "detector session lock poisoned".to_string(),
        })?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_ref])
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;

        let (shape, data) = first_output(&outputs)?;
        let candidates = decode_predictions(&shape, &data, thresholds.confidence_fraction())?;
        let kept = non_max_suppression(candidates, thresholds.overlap_fraction());

        debug!("Detector kept {} objects in {}", kept.len(), path.display());
        Ok(kept)
    }
}

/// Decode raw detector output into candidate boxes above `min_confidence`.
///
/// Accepts `[1, 4 + classes, anchors]` and the transposed
/// `[1, anchors, 4 + classes]` layout.
pub(crate) fn decode_predictions(
    shape: &[i64],
    data: &[f32],
    min_confidence: f32,
) -> Result<Vec<DetectedObject>> {
    let [_, a, b] = shape else {
        return Err(Error::Inference {
            reason: format!("expected 3D detector output, got shape {shape:?}"),
        });
    };
    let (a, b) = (
        usize::try_from(*a).unwrap_or(0),
        usize::try_from(*b).unwrap_or(0),
    );

    // Fewer attributes than anchors in practice; the smaller axis is attributes.
    let (attributes, anchors, transposed) = if a <= b { (a, b, false) } else { (b, a, true) };
    if attributes < 5 || data.len() < attributes * anchors {
        return Err(Error::Inference {
            reason: format!("detector output shape {shape:?} has no class scores"),
        });
    }

    let at = |attribute: usize, anchor: usize| {
        if transposed {
            data[anchor * attributes + attribute]
        } else {
            data[attribute * anchors + anchor]
        }
    };

    let mut detections = Vec::new();
    for anchor in 0..anchors {
        let best = (4..attributes)
            .map(|attribute| (attribute - 4, at(attribute, anchor)))
            .max_by(|x, y| x.1.total_cmp(&y.1));

        if let Some((class_id, confidence)) = best
            && confidence >= min_confidence
        {
            detections.push(DetectedObject {
                class_id,
                confidence,
                bbox: BoundingBox::from_center(
                    at(0, anchor),
                    at(1, anchor),
                    at(2, anchor),
                    at(3, anchor),
                ),
            });
        }
    }

    Ok(detections)
}

/// Intersection over union of two boxes.
#[must_use]
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let intersection = BoundingBox {
        x1: a.x1.max(b.x1),
        y1: a.y1.max(b.y1),
        x2: a.x2.min(b.x2),
        y2: a.y2.min(b.y2),
    }
    .area();

    let union = a.area() + b.area() - intersection;
    if union <= 0.0 { 0.0 } else { intersection / union }
}

/// Greedy class-aware non-maximum suppression.
///
/// Keeps the most confident box and drops same-class boxes whose IoU with it
/// exceeds `max_overlap`, repeating until no candidates remain.
#[must_use]
pub fn non_max_suppression(
    mut candidates: Vec<DetectedObject>,
    max_overlap: f32,
) -> Vec<DetectedObject> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<DetectedObject> = Vec::new();
    for candidate in candidates {
        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && iou(&k.bbox, &candidate.bbox) > max_overlap
        });
        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}
