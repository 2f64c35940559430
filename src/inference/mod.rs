//! Species classification and specimen detection.
//!
//! The prediction pipeline talks to models through the [`SpeciesClassifier`]
//! and [`SpecimenDetector`] traits. The ONNX implementations load once at
//! startup and are shared behind `Arc`s.

mod classifier;
mod detector;
mod labels;
mod session;

pub use classifier::OnnxClassifier;
pub use detector::{OnnxDetector, iou, non_max_suppression};
pub use labels::LabelSet;

use crate::constants::detection;
use crate::error::Result;
use image::DynamicImage;
use serde::Serialize;
use std::path::Path;

/// A label with its classifier confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLabel {
    /// Class label (usually a scientific name).
    pub label: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
}

/// Axis-aligned box in input-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

impl BoundingBox {
    /// Build a box from a center point and size.
    #[must_use]
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            x1: cx - width / 2.0,
            y1: cy - height / 2.0,
            x2: cx + width / 2.0,
            y2: cy + height / 2.0,
        }
    }

    /// Area in square pixels; degenerate boxes have zero area.
    #[must_use]
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }
}

/// One object found by the detector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedObject {
    /// Index of the detected class.
    pub class_id: usize,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f32,
    /// Box in detector input pixels.
    pub bbox: BoundingBox,
}

/// Detector thresholds in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionThresholds {
    /// Minimum confidence to keep a box.
    pub confidence: u8,
    /// Overlap above which the weaker of two boxes is suppressed.
    pub overlap: u8,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            confidence: detection::DEFAULT_CONFIDENCE,
            overlap: detection::DEFAULT_OVERLAP,
        }
    }
}

impl DetectionThresholds {
    /// Confidence threshold as a fraction.
    #[must_use]
    pub fn confidence_fraction(&self) -> f32 {
        f32::from(self.confidence) / 100.0
    }

    /// Overlap threshold as a fraction.
    #[must_use]
    pub fn overlap_fraction(&self) -> f32 {
        f32::from(self.overlap) / 100.0
    }
}

/// Ranks species for an image.
pub trait SpeciesClassifier: Send + Sync {
    /// Return the top-ranked labels, best first.
    fn classify(&self, image: &DynamicImage) -> Result<Vec<RankedLabel>>;
}

/// Finds specimens (insects) in an image file.
pub trait SpecimenDetector: Send + Sync {
    /// Detect objects in the image at `path`.
    fn detect(&self, path: &Path, thresholds: DetectionThresholds) -> Result<Vec<DetectedObject>>;
}
