//! Prediction orchestration: geolocation, detection, classification and
//! enrichment combined into one response.

mod orchestrator;
mod types;

pub use orchestrator::{Predictor, UploadedImage};
pub use types::{Detections, Prediction, PredictionResponse, TaxonInfo};
