//! Configuration type definitions.

use crate::constants::{
    DEFAULT_CLASSIFIER_INPUT_SIZE, DEFAULT_DETECTOR_INPUT_SIZE, DEFAULT_TOP_K, detection, server,
    taxonomy,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Model files.
    pub models: ModelsConfig,

    /// Inference settings.
    pub inference: InferenceConfig,

    /// Taxonomy enrichment settings.
    pub taxonomy: TaxonomyConfig,

    /// Reference photo settings.
    pub reference_images: ReferenceImagesConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen host.
    pub host: String,

    /// Listen port.
    pub port: u16,

    /// API key required in the `x-api-key` header.
    pub api_key: String,

    /// Maximum request body and fetched image size in bytes.
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: server::DEFAULT_HOST.to_string(),
            port: server::DEFAULT_PORT,
            api_key: server::DEFAULT_API_KEY.to_string(),
            body_limit_bytes: server::DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

/// The three models the service needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Flower/plant classifier.
    pub flower: Option<ClassifierModelConfig>,

    /// Insect classifier.
    pub insect: Option<ClassifierModelConfig>,

    /// Insect presence detector.
    pub detector: Option<DetectorModelConfig>,
}

/// Configuration for a species classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierModelConfig {
    /// Path to the ONNX model file.
    pub path: PathBuf,

    /// Path to the labels file (one label per line, in class index order).
    pub labels: PathBuf,

    /// Square input resolution in pixels.
    #[serde(default = "default_classifier_input_size")]
    pub input_size: u32,

    /// Input tensor layout.
    #[serde(default)]
    pub layout: TensorLayout,
}

/// Configuration for the specimen detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorModelConfig {
    /// Path to the ONNX model file.
    pub path: PathBuf,

    /// Square input resolution in pixels.
    #[serde(default = "default_detector_input_size")]
    pub input_size: u32,

    /// Minimum detection confidence in percent.
    #[serde(default = "default_detection_confidence")]
    pub confidence: u8,

    /// Overlap threshold for non-maximum suppression in percent.
    #[serde(default = "default_detection_overlap")]
    pub overlap: u8,
}

const fn default_classifier_input_size() -> u32 {
    DEFAULT_CLASSIFIER_INPUT_SIZE
}

const fn default_detector_input_size() -> u32 {
    DEFAULT_DETECTOR_INPUT_SIZE
}

const fn default_detection_confidence() -> u8 {
    detection::DEFAULT_CONFIDENCE
}

const fn default_detection_overlap() -> u8 {
    detection::DEFAULT_OVERLAP
}

/// Memory layout of an image input tensor.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[batch, height, width, channels]`, as exported from Keras.
    #[default]
    Nhwc,
    /// `[batch, channels, height, width]`, as exported from `PyTorch`.
    Nchw,
}

/// Inference device configuration.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum InferenceDevice {
    /// Use CUDA if available, else CPU.
    #[default]
    Auto,
    /// Force CPU inference.
    Cpu,
    /// Require CUDA.
    Cuda,
}

impl std::fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda => write!(f, "cuda"),
        }
    }
}

/// Inference settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Device to use for inference.
    pub device: InferenceDevice,

    /// Number of ranked predictions per classifier.
    pub top_k: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            device: InferenceDevice::Auto,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Taxonomy enrichment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Whether to query GBIF at all.
    pub enabled: bool,

    /// GBIF API root URL.
    pub base_url: String,

    /// ISO 639-2 language code of vernacular names.
    pub language: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: taxonomy::DEFAULT_BASE_URL.to_string(),
            language: taxonomy::DEFAULT_LANGUAGE.to_string(),
            timeout_secs: taxonomy::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Reference photo settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceImagesConfig {
    /// Root folder of plant photos, one sub-folder per label.
    pub plant_dir: Option<PathBuf>,

    /// Root folder of insect photos, one sub-folder per label.
    pub insect_dir: Option<PathBuf>,

    /// How reference photos are attached to predictions.
    pub mode: ReferenceImageMode,
}

/// How a reference photo is attached to a prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceImageMode {
    /// Link to the `/images/{label}/{file}` route.
    #[default]
    Url,
    /// Inline the photo as base64.
    Base64,
}
