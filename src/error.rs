//! Error types for bugbloom.

/// Result type alias for bugbloom operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for bugbloom.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// A required model is not configured.
    #[error("model '{name}' not found in configuration")]
    ModelNotFound {
        /// Role of the missing model (flower, insect, detector).
        name: String,
    },

    /// Model file does not exist.
    #[error("model file does not exist: {path}")]
    ModelFileNotFound {
        /// Path to the missing model file.
        path: std::path::PathBuf,
    },

    /// Labels file does not exist.
    #[error("labels file does not exist: {path}")]
    LabelsFileNotFound {
        /// Path to the missing labels file.
        path: std::path::PathBuf,
    },

    /// Failed to read labels file.
    #[error("failed to read labels file '{path}'")]
    LabelsRead {
        /// Path to the labels file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Labels file content is unusable.
    #[error("invalid labels file '{path}': {reason}")]
    LabelsInvalid {
        /// Path to the labels file.
        path: std::path::PathBuf,
        /// What is wrong with the file.
        reason: String,
    },

    /// Labels file and model disagree on the number of classes.
    #[error("labels file '{path}' lists {labels} labels but the model outputs {classes} classes")]
    LabelsMismatch {
        /// Path to the labels file.
        path: std::path::PathBuf,
        /// Number of labels in the file.
        labels: usize,
        /// Number of scores the model produced.
        classes: usize,
    },

    /// Failed to load an ONNX model.
    #[error("failed to load model '{path}': {reason}")]
    ModelLoad {
        /// Path to the model file.
        path: std::path::PathBuf,
        /// Description of the load failure.
        reason: String,
    },

    /// Inference failed.
    #[error("inference failed: {reason}")]
    Inference {
        /// Description of the inference failure.
        reason: String,
    },

    /// A GPS coordinate is not a valid degrees/minutes/seconds triple.
    #[error("invalid DMS coordinate: {reason}")]
    InvalidDms {
        /// Why the value was rejected.
        reason: String,
    },

    /// Uploaded bytes could not be decoded as an image.
    #[error("failed to decode image")]
    ImageDecode {
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to encode an image for the detector.
    #[error("failed to encode image")]
    ImageEncode {
        /// Underlying encoder error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to fetch an image from a URL.
    #[error("failed to fetch image from '{url}'")]
    ImageFetch {
        /// URL that failed.
        url: String,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Fetched image exceeds the configured size limit.
    #[error("image at '{url}' exceeds {limit} bytes")]
    ImageTooLarge {
        /// URL of the image.
        url: String,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Some image files given on the command line could not be read.
    #[error("failed to read {count} image file(s)")]
    ImageRead {
        /// Number of unreadable files.
        count: usize,
    },

    /// Failed to bind the HTTP listener.
    #[error("failed to bind {address}")]
    ServerBind {
        /// Listen address.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write JSON output.
    #[error("failed to write JSON output")]
    JsonWrite {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}
