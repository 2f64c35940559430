//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "bugbloom";

/// File name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_FILE_ENV: &str = "BUGBLOOM_CONFIG";

/// Decimal places kept for decimal-degree coordinates (about 1.1 m at the equator).
pub const COORDINATE_DECIMAL_PLACES: i32 = 5;

/// Default number of top predictions returned per classifier.
pub const DEFAULT_TOP_K: usize = 5;

/// Default square input resolution of the species classifiers.
pub const DEFAULT_CLASSIFIER_INPUT_SIZE: u32 = 224;

/// Default square input resolution of the specimen detector.
pub const DEFAULT_DETECTOR_INPUT_SIZE: u32 = 640;

/// Detector thresholds, in percent.
pub mod detection {
    /// Default minimum detection confidence.
    pub const DEFAULT_CONFIDENCE: u8 = 45;
    /// Default overlap (`IoU`) above which boxes are suppressed.
    pub const DEFAULT_OVERLAP: u8 = 40;
    /// Upper bound for both thresholds.
    pub const MAX_PERCENT: u8 = 100;
}

/// HTTP server defaults.
pub mod server {
    /// Default listen host.
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    /// Default listen port.
    pub const DEFAULT_PORT: u16 = 8000;
    /// Default API key expected in [`API_KEY_HEADER`].
    pub const DEFAULT_API_KEY: &str = "12345678910";
    /// Header carrying the API key.
    pub const API_KEY_HEADER: &str = "x-api-key";
    /// Default maximum request body (and fetched image) size.
    pub const DEFAULT_BODY_LIMIT_BYTES: usize = 20 * 1024 * 1024;
    /// Multipart field holding the uploaded image.
    pub const UPLOAD_FIELD: &str = "file";
    /// Route prefix under which reference photos are served.
    pub const IMAGES_ROUTE_PREFIX: &str = "/images";
}

/// GBIF taxonomy lookup defaults.
pub mod taxonomy {
    /// GBIF API root.
    pub const DEFAULT_BASE_URL: &str = "https://api.gbif.org/v1";
    /// ISO 639-2 code of the vernacular names to return.
    pub const DEFAULT_LANGUAGE: &str = "deu";
    /// Default per-request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
    /// Connect timeout in seconds.
    pub const CONNECT_TIMEOUT_SECS: u64 = 5;
}

/// Timeout for fetching images referenced by URL, in seconds.
pub const IMAGE_FETCH_TIMEOUT_SECS: u64 = 30;
