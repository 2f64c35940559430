//! Shared handler state.

use crate::constants::IMAGE_FETCH_TIMEOUT_SECS;
use crate::error::{Error, Result};
use crate::prediction::Predictor;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

/// State shared by all handlers. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Prediction pipeline.
    pub predictor: Arc<Predictor>,
    /// SHA-256 of the expected `x-api-key` value.
    pub api_key_digest: [u8; 32],
    /// Client for `image_url` downloads.
    pub http: reqwest::Client,
    /// Maximum upload and download size in bytes.
    pub body_limit: usize,
}

impl AppState {
    /// Build state around a predictor.
    pub fn new(predictor: Predictor, api_key: &str, body_limit: usize) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(IMAGE_FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Internal {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            predictor: Arc::new(predictor),
            api_key_digest: api_key_digest(api_key),
            http,
            body_limit,
        })
    }
}

/// Digest of an API key, compared instead of the raw value.
pub fn api_key_digest(key: &str) -> [u8; 32] {
    Sha256::digest(key.as_bytes()).into()
}
