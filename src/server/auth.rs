//! API key guard.

use super::error::ApiError;
use super::state::{AppState, api_key_digest};
use crate::constants::server::API_KEY_HEADER;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use subtle::ConstantTimeEq;

/// Proof that the request carried the configured API key.
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

impl FromRequestParts<AppState> for ApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        match provided {
            Some(key) if key_matches(key, &state.api_key_digest) => Ok(Self),
            _ => Err(ApiError::InvalidApiKey),
        }
    }
}

/// Constant-time check of `provided` against the expected key digest.
///
/// Both sides are SHA-256 digests, so the compared slices always have equal
/// length.
fn key_matches(provided: &str, expected: &[u8; 32]) -> bool {
    let digest = api_key_digest(provided);
    digest[..].ct_eq(&expected[..]).into()
}
