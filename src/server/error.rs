//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

/// Errors returned by the HTTP handlers as `{"error": message}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or wrong `x-api-key` header.
    #[error("Invalid API Key")]
    InvalidApiKey,

    /// Neither an upload nor an `image_url` was given.
    #[error("No image provided: upload a 'file' field or pass 'image_url'")]
    MissingImage,

    /// Malformed multipart body.
    #[error("Invalid upload: {0}")]
    BadUpload(String),

    /// The bytes are not a decodable image.
    #[error("Invalid image file")]
    InvalidImage,

    /// The remote image could not be fetched.
    #[error("Could not fetch image: {0}")]
    Upstream(String),

    /// The remote image exceeds the body limit.
    #[error("Image exceeds {0} bytes")]
    TooLarge(usize),

    /// Requested reference photo does not exist.
    #[error("Image not found")]
    NotFound,

    /// Anything else; details are logged, not returned.
    #[error("Internal server error")]
    Internal(#[source] crate::Error),
}

impl From<crate::Error> for ApiError {
    fn from(err: crate::Error) -> Self {
        match err {
            crate::Error::ImageDecode { .. } => Self::InvalidImage,
            crate::Error::ImageFetch { .. } => Self::Upstream(err.to_string()),
            crate::Error::ImageTooLarge { limit, .. } => Self::TooLarge(limit),
            other => Self::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidApiKey | Self::MissingImage | Self::BadUpload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidImage => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match &self {
            Self::Internal(e) => error!("Request failed: {e:?}"),
            other => warn!("Request rejected ({status}): {other}"),
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
