//! Route handlers.

use super::error::ApiError;
use super::fetch::fetch_image;
use super::state::AppState;
use crate::constants::server::UPLOAD_FIELD;
use crate::prediction::PredictionResponse;
use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

/// Query parameters of `POST /predict`.
#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    /// Fetch the image from this URL instead of reading an upload.
    pub image_url: Option<String>,
}

/// `POST /predict`: run the prediction pipeline on an uploaded or linked image.
pub async fn predict(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let bytes = match query.image_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => {
            info!("Predicting image from {url}");
            fetch_image(&state.http, url, state.body_limit).await?
        }
        None => {
            let mut multipart = multipart.map_err(|_| ApiError::MissingImage)?;
            read_upload(&mut multipart).await?
        }
    };

    let response = state.predictor.predict(bytes).await?;
    Ok(Json(response))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        debug!("Reading upload {:?}", field.file_name());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadUpload(e.body_text()))?;

        if bytes.is_empty() {
            return Err(ApiError::MissingImage);
        }
        return Ok(bytes.to_vec());
    }

    Err(ApiError::MissingImage)
}

/// `GET /images/{folder}/{filename}`: serve a reference photo.
pub async fn reference_image(
    State(state): State<AppState>,
    Path((folder, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let path = state
        .predictor
        .references()
        .resolve_file(&folder, &filename)
        .await
        .ok_or(ApiError::NotFound)?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::NotFound)?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes))
}

/// `GET /health`.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
