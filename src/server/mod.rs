//! HTTP prediction service.

mod auth;
mod error;
mod fetch;
mod routes;
mod state;

pub use auth::ApiKey;
pub use error::ApiError;
pub use fetch::fetch_image;
pub use state::AppState;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::prediction::Predictor;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_extractor_with_state;
use axum::routing::{get, post};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{info, warn};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/predict", post(routes::predict))
        .route_layer(from_extractor_with_state::<ApiKey, AppState>(state.clone()));

    Router::new()
        .merge(protected)
        .route("/images/{folder}/{filename}", get(routes::reference_image))
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(state.body_limit))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().on_response(
                DefaultOnResponse::new()
                    .level(tracing::Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
        )
}

/// Load the models and serve until Ctrl+C.
pub async fn serve(config: &Config) -> Result<()> {
    let predictor = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || Predictor::from_config(&config))
            .await
            .map_err(|e| Error::Internal {
                message: format!("model loading task failed: {e}"),
            })??
    };

    let state = AppState::new(
        predictor,
        &config.server.api_key,
        config.server.body_limit_bytes,
    )?;

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| Error::ServerBind {
            address: address.clone(),
            source: e,
        })?;

    info!("Listening on http://{address}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
