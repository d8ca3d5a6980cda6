//! API handlers for the server.

use crate::upload::UploadStore;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Multipart field that carries the uploaded file
pub const FILE_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pub uploads: Arc<UploadStore>,
}

/// Routes plus static files from `static_dir` for everything else
pub fn router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/save-image", post(save_image))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Store the multipart `file` field under its original file name
pub async fn save_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let path = state.uploads.target_path(&original_name).ok_or_else(|| {
            ApiError::BadRequest(format!("unusable file name: {:?}", original_name))
        })?;

        let bytes = field.bytes().await?;
        state.uploads.save(&path, &bytes).await?;

        info!("Image saved: {}", original_name);
        return Ok(StatusCode::OK);
    }

    warn!("Upload without a `{}` field", FILE_FIELD);
    Err(ApiError::BadRequest(format!("missing `{}` field", FILE_FIELD)))
}

// Error handling
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, message).into_response()
    }
}

impl From<life_core::Error> for ApiError {
    fn from(err: life_core::Error) -> Self {
        error!("Core error: {}", err);
        ApiError::Internal(err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        warn!("Malformed upload: {}", err);
        ApiError::BadRequest(err.body_text())
    }
}
