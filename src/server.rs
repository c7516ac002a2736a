//! HTTP/JSON API over the translation facade.
//!
//! ## Endpoints
//! - POST /api/translate - Resolve a translation
//! - POST /api/translations/export - Export an offline snapshot (admin)
//! - POST /api/translations/reload - Reload the offline snapshot (admin)
//! - GET  /health - Liveness probe

use crate::config::Config;
use crate::resolver::Translator;
use crate::security::constant_time_compare;
use crate::snapshot;
use crate::store::TranslationStore;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Debug, Clone, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated: String,
    pub cached: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub exported: usize,
    pub file: String,
}

/// API error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "INVALID_REQUEST".to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            error: "Invalid or missing API key".to_string(),
            code: "UNAUTHORIZED".to_string(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "INTERNAL".to_string(),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "INVALID_REQUEST" => StatusCode::BAD_REQUEST,
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// App state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub translator: Arc<Translator>,
    pub store: TranslationStore,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/translate", post(translate))
        .route("/api/translations/export", post(export_snapshot))
        .route("/api/translations/reload", post(reload_snapshot))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /api/translate
///
/// The resolution itself is infallible; the only client error is a blank
/// `text` or `target` field.
async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ErrorResponse> {
    if request.text.trim().is_empty() || request.target.trim().is_empty() {
        return Err(ErrorResponse::bad_request(
            "Both 'text' and 'target' are required",
        ));
    }

    let resolution = state.translator.resolve(&request.text, &request.target).await;

    Ok(Json(TranslateResponse {
        cached: resolution.served_from_cache(),
        translated: resolution.text,
    }))
}

/// POST /api/translations/export - Write the offline snapshot file (admin)
async fn export_snapshot(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ExportResponse>, ErrorResponse> {
    require_admin_key(&state.config, &headers)?;

    let path = Path::new(&state.config.snapshot_path);
    let exported = snapshot::export(&state.store, path).map_err(|e| {
        error!("Snapshot export failed: {:#}", e);
        ErrorResponse::internal("Snapshot export failed")
    })?;

    info!("Admin export wrote {} records", exported);
    Ok(Json(ExportResponse {
        exported,
        file: state.config.snapshot_path.clone(),
    }))
}

/// POST /api/translations/reload - Swap in the snapshot file (admin)
async fn reload_snapshot(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ErrorResponse> {
    require_admin_key(&state.config, &headers)?;

    let path = Path::new(&state.config.snapshot_path);
    let loaded = state.translator.reload_snapshot(path).await.map_err(|e| {
        error!("Snapshot reload failed: {}", e);
        ErrorResponse::internal("Snapshot reload failed")
    })?;

    Ok(Json(json!({ "loaded": loaded })))
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Admin endpoints are disabled outright when no key is configured.
fn require_admin_key(config: &Config, headers: &HeaderMap) -> Result<(), ErrorResponse> {
    let expected = config
        .admin_api_key
        .as_deref()
        .ok_or_else(ErrorResponse::unauthorized)?;

    let provided = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(ErrorResponse::unauthorized)?;

    if !constant_time_compare(provided, expected) {
        return Err(ErrorResponse::unauthorized());
    }

    Ok(())
}
