//! HTTP API for browser-driven imports and CSV downloads.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use blogport_core::{Config, CoreError, ImportRecord, codec};
use blogport_import::{ImportError, ImportReport, Importer};
use chrono::Utc;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Shared state for request handlers.
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Importer built from the loaded configuration.
    pub importer: Importer,
}

impl ServerState {
    pub fn new(config: &Config) -> Self {
        Self {
            importer: Importer::from_config(config),
        }
    }
}

/// Create the API router.
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/import", post(import_handler))
        .route("/api/import-posts", post(import_handler))
        .route("/export.csv", get(export_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    /// The request body was unusable.
    BadRequest(String),
    /// Import or export could not start or reach the CMS.
    Import(ImportError),
    /// Anything else.
    Internal(String),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        Self::Import(err)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            Self::Import(err) => import_error_payload(&err),
            Self::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };
        (status, Json(body)).into_response()
    }
}

fn import_error_payload(err: &ImportError) -> (StatusCode, Value) {
    match err {
        ImportError::Configuration { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": err.headline(), "instructions": err.remediation() }),
        ),
        ImportError::Authorization { details, .. } => (
            StatusCode::UNAUTHORIZED,
            json!({
                "error": err.headline(),
                "details": details,
                "instructions": err.remediation(),
            }),
        ),
        ImportError::Remote(e) => (StatusCode::BAD_GATEWAY, json!({ "error": e.to_string() })),
    }
}

/// Extract the `posts` array from a request body.
fn parse_import_body(body: &[u8]) -> Result<Vec<ImportRecord>, ApiError> {
    let invalid = || ApiError::BadRequest("Invalid posts data".to_string());

    let mut value: Value = serde_json::from_slice(body).map_err(|_| invalid())?;
    let posts = value
        .get_mut("posts")
        .map(Value::take)
        .filter(Value::is_array)
        .ok_or_else(invalid)?;

    serde_json::from_value(posts).map_err(|_| invalid())
}

async fn import_handler(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<ImportReport>, ApiError> {
    let records = parse_import_body(&body)?;
    info!(records = records.len(), "import requested");

    let report = state.importer.run(&records).await.inspect_err(|e| {
        error!(error = %e, "import aborted");
    })?;
    Ok(Json(report))
}

async fn export_handler(State(state): State<Arc<ServerState>>) -> Result<Response, ApiError> {
    let records = state.importer.export().await?;
    let csv = codec::serialize(&records)?;
    let filename = format!("blog-posts-{}.csv", Utc::now().timestamp_millis());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
