//! HTTP front end for the analysis pipeline
//!
//! Routes:
//! - `GET /` readiness message
//! - `POST /analyze` with `{"url": "..."}`

mod error;

pub use error::ApiError;

use crate::model::AnalysisResponse;
use crate::pipeline::Analyzer;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Shared state of the router
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<dyn Analyzer>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn Analyzer>, request_timeout: Duration) -> Self {
        Self {
            analyzer,
            request_timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    url: Option<String>,
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/analyze", post(analyze))
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Audio Analysis Service Ready" }))
}

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let url = request
        .url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(ApiError::MissingUrl)?;

    // Decoding and DSP are CPU bound; the worker finishes (and cleans up)
    // even if the client is answered with a timeout first
    let analyzer = state.analyzer.clone();
    let task = tokio::task::spawn_blocking(move || analyzer.analyze(&url));

    match tokio::time::timeout(state.request_timeout, task).await {
        Err(_) => Err(ApiError::Timeout(state.request_timeout)),
        Ok(Err(join_error)) => Err(ApiError::Internal(join_error.to_string())),
        Ok(Ok(result)) => Ok(Json(result?)),
    }
}
