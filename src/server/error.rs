//! HTTP error responses

use crate::error::AnalysisError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Error returned by the HTTP handlers, rendered as `{"detail": ...}`
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body has no usable URL (400)
    #[error("Missing URL")]
    MissingUrl,

    /// The pipeline reported a failure (500)
    #[error("{0}")]
    Analysis(#[from] AnalysisError),

    /// The analysis worker died (500)
    #[error("analysis task failed: {0}")]
    Internal(String),

    /// Request timeout elapsed before the analysis finished (504)
    #[error("analysis did not finish within {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl => StatusCode::BAD_REQUEST,
            ApiError::Analysis(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
