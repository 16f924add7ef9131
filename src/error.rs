use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy of the relay. Variants map to transport status codes in
/// `IntoResponse` and nowhere else.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Remote call failed, timed out, returned non-2xx, or returned a body
    /// that is not JSON.
    #[error("External model error: {0}")]
    Upstream(String),

    /// The in-process predictor failed.
    #[error("Local model error: {0}")]
    LocalInference(String),

    /// Backend answered, but below the configured confidence threshold.
    #[error("Model confidence too low")]
    LowConfidence { confidence: f64, threshold: f64 },
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::LowConfidence { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) | Self::LocalInference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = json!({ "detail": self.to_string() });
        (status, Json(body)).into_response()
    }
}
