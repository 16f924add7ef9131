use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::warn;

use crate::error::RelayError;
use crate::models::{PredictionResult, RequestPayload};
use crate::services::RelayService;

pub fn app_router(relay: Arc<RelayService>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(relay)
}

async fn predict(
    State(relay): State<Arc<RelayService>>,
    Json(payload): Json<RequestPayload>,
) -> Result<Json<PredictionResult>, RelayError> {
    match relay.predict(&payload).await {
        Ok(result) => Ok(Json(result)),
        Err(err) => {
            if let RelayError::LowConfidence {
                confidence,
                threshold,
            } = &err
            {
                warn!(
                    "Rejected prediction for {}: confidence {:.4} < {:.2}",
                    payload.symbol, confidence, threshold
                );
            }
            Err(err)
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
