use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::error;

use crate::error::RelayError;
use crate::models::{PredictionResult, RequestPayload};
use crate::services::relay_service::InferenceBackend;

/// Ceiling for one upstream inference round trip.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON client for an external inference service. One POST per prediction,
/// no retries.
#[derive(Clone)]
pub struct RemoteInferenceClient {
    client: Client,
    endpoint: String,
}

impl RemoteInferenceClient {
    pub fn new(endpoint: String) -> Self {
        Self::with_timeout(endpoint, UPSTREAM_TIMEOUT)
    }

    pub fn with_timeout(endpoint: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client construction failed");

        Self { client, endpoint }
    }
}

#[async_trait]
impl InferenceBackend for RemoteInferenceClient {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn predict(&self, payload: &RequestPayload) -> Result<PredictionResult, RelayError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| RelayError::Upstream(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            error!("Inference upstream returned {}: {}", status, error_text);
            return Err(RelayError::Upstream(format!(
                "status {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        resp.json::<PredictionResult>()
            .await
            .map_err(|e| RelayError::Upstream(e.to_string()))
    }
}
