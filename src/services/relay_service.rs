use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::inference::LocalPredictor;
use crate::models::{PredictionResult, RequestPayload};
use crate::remote::RemoteInferenceClient;

/// One inference strategy. Implementations are stateless per request; the
/// relay picks one at startup and never switches.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn predict(&self, payload: &RequestPayload) -> Result<PredictionResult, RelayError>;
}

/// Pick the backend once from configuration: a configured endpoint means
/// every request goes upstream, otherwise the in-process predictor serves
/// them all.
pub fn select_backend(config: &RelayConfig) -> Arc<dyn InferenceBackend> {
    match &config.inference_url {
        Some(url) => Arc::new(RemoteInferenceClient::new(url.clone())),
        None => Arc::new(LocalPredictor::new(&config.model_path)),
    }
}

/// Confidence-gated relay over the selected inference backend.
pub struct RelayService {
    backend: Arc<dyn InferenceBackend>,
    threshold: f64,
}

impl RelayService {
    pub fn new(backend: Arc<dyn InferenceBackend>, threshold: f64) -> Self {
        Self { backend, threshold }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        let backend = select_backend(config);
        info!(
            "Inference backend selected: {} (confidence threshold {:.2})",
            backend.name(),
            config.confidence_threshold
        );
        Self::new(backend, config.confidence_threshold)
    }

    /// Single attempt, single outcome: ask the backend, gate on confidence,
    /// pass the result through untouched.
    pub async fn predict(&self, payload: &RequestPayload) -> Result<PredictionResult, RelayError> {
        let result = self.backend.predict(payload).await?;

        let confidence = result.confidence();
        if confidence < self.threshold {
            return Err(RelayError::LowConfidence {
                confidence,
                threshold: self.threshold,
            });
        }

        Ok(result)
    }
}
