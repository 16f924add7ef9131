use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque backend result, returned to the caller unchanged on success.
/// The relay interprets exactly one field: `confidence`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionResult(pub Value);

impl PredictionResult {
    /// Backend-reported confidence in [0,1]. Absent or non-numeric reads
    /// as 0, which fails any positive threshold.
    pub fn confidence(&self) -> f64 {
        self.0
            .get("confidence")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }
}
