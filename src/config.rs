use std::env;

/// Relay configuration derived from environment variables, read once at
/// process start.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: String,
    pub port: u16,
    /// Remote inference endpoint. Present ⇒ every request is forwarded
    /// upstream; absent ⇒ the in-process predictor handles them.
    pub inference_url: Option<String>,
    pub confidence_threshold: f64,
    pub model_path: String,
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self {
            bind: env_str("RELAY_BIND", "127.0.0.1"),
            port: env_u16("RELAY_PORT", 8090),
            inference_url: env_opt("AI_INFERENCE_URL"),
            confidence_threshold: env_f64("AI_CONFIDENCE_THRESHOLD", 0.6),
            model_path: env_str("MODEL_PATH", "models/clearing_price.onnx"),
        }
    }
}
