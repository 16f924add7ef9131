pub mod payload;
pub mod prediction;

pub use payload::{IntentFeature, RequestPayload};
pub use prediction::PredictionResult;
