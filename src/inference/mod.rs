use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tract_onnx::prelude::*;
use tracing::{error, info, warn};

use crate::error::RelayError;
use crate::models::{IntentFeature, PredictionResult, RequestPayload};
use crate::services::relay_service::InferenceBackend;

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

type PredictError = Box<dyn std::error::Error + Send + Sync>;

/// In-process clearing-price predictor.
///
/// Runs an ONNX model when one is present at the configured path; otherwise
/// falls back to a deterministic uniform-price solver over the intents'
/// limit prices.
#[derive(Clone)]
pub struct LocalPredictor {
    model: Option<Arc<RunnableModel>>,
}

impl LocalPredictor {
    pub fn new(model_path: &str) -> Self {
        let path = Path::new(model_path);
        let model = if path.exists() {
            info!("Loading ONNX model from {:?}", path);
            match Self::load_model(model_path) {
                Ok(plan) => Some(Arc::new(plan)),
                Err(e) => {
                    error!("Failed to load model: {}", e);
                    None
                }
            }
        } else {
            warn!(
                "ONNX model not found at {:?}. Using uniform-price solver.",
                path
            );
            None
        };

        Self { model }
    }

    fn load_model(path: &str) -> TractResult<RunnableModel> {
        let model = tract_onnx::onnx()
            .model_for_path(path)?
            .into_optimized()?
            .into_runnable()?;
        Ok(model)
    }

    pub fn infer(&self, payload: &RequestPayload) -> Result<PredictionResult, PredictError> {
        if let Some(model) = &self.model {
            run_model(model, payload)
        } else {
            solve_uniform(&payload.intents)
        }
    }
}

#[async_trait]
impl InferenceBackend for LocalPredictor {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn predict(&self, payload: &RequestPayload) -> Result<PredictionResult, RelayError> {
        self.infer(payload)
            .map_err(|e| RelayError::LocalInference(e.to_string()))
    }
}

fn run_model(model: &RunnableModel, payload: &RequestPayload) -> Result<PredictionResult, PredictError> {
    let features = feature_vector(payload);

    // Input tensor (1, N)
    let tensor =
        tract_ndarray::Array::from_shape_vec((1, features.len()), features)?.into_tensor();

    let result = model.run(tvec!(tensor.into()))?;

    // Model contract: output row is [clearing_price, confidence].
    let output = result[0].to_array_view::<f32>()?;
    let mut values = output.iter().copied();
    let price = values.next().unwrap_or(0.0).max(0.0);
    let confidence = f64::from(values.next().unwrap_or(0.0)).clamp(0.0, 1.0);

    Ok(PredictionResult(json!({
        "clearingPrice": format!("{:.0}", price),
        "confidence": confidence,
        "explanation": "onnx clearing-price model",
    })))
}

/// Summarize the batch for the model. Lossy f32 parses are fine here, the
/// exact strings never leave the payload.
fn feature_vector(payload: &RequestPayload) -> Vec<f32> {
    let mut buy_count = 0.0f32;
    let mut sell_count = 0.0f32;
    let mut buy_volume = 0.0f32;
    let mut sell_volume = 0.0f32;
    let mut min_limit = f32::INFINITY;
    let mut max_limit = 0.0f32;

    for intent in &payload.intents {
        let amount = intent.amount.trim().parse::<f32>().unwrap_or(0.0);
        let limit = intent.limit_price.trim().parse::<f32>().unwrap_or(0.0);

        if intent.side == 0 {
            buy_count += 1.0;
            buy_volume += amount;
        } else if intent.side == 1 {
            sell_count += 1.0;
            sell_volume += amount;
        }
        min_limit = min_limit.min(limit);
        max_limit = max_limit.max(limit);
    }

    if !min_limit.is_finite() {
        min_limit = 0.0;
    }

    let reference = payload
        .reference_price
        .as_deref()
        .and_then(|s| s.trim().parse::<f32>().ok())
        .unwrap_or(0.0);

    vec![
        buy_count,
        sell_count,
        buy_volume,
        sell_volume,
        min_limit,
        max_limit,
        reference,
    ]
}

struct ParsedIntent {
    side: i64,
    amount: u128,
    limit_price: u128,
}

fn parse_intents(intents: &[IntentFeature]) -> Result<Vec<ParsedIntent>, PredictError> {
    intents
        .iter()
        .map(|intent| {
            let amount = intent
                .amount
                .trim()
                .parse::<u128>()
                .map_err(|e| format!("bad amount {:?}: {}", intent.amount, e))?;
            let limit_price = intent
                .limit_price
                .trim()
                .parse::<u128>()
                .map_err(|e| format!("bad limitPrice {:?}: {}", intent.limit_price, e))?;
            Ok(ParsedIntent {
                side: intent.side,
                amount,
                limit_price,
            })
        })
        .collect()
}

/// Crossable volume at `price`: buys fill at or below their limit, sells at
/// or above theirs.
fn fill_at(intents: &[ParsedIntent], price: u128) -> (u128, u128) {
    let mut buy = 0u128;
    let mut sell = 0u128;
    for it in intents {
        if it.side == 0 && price <= it.limit_price {
            buy = buy.saturating_add(it.amount);
        } else if it.side == 1 && price >= it.limit_price {
            sell = sell.saturating_add(it.amount);
        }
    }
    (buy, sell)
}

/// Uniform clearing price: search the batch's distinct limit prices for the
/// candidate minimizing the buy/sell imbalance. Ties take the lowest
/// candidate; an empty batch yields price "1" with zero confidence.
fn solve_uniform(intents: &[IntentFeature]) -> Result<PredictionResult, PredictError> {
    let parsed = parse_intents(intents)?;

    let mut prices: Vec<u128> = parsed.iter().map(|i| i.limit_price).collect();
    prices.sort_unstable();
    prices.dedup();

    let mut best = prices.first().copied().unwrap_or(1);
    let mut best_diff = u128::MAX;
    for &p in &prices {
        let (buy, sell) = fill_at(&parsed, p);
        let diff = buy.abs_diff(sell);
        if diff < best_diff {
            best_diff = diff;
            best = p;
        }
    }

    let (buy, sell) = fill_at(&parsed, best);
    let imbalance = buy.abs_diff(sell);
    let total = buy.saturating_add(sell);
    let confidence = if total == 0 {
        0.0
    } else {
        1.0 - (imbalance as f64 / total as f64)
    };

    Ok(PredictionResult(json!({
        "clearingPrice": best.to_string(),
        "confidence": confidence,
        "explanation": format!(
            "uniform price over {} intents, imbalance {}",
            intents.len(),
            imbalance
        ),
        "totals": {
            "buyBase": buy.to_string(),
            "sellBase": sell.to_string(),
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(side: i64, amount: &str, limit_price: &str) -> IntentFeature {
        IntentFeature {
            side,
            amount: amount.to_string(),
            limit_price: limit_price.to_string(),
            market_id: 1,
        }
    }

    #[test]
    fn crossed_book_clears_with_full_confidence() {
        let intents = vec![intent(0, "100", "1050"), intent(1, "100", "950")];

        let result = solve_uniform(&intents).unwrap();
        // At 950 both sides fill 100, imbalance 0.
        assert_eq!(result.0["clearingPrice"], "950");
        assert_eq!(result.confidence(), 1.0);
        assert_eq!(result.0["totals"]["buyBase"], "100");
        assert_eq!(result.0["totals"]["sellBase"], "100");
    }

    #[test]
    fn tie_takes_lowest_candidate() {
        // Both candidates leave an imbalance of 50; the lower one wins.
        let intents = vec![intent(0, "50", "1000"), intent(1, "50", "2000")];

        let result = solve_uniform(&intents).unwrap();
        assert_eq!(result.0["clearingPrice"], "1000");
        assert_eq!(result.confidence(), 0.0);
    }

    #[test]
    fn partial_imbalance_lowers_confidence() {
        let intents = vec![intent(0, "100", "1000"), intent(1, "60", "1000")];

        let result = solve_uniform(&intents).unwrap();
        assert_eq!(result.0["clearingPrice"], "1000");
        // |100 - 60| / 160
        assert!((result.confidence() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn empty_batch_yields_unit_price() {
        let result = solve_uniform(&[]).unwrap();
        assert_eq!(result.0["clearingPrice"], "1");
        assert_eq!(result.confidence(), 0.0);
    }

    #[test]
    fn unparseable_amount_is_an_error() {
        let intents = vec![intent(0, "12.5e3", "1000")];
        let err = solve_uniform(&intents).unwrap_err();
        assert!(err.to_string().contains("bad amount"));
    }

    #[test]
    fn missing_model_falls_back_to_solver() {
        let predictor = LocalPredictor::new("does-not-exist.onnx");
        let payload = RequestPayload {
            intents: vec![intent(0, "10", "500"), intent(1, "10", "400")],
            reference_price: None,
            symbol: "ETH-USDC".to_string(),
            timestamp: 1754000000,
        };

        let result = predictor.infer(&payload).unwrap();
        assert_eq!(result.0["clearingPrice"], "400");
        assert_eq!(result.confidence(), 1.0);
    }

    #[test]
    fn feature_vector_summarizes_both_sides() {
        let payload = RequestPayload {
            intents: vec![
                intent(0, "100", "1050"),
                intent(0, "40", "1000"),
                intent(1, "70", "950"),
            ],
            reference_price: Some("1010".to_string()),
            symbol: "ETH-USDC".to_string(),
            timestamp: 1754000000,
        };

        let features = feature_vector(&payload);
        assert_eq!(
            features,
            vec![2.0, 1.0, 140.0, 70.0, 950.0, 1050.0, 1010.0]
        );
    }
}
