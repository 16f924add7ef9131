use serde::{Deserialize, Serialize};

/// One proposed trade instruction submitted for clearing-price evaluation.
///
/// Amounts and prices are integer-unit decimals carried as strings so no
/// precision is lost in transit; the relay itself never does arithmetic on
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentFeature {
    pub side: i64, // 0 = buy base, 1 = sell base
    pub amount: String,
    #[serde(rename = "limitPrice")]
    pub limit_price: String,
    #[serde(rename = "marketId")]
    pub market_id: i64,
}

/// Batch of intents submitted to `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestPayload {
    pub intents: Vec<IntentFeature>,
    #[serde(rename = "referencePrice")]
    pub reference_price: Option<String>,
    pub symbol: String,
    pub timestamp: i64, // unix seconds, unvalidated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_wire_names() {
        let raw = r#"{
            "intents": [
                {"side": 0, "amount": "250", "limitPrice": "1010", "marketId": 3}
            ],
            "symbol": "ETH-USDC",
            "timestamp": 1754000000
        }"#;

        let payload: RequestPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.intents.len(), 1);
        assert_eq!(payload.intents[0].limit_price, "1010");
        assert_eq!(payload.intents[0].market_id, 3);
        assert!(payload.reference_price.is_none());
    }

    #[test]
    fn serializes_back_to_wire_names() {
        let payload = RequestPayload {
            intents: vec![IntentFeature {
                side: 1,
                amount: "50".to_string(),
                limit_price: "990".to_string(),
                market_id: 1,
            }],
            reference_price: Some("1000".to_string()),
            symbol: "ETH-USDC".to_string(),
            timestamp: 1754000000,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["intents"][0]["limitPrice"], "990");
        assert_eq!(value["intents"][0]["marketId"], 1);
        assert_eq!(value["referencePrice"], "1000");
    }
}
