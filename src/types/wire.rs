//! JSON wire schema for indicator bundles.
//!
//! Version 1 is the flat shape:
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "mayerMultiple": 1.2, "lowestMayer": 0.5, "highestMayer": 2.4,
//!   "fearGreedIndex": 25, "lowestFearGreed": 10, "highestFearGreed": 90,
//!   "rsi": 48.0, "lowestRSI": 20.0, "highestRSI": 80.0,
//!   "priceData": [{ "date": "1/6", "price": 60000, "sma200": 58000 }]
//! }
//! ```
//!
//! The older nested shape (`currentData` + `historicalData`) is still
//! accepted on input and converted to the same model.

use crate::error::{AppError, Result};
use crate::types::{BoundedIndicator, IndicatorBundle, PricePoint};
use serde::{Deserialize, Serialize};

/// Current wire schema version.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Scalar indicator fields shared by both wire shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireIndicators {
    pub mayer_multiple: f64,
    pub lowest_mayer: f64,
    pub highest_mayer: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fear_greed_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowest_fear_greed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_fear_greed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(rename = "lowestRSI", default, skip_serializing_if = "Option::is_none")]
    pub lowest_rsi: Option<f64>,
    #[serde(rename = "highestRSI", default, skip_serializing_if = "Option::is_none")]
    pub highest_rsi: Option<f64>,
}

/// Canonical flat bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBundle {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(flatten)]
    pub indicators: WireIndicators,
    pub price_data: Vec<PricePoint>,
}

/// Legacy nested bundle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NestedWireBundle {
    current_data: WireIndicators,
    historical_data: Vec<PricePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnyWireBundle {
    Flat(WireBundle),
    Nested(NestedWireBundle),
}

fn bounded(current: Option<f64>, lowest: Option<f64>, highest: Option<f64>) -> Option<BoundedIndicator> {
    let current = current?;
    Some(BoundedIndicator::new(
        current,
        lowest.unwrap_or(current),
        highest.unwrap_or(current),
    ))
}

impl WireBundle {
    /// Convert into the domain model, rejecting unknown schema versions.
    pub fn into_bundle(self) -> Result<IndicatorBundle> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(AppError::Malformed(format!(
                "unsupported schema version {}",
                self.schema_version
            )));
        }
        Ok(indicators_to_bundle(self.indicators, self.price_data))
    }
}

fn indicators_to_bundle(ind: WireIndicators, price_data: Vec<PricePoint>) -> IndicatorBundle {
    IndicatorBundle {
        mayer_multiple: BoundedIndicator::new(ind.mayer_multiple, ind.lowest_mayer, ind.highest_mayer),
        fear_greed: bounded(ind.fear_greed_index, ind.lowest_fear_greed, ind.highest_fear_greed),
        rsi: bounded(ind.rsi, ind.lowest_rsi, ind.highest_rsi),
        price_data,
    }
}

impl From<&IndicatorBundle> for WireBundle {
    fn from(bundle: &IndicatorBundle) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            indicators: WireIndicators {
                mayer_multiple: bundle.mayer_multiple.current,
                lowest_mayer: bundle.mayer_multiple.lowest,
                highest_mayer: bundle.mayer_multiple.highest,
                fear_greed_index: bundle.fear_greed.map(|f| f.current),
                lowest_fear_greed: bundle.fear_greed.map(|f| f.lowest),
                highest_fear_greed: bundle.fear_greed.map(|f| f.highest),
                rsi: bundle.rsi.map(|r| r.current),
                lowest_rsi: bundle.rsi.map(|r| r.lowest),
                highest_rsi: bundle.rsi.map(|r| r.highest),
            },
            price_data: bundle.price_data.clone(),
        }
    }
}

/// Decode a bundle from either wire shape.
pub fn decode_bundle(body: &[u8]) -> Result<IndicatorBundle> {
    let any: AnyWireBundle = serde_json::from_slice(body)
        .map_err(|e| AppError::Malformed(format!("unrecognized bundle shape: {}", e)))?;

    match any {
        AnyWireBundle::Flat(flat) => flat.into_bundle(),
        AnyWireBundle::Nested(nested) => Ok(indicators_to_bundle(
            nested.current_data,
            nested.historical_data,
        )),
    }
}

/// Encode a bundle in the canonical schema.
pub fn encode_bundle(bundle: &IndicatorBundle) -> Result<String> {
    Ok(serde_json::to_string(&WireBundle::from(bundle))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT: &str = r#"{
        "mayerMultiple": 1.2,
        "lowestMayer": 0.5,
        "highestMayer": 2.4,
        "fearGreedIndex": 25,
        "lowestFearGreed": 10,
        "highestFearGreed": 90,
        "priceData": [
            { "date": "1/6", "price": 60000, "sma50": 59800, "sma100": 59500, "sma200": 58000 },
            { "date": "2/6", "price": 61000, "sma50": 60800, "sma100": 60500, "sma200": 58200 }
        ]
    }"#;

    const NESTED: &str = r#"{
        "currentData": {
            "mayerMultiple": 1.2,
            "lowestMayer": 0.5,
            "highestMayer": 2.4,
            "fearGreedIndex": 25,
            "lowestFearGreed": 10,
            "highestFearGreed": 90
        },
        "historicalData": [
            { "date": "1/6", "price": 60000, "sma50": 59800, "sma100": 59500, "sma200": 58000 },
            { "date": "2/6", "price": 61000, "sma50": 60800, "sma100": 60500, "sma200": 58200 }
        ]
    }"#;

    // =========================================================================
    // Decoding
    // =========================================================================

    #[test]
    fn test_decode_flat() {
        let bundle = decode_bundle(FLAT.as_bytes()).unwrap();
        assert_eq!(bundle.mayer_multiple, BoundedIndicator::new(1.2, 0.5, 2.4));
        assert_eq!(bundle.fear_greed, Some(BoundedIndicator::new(25.0, 10.0, 90.0)));
        assert!(bundle.rsi.is_none());
        assert_eq!(bundle.price_data.len(), 2);
        assert_eq!(bundle.price_data[1].sma200, Some(58200.0));
        assert!(bundle.price_data[0].ema.is_none());
    }

    #[test]
    fn test_nested_matches_flat() {
        let flat = decode_bundle(FLAT.as_bytes()).unwrap();
        let nested = decode_bundle(NESTED.as_bytes()).unwrap();
        assert_eq!(flat, nested);
    }

    #[test]
    fn test_decode_rsi_with_missing_bounds() {
        let json = r#"{
            "mayerMultiple": 0.9, "lowestMayer": 0.5, "highestMayer": 2.4,
            "rsi": 42.5,
            "priceData": []
        }"#;
        let bundle = decode_bundle(json.as_bytes()).unwrap();
        assert_eq!(bundle.rsi, Some(BoundedIndicator::new(42.5, 42.5, 42.5)));
        assert!(bundle.fear_greed.is_none());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let json = r#"{
            "schemaVersion": 2,
            "mayerMultiple": 1.0, "lowestMayer": 0.5, "highestMayer": 2.4,
            "priceData": []
        }"#;
        let err = decode_bundle(json.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::Malformed(_)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            decode_bundle(b"<html>502 Bad Gateway</html>"),
            Err(AppError::Malformed(_))
        ));
        assert!(matches!(
            decode_bundle(br#"{"priceData": []}"#),
            Err(AppError::Malformed(_))
        ));
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    #[test]
    fn test_encode_uses_canonical_names() {
        let bundle = decode_bundle(NESTED.as_bytes()).unwrap();
        let json = encode_bundle(&bundle).unwrap();
        assert!(json.contains("\"schemaVersion\":1"));
        assert!(json.contains("\"fearGreedIndex\":25.0"));
        assert!(json.contains("\"priceData\""));
        assert!(!json.contains("currentData"));
        assert!(!json.contains("lowestRSI"));
    }
}
