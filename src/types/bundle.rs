use serde::{Deserialize, Serialize};

/// Number of points in a trailing daily window (today plus 30 prior days).
pub const WINDOW_DAYS: usize = 31;

/// A single daily price sample with optional moving averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    /// Calendar-day label in `d/m` form.
    pub date: String,
    /// Closing price in USD.
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma50: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma100: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma200: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema: Option<f64>,
}

impl PricePoint {
    /// Create a point with only a price.
    pub fn new(date: impl Into<String>, price: f64) -> Self {
        Self {
            date: date.into(),
            price,
            sma50: None,
            sma100: None,
            sma200: None,
            ema: None,
        }
    }

    /// Set the 200-day SMA.
    pub fn with_sma200(mut self, sma200: f64) -> Self {
        self.sma200 = Some(sma200);
        self
    }
}

/// A current indicator value with its historical range.
///
/// The bounds are illustrative metadata and are not checked against `current`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundedIndicator {
    pub current: f64,
    pub lowest: f64,
    pub highest: f64,
}

impl BoundedIndicator {
    pub fn new(current: f64, lowest: f64, highest: f64) -> Self {
        Self {
            current,
            lowest,
            highest,
        }
    }
}

/// Snapshot of current and historical Bitcoin metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorBundle {
    /// Price over its 200-day SMA.
    pub mayer_multiple: BoundedIndicator,
    /// Fear & Greed Index (0-100). Absent for sources that don't provide it.
    pub fear_greed: Option<BoundedIndicator>,
    /// RSI (0-100).
    pub rsi: Option<BoundedIndicator>,
    /// Chronological price history, oldest first.
    pub price_data: Vec<PricePoint>,
}

impl IndicatorBundle {
    /// The most recent price point.
    pub fn latest(&self) -> Option<&PricePoint> {
        self.price_data.last()
    }

    /// The point before the most recent one.
    pub fn previous(&self) -> Option<&PricePoint> {
        let len = self.price_data.len();
        if len < 2 {
            return None;
        }
        self.price_data.get(len - 2)
    }
}

/// Where a bundle came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BundleOrigin {
    /// Fetched from an upstream source.
    Live { source: String },
    /// Generated locally because the upstream fetch failed.
    Synthetic { reason: String },
}

impl BundleOrigin {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, BundleOrigin::Synthetic { .. })
    }

    /// Soft warning shown alongside synthetic data.
    pub fn warning(&self) -> Option<String> {
        match self {
            BundleOrigin::Live { .. } => None,
            BundleOrigin::Synthetic { reason } => Some(format!(
                "Live data unavailable ({}); showing simulated data",
                reason
            )),
        }
    }
}
