use serde::{Deserialize, Serialize};

/// Three-way recommendation plus a placeholder while data loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationLabel {
    Buy,
    Wait,
    Sell,
    #[default]
    Loading,
}

impl RecommendationLabel {
    /// The labels a classifier can choose between.
    pub const DECISIONS: [RecommendationLabel; 3] = [
        RecommendationLabel::Buy,
        RecommendationLabel::Wait,
        RecommendationLabel::Sell,
    ];

    /// Parse from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "buy" => Some(RecommendationLabel::Buy),
            "wait" => Some(RecommendationLabel::Wait),
            "sell" => Some(RecommendationLabel::Sell),
            "loading" => Some(RecommendationLabel::Loading),
            _ => None,
        }
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationLabel::Buy => "buy",
            RecommendationLabel::Wait => "wait",
            RecommendationLabel::Sell => "sell",
            RecommendationLabel::Loading => "loading",
        }
    }

    /// Short explanation for display.
    pub fn description(&self) -> &'static str {
        match self {
            RecommendationLabel::Buy => {
                "Indicators suggest a short-term uptrend. Consider buying according to your own strategy."
            }
            RecommendationLabel::Wait => {
                "The market shows no clear trend. It may be better to wait for stronger signals."
            }
            RecommendationLabel::Sell => {
                "Indicators suggest a short-term downtrend. Consider waiting for a better entry."
            }
            RecommendationLabel::Loading => "Analyzing the latest market data...",
        }
    }
}

impl std::fmt::Display for RecommendationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
