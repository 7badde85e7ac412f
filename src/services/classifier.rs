//! Recommendation classifier.
//!
//! Turns the latest values of an indicator bundle into a buy/wait/sell label.
//! One rule is active per classifier; rules are never combined.

use crate::types::{IndicatorBundle, RecommendationLabel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Fear & Greed readings below this count as fear.
pub const FEAR_THRESHOLD: f64 = 20.0;

/// Mayer Multiple readings below this count as cheap.
///
/// The Mayer Multiple normally lives around 0.5-2.5, so this almost always
/// holds. Kept at 80 until the intended cutoff is confirmed.
pub const MAYER_THRESHOLD: f64 = 80.0;

/// Decision rule applied to a loaded bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierRule {
    /// Price vs. 200-day SMA and day-over-day direction.
    #[default]
    Trend,
    /// Fear & Greed and Mayer Multiple thresholds.
    Threshold,
}

impl ClassifierRule {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trend" => Some(ClassifierRule::Trend),
            "threshold" => Some(ClassifierRule::Threshold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierRule::Trend => "trend",
            ClassifierRule::Threshold => "threshold",
        }
    }
}

/// Source of the label used when a rule has too little data to decide.
pub trait LabelPicker: Send + Sync {
    fn pick(&self, choices: &[RecommendationLabel]) -> RecommendationLabel;
}

/// Uniform random pick.
pub struct RandomPicker {
    rng: Mutex<StdRng>,
}

impl RandomPicker {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl LabelPicker for RandomPicker {
    fn pick(&self, choices: &[RecommendationLabel]) -> RecommendationLabel {
        if choices.is_empty() {
            return RecommendationLabel::Loading;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        choices[rng.gen_range(0..choices.len())]
    }
}

/// Always returns the same label.
pub struct FixedPicker(pub RecommendationLabel);

impl LabelPicker for FixedPicker {
    fn pick(&self, _choices: &[RecommendationLabel]) -> RecommendationLabel {
        self.0
    }
}

/// Trend rule: above the 200-day SMA and rising is a buy, neither is a sell.
pub fn trend_rule(latest_price: f64, previous_price: f64, latest_sma200: f64) -> RecommendationLabel {
    let price_above_sma = latest_price > latest_sma200;
    let price_increasing = latest_price > previous_price;

    match (price_above_sma, price_increasing) {
        (true, true) => RecommendationLabel::Buy,
        (false, false) => RecommendationLabel::Sell,
        _ => RecommendationLabel::Wait,
    }
}

/// Threshold rule: fear and a low Mayer Multiple together are a buy.
pub fn threshold_rule(fear_greed_today: f64, mayer_multiple: f64) -> RecommendationLabel {
    let fear_condition = fear_greed_today < FEAR_THRESHOLD;
    let mayer_condition = mayer_multiple < MAYER_THRESHOLD;

    match (fear_condition, mayer_condition) {
        (true, true) => RecommendationLabel::Buy,
        (false, false) => RecommendationLabel::Sell,
        _ => RecommendationLabel::Wait,
    }
}

/// Classifies indicator bundles into recommendation labels.
pub struct SignalClassifier {
    rule: ClassifierRule,
    picker: Box<dyn LabelPicker>,
}

impl SignalClassifier {
    /// Classifier with a random fallback picker.
    pub fn new(rule: ClassifierRule) -> Self {
        Self::with_picker(rule, Box::new(RandomPicker::from_entropy()))
    }

    pub fn with_picker(rule: ClassifierRule, picker: Box<dyn LabelPicker>) -> Self {
        Self { rule, picker }
    }

    pub fn rule(&self) -> ClassifierRule {
        self.rule
    }

    /// Classify a bundle.
    ///
    /// `force` wins over everything. Otherwise a missing bundle or a fetch in
    /// progress yields `Loading`. When the rule lacks the data it needs, the
    /// label is picked at random and carries no predictive meaning.
    pub fn classify(
        &self,
        bundle: Option<&IndicatorBundle>,
        is_loading: bool,
        force: Option<RecommendationLabel>,
    ) -> RecommendationLabel {
        if let Some(label) = force {
            return label;
        }

        let bundle = match bundle {
            Some(b) if !is_loading => b,
            _ => return RecommendationLabel::Loading,
        };

        self.evaluate(bundle)
            .unwrap_or_else(|| self.picker.pick(&RecommendationLabel::DECISIONS))
    }

    /// Apply the rule, or `None` if the bundle can't support it.
    fn evaluate(&self, bundle: &IndicatorBundle) -> Option<RecommendationLabel> {
        match self.rule {
            ClassifierRule::Trend => {
                let latest = bundle.latest()?;
                let previous = bundle.previous()?;
                let sma200 = latest.sma200.unwrap_or(0.0);
                Some(trend_rule(latest.price, previous.price, sma200))
            }
            ClassifierRule::Threshold => {
                let fear_greed = bundle.fear_greed?;
                Some(threshold_rule(fear_greed.current, bundle.mayer_multiple.current))
            }
        }
    }
}

impl Default for SignalClassifier {
    fn default() -> Self {
        Self::new(ClassifierRule::default())
    }
}
