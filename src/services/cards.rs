//! Indicator cards shown next to the recommendation.

use crate::types::{BoundedIndicator, IndicatorBundle};
use serde::{Deserialize, Serialize};

/// Values above this are favorable when higher is better.
pub const UP_FAVORABLE_ABOVE: f64 = 1.0;

/// Values below this are favorable when lower is better.
pub const DOWN_FAVORABLE_BELOW: f64 = 40.0;

/// Which way a reading should move to be good news for buyers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoodDirection {
    Up,
    Down,
}

/// Whether `value` currently reads as favorable.
pub fn is_favorable(value: f64, direction: GoodDirection) -> bool {
    match direction {
        GoodDirection::Up => value > UP_FAVORABLE_ABOVE,
        GoodDirection::Down => value < DOWN_FAVORABLE_BELOW,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorCard {
    pub id: &'static str,
    pub title: &'static str,
    pub current: f64,
    pub lowest: f64,
    pub highest: f64,
    pub good_direction: GoodDirection,
    pub is_favorable: bool,
    pub description: &'static str,
    pub color: &'static str,
}

fn card(
    id: &'static str,
    title: &'static str,
    indicator: BoundedIndicator,
    good_direction: GoodDirection,
    description: &'static str,
    color: &'static str,
) -> IndicatorCard {
    IndicatorCard {
        id,
        title,
        current: indicator.current,
        lowest: indicator.lowest,
        highest: indicator.highest,
        good_direction,
        is_favorable: is_favorable(indicator.current, good_direction),
        description,
        color,
    }
}

/// Cards for every indicator present in the bundle.
pub fn indicator_cards(bundle: &IndicatorBundle) -> Vec<IndicatorCard> {
    let mut cards = vec![card(
        "mayerMultiple",
        "Mayer Multiple",
        bundle.mayer_multiple,
        GoodDirection::Down,
        "Ratio of the current Bitcoin price to its 200-day moving average. \
         Values below 0.8 have historically marked good buying opportunities.",
        "#9b87f5",
    )];

    if let Some(rsi) = bundle.rsi {
        cards.push(card(
            "rsi",
            "RSI (Relative Strength Index)",
            rsi,
            GoodDirection::Down,
            "Measures the speed and change of price movements. \
             Values below 30 are considered oversold.",
            "#F97316",
        ));
    }

    if let Some(fear_greed) = bundle.fear_greed {
        cards.push(card(
            "fearGreed",
            "Fear & Greed Index",
            fear_greed,
            GoodDirection::Down,
            "Gauges market sentiment. Low values indicate extreme fear, \
             which often coincides with buying opportunities.",
            "#0EA5E9",
        ));
    }

    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_direction() {
        assert!(is_favorable(1.2, GoodDirection::Up));
        assert!(!is_favorable(1.0, GoodDirection::Up));
        assert!(!is_favorable(0.7, GoodDirection::Up));
    }

    #[test]
    fn test_down_direction() {
        assert!(is_favorable(25.0, GoodDirection::Down));
        assert!(!is_favorable(40.0, GoodDirection::Down));
        assert!(!is_favorable(75.0, GoodDirection::Down));
    }

    #[test]
    fn test_cards_follow_bundle_fields() {
        let mut bundle = IndicatorBundle {
            mayer_multiple: BoundedIndicator::new(1.2, 0.5, 2.4),
            fear_greed: Some(BoundedIndicator::new(25.0, 10.0, 90.0)),
            rsi: None,
            price_data: Vec::new(),
        };

        let cards = indicator_cards(&bundle);
        let ids: Vec<&str> = cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["mayerMultiple", "fearGreed"]);
        assert!(cards[0].is_favorable);
        assert!(cards[1].is_favorable);

        bundle.rsi = Some(BoundedIndicator::new(72.0, 20.0, 85.0));
        bundle.fear_greed = None;
        let cards = indicator_cards(&bundle);
        let ids: Vec<&str> = cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["mayerMultiple", "rsi"]);
        assert!(!cards[1].is_favorable);
    }

    #[test]
    fn test_card_serialization() {
        let bundle = IndicatorBundle {
            mayer_multiple: BoundedIndicator::new(0.6, 0.5, 2.4),
            fear_greed: None,
            rsi: None,
            price_data: Vec::new(),
        };
        let json = serde_json::to_string(&indicator_cards(&bundle)).unwrap();
        assert!(json.contains("\"goodDirection\":\"down\""));
        assert!(json.contains("\"isFavorable\":true"));
    }
}
