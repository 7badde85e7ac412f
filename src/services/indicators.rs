//! Indicator math over daily closes.

/// Default RSI lookback.
pub const RSI_PERIOD: usize = 14;

/// Relative Strength Index with Wilder smoothing.
///
/// Returns `None` when there are fewer than `period + 1` closes.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);

    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let mut avg_gain: f64 = gains.iter().take(period).sum::<f64>() / period as f64;
    let mut avg_loss: f64 = losses.iter().take(period).sum::<f64>() / period as f64;

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// RSI at every index from `period` onward, in one Wilder pass.
///
/// Element `k` equals `rsi(&closes[..period + 1 + k], period)`.
pub fn rolling_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period + 1 {
        return Vec::new();
    }

    let split = |pair: &[f64]| {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        }
    };
    let from_averages = |avg_gain: f64, avg_loss: f64| {
        if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        }
    };

    let mut changes = closes.windows(2).map(split);
    let (gain_sum, loss_sum) = changes
        .by_ref()
        .take(period)
        .fold((0.0, 0.0), |(g, l), (gain, loss)| (g + gain, l + loss));
    let mut avg_gain = gain_sum / period as f64;
    let mut avg_loss = loss_sum / period as f64;

    let mut out = Vec::with_capacity(closes.len() - period);
    out.push(from_averages(avg_gain, avg_loss));

    for (gain, loss) in changes {
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        out.push(from_averages(avg_gain, avg_loss));
    }

    out
}

/// Price over its 200-day SMA, or 0 when the SMA is unknown.
pub fn mayer_multiple(price: f64, sma200: f64) -> f64 {
    if sma200 > 0.0 {
        price / sma200
    } else {
        0.0
    }
}

/// Min and max of a series, or `None` if empty.
pub fn min_max(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uptrend(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64 * 1.5).collect()
    }

    fn downtrend(count: usize) -> Vec<f64> {
        (0..count).map(|i| 200.0 - i as f64 * 1.5).collect()
    }

    #[test]
    fn test_rsi_insufficient_data() {
        assert!(rsi(&uptrend(14), RSI_PERIOD).is_none());
        assert!(rsi(&uptrend(15), RSI_PERIOD).is_some());
    }

    #[test]
    fn test_rsi_pure_uptrend_is_100() {
        assert_eq!(rsi(&uptrend(31), RSI_PERIOD), Some(100.0));
    }

    #[test]
    fn test_rsi_downtrend_low() {
        let value = rsi(&downtrend(31), RSI_PERIOD).unwrap();
        assert!(value < 30.0, "RSI in downtrend should be low, got {}", value);
    }

    #[test]
    fn test_rsi_range() {
        let closes: Vec<f64> = (0..40)
            .map(|i| {
                let step = if i % 3 == 0 { -2.0 } else { 1.5 };
                100.0 + step * i as f64
            })
            .collect();
        let value = rsi(&closes, RSI_PERIOD).unwrap();
        assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn test_rolling_rsi_length() {
        assert_eq!(rolling_rsi(&uptrend(31), RSI_PERIOD).len(), 31 - RSI_PERIOD);
        assert!(rolling_rsi(&uptrend(10), RSI_PERIOD).is_empty());
    }

    #[test]
    fn test_rolling_rsi_matches_pointwise_rsi() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 8.0 + i as f64 * 0.1)
            .collect();
        let rolling = rolling_rsi(&closes, RSI_PERIOD);

        assert_eq!(rolling.len(), closes.len() - RSI_PERIOD);
        for (k, value) in rolling.iter().enumerate() {
            let expected = rsi(&closes[..RSI_PERIOD + 1 + k], RSI_PERIOD).unwrap();
            assert!((value - expected).abs() < 1e-9, "index {}: {} vs {}", k, value, expected);
        }
    }

    #[test]
    fn test_mayer_multiple() {
        assert_eq!(mayer_multiple(120.0, 100.0), 1.2);
        assert_eq!(mayer_multiple(120.0, 0.0), 0.0);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max([3.0, 1.0, 2.0]), Some((1.0, 3.0)));
        assert_eq!(min_max(Vec::<f64>::new()), None);
    }
}
