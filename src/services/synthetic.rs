//! Synthetic indicator bundles used when no upstream data is available.
//!
//! Values are random but the shape is fixed: 31 daily points ending today,
//! integer prices, and constant illustrative bounds.

use crate::types::{BoundedIndicator, IndicatorBundle, PricePoint, WINDOW_DAYS};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Anchor price for generated series.
pub const BASE_PRICE: f64 = 60_000.0;

/// Fraction of the base price used as the per-day noise amplitude.
const NOISE_FACTOR: f64 = 0.05;

/// Maximum shrink applied to the price to produce each average.
const SMA50_SPREAD: f64 = 0.01;
const SMA100_SPREAD: f64 = 0.02;
const SMA200_SPREAD: f64 = 0.04;

pub const SYNTHETIC_MAYER: BoundedIndicator = BoundedIndicator {
    current: 1.2,
    lowest: 0.5,
    highest: 2.4,
};

pub const SYNTHETIC_FEAR_GREED: BoundedIndicator = BoundedIndicator {
    current: 25.0,
    lowest: 10.0,
    highest: 90.0,
};

/// Produces a fallback bundle.
pub trait BundleGenerator: Send + Sync {
    fn generate(&self) -> IndicatorBundle;
}

/// Format a date as `d/m` without padding or year.
pub fn day_month_label(date: NaiveDate) -> String {
    format!("{}/{}", date.day(), date.month())
}

/// Build a synthetic bundle ending at `today`.
///
/// Noise scales with distance from today (`i + 1`), so older points wander
/// further from the base price. Each average is the same day's price shrunk
/// by an independent random factor, not a windowed mean.
pub fn synthetic_bundle<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> IndicatorBundle {
    let mut price_data = Vec::with_capacity(WINDOW_DAYS);

    for i in (0..WINDOW_DAYS as i64).rev() {
        let date = today - chrono::Duration::days(i);

        let change = BASE_PRICE * NOISE_FACTOR * (rng.gen::<f64>() - 0.5);
        let price = BASE_PRICE + change * (i + 1) as f64;

        let sma50 = price * (1.0 - SMA50_SPREAD * rng.gen::<f64>());
        let sma100 = price * (1.0 - SMA100_SPREAD * rng.gen::<f64>());
        let sma200 = price * (1.0 - SMA200_SPREAD * rng.gen::<f64>());

        price_data.push(PricePoint {
            date: day_month_label(date),
            price: price.round(),
            sma50: Some(sma50.round()),
            sma100: Some(sma100.round()),
            sma200: Some(sma200.round()),
            ema: None,
        });
    }

    IndicatorBundle {
        mayer_multiple: SYNTHETIC_MAYER,
        fear_greed: Some(SYNTHETIC_FEAR_GREED),
        rsi: None,
        price_data,
    }
}

/// Default generator backed by a seedable RNG.
pub struct RandomBundleGenerator<R = StdRng> {
    rng: Mutex<R>,
    today: Option<NaiveDate>,
}

impl RandomBundleGenerator<StdRng> {
    /// Generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic generator for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> RandomBundleGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
            today: None,
        }
    }

    /// Pin the end date of generated series.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

impl<R: Rng + Send> BundleGenerator for RandomBundleGenerator<R> {
    fn generate(&self) -> IndicatorBundle {
        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        synthetic_bundle(&mut *rng, today)
    }
}
