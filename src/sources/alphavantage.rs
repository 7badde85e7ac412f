//! Alpha Vantage client for BTC daily closes and moving averages.
//!
//! Builds a bundle from three calls: the daily digital currency series,
//! SMA(50) and SMA(200). Responses are keyed by `YYYY-MM-DD` and aligned on
//! the price series dates. Note: the free tier allows 25 requests/day.

use crate::error::{AppError, Result};
use crate::services::indicators::{mayer_multiple, min_max, rolling_rsi, RSI_PERIOD};
use crate::services::synthetic::day_month_label;
use crate::types::{BoundedIndicator, IndicatorBundle, PricePoint, WINDOW_DAYS};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";

/// Daily digital currency response.
#[derive(Debug, Clone, Deserialize)]
pub struct DigitalCurrencyDailyResponse {
    #[serde(rename = "Time Series (Digital Currency Daily)")]
    pub time_series: Option<HashMap<String, DigitalCurrencyDay>>,
    #[serde(flatten)]
    pub notice: ApiNotice,
}

/// One day of the digital currency series.
#[derive(Debug, Clone, Deserialize)]
pub struct DigitalCurrencyDay {
    #[serde(rename = "4. close", alias = "4a. close (USD)")]
    pub close: String,
}

/// SMA technical indicator response.
#[derive(Debug, Clone, Deserialize)]
pub struct SmaResponse {
    #[serde(rename = "Technical Analysis: SMA")]
    pub analysis: Option<HashMap<String, SmaValue>>,
    #[serde(flatten)]
    pub notice: ApiNotice,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmaValue {
    #[serde(rename = "SMA")]
    pub sma: String,
}

/// Messages Alpha Vantage returns with HTTP 200 instead of data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiNotice {
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

impl ApiNotice {
    fn message(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .or(self.note.as_deref())
            .or(self.information.as_deref())
    }
}

fn parse_dated<V>(series: HashMap<String, V>, value: impl Fn(&V) -> &str) -> BTreeMap<NaiveDate, f64> {
    series
        .iter()
        .filter_map(|(date_str, v)| {
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
            let parsed = value(v).parse::<f64>().ok()?;
            Some((date, parsed))
        })
        .collect()
}

/// Align closes with SMA(50) and SMA(200) into a bundle.
///
/// Keeps the last 31 price dates. An SMA missing for a date becomes 0.
/// Fails if the price series is empty or neither SMA shares a date with
/// the window.
pub fn align_series(
    closes: &BTreeMap<NaiveDate, f64>,
    sma50: &BTreeMap<NaiveDate, f64>,
    sma200: &BTreeMap<NaiveDate, f64>,
) -> Result<IndicatorBundle> {
    if closes.is_empty() {
        return Err(AppError::Malformed("empty daily price series".to_string()));
    }

    let skip = closes.len().saturating_sub(WINDOW_DAYS);
    let window: Vec<(&NaiveDate, &f64)> = closes.iter().skip(skip).collect();

    let overlaps = window
        .iter()
        .any(|(date, _)| sma50.contains_key(*date) || sma200.contains_key(*date));
    if !overlaps {
        return Err(AppError::Misaligned(
            "no SMA values share a date with the price window".to_string(),
        ));
    }

    let price_data: Vec<PricePoint> = window
        .iter()
        .map(|(date, price)| PricePoint {
            date: day_month_label(**date),
            price: **price,
            sma50: Some(sma50.get(*date).copied().unwrap_or(0.0)),
            sma100: None,
            sma200: Some(sma200.get(*date).copied().unwrap_or(0.0)),
            ema: None,
        })
        .collect();

    let ratios: Vec<f64> = price_data
        .iter()
        .filter_map(|p| {
            let sma = p.sma200.unwrap_or(0.0);
            (sma > 0.0).then(|| mayer_multiple(p.price, sma))
        })
        .collect();

    let current_mayer = price_data
        .last()
        .map(|p| mayer_multiple(p.price, p.sma200.unwrap_or(0.0)))
        .unwrap_or(0.0);
    let (lowest_mayer, highest_mayer) = min_max(ratios).unwrap_or((current_mayer, current_mayer));

    let all_closes: Vec<f64> = closes.values().copied().collect();
    let rsi_series = rolling_rsi(&all_closes, RSI_PERIOD);
    let rsi_window = &rsi_series[rsi_series.len().saturating_sub(WINDOW_DAYS)..];
    let rsi = match (rsi_window.last(), min_max(rsi_window.iter().copied())) {
        (Some(current), Some((lo, hi))) => Some(BoundedIndicator::new(*current, lo, hi)),
        _ => None,
    };

    Ok(IndicatorBundle {
        mayer_multiple: BoundedIndicator::new(current_mayer, lowest_mayer, highest_mayer),
        fear_greed: None,
        rsi,
        price_data,
    })
}

/// Alpha Vantage API client.
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: ALPHA_VANTAGE_URL.to_string(),
        }
    }

    /// Point the client at a different host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpstreamStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Malformed(format!("Alpha Vantage response: {}", e)))
    }

    /// Daily BTC/USD closes.
    pub async fn get_daily_closes(&self) -> Result<BTreeMap<NaiveDate, f64>> {
        let data: DigitalCurrencyDailyResponse = self
            .get(&[
                ("function", "DIGITAL_CURRENCY_DAILY"),
                ("symbol", "BTC"),
                ("market", "USD"),
            ])
            .await?;

        if let Some(msg) = data.notice.message() {
            return Err(AppError::ExternalApi(msg.to_string()));
        }
        let series = data
            .time_series
            .ok_or_else(|| AppError::Malformed("no daily time series".to_string()))?;

        Ok(parse_dated(series, |d| d.close.as_str()))
    }

    /// Daily SMA of the close over `period` days.
    pub async fn get_sma(&self, period: u32) -> Result<BTreeMap<NaiveDate, f64>> {
        let period = period.to_string();
        let data: SmaResponse = self
            .get(&[
                ("function", "SMA"),
                ("symbol", "BTCUSD"),
                ("interval", "daily"),
                ("time_period", period.as_str()),
                ("series_type", "close"),
            ])
            .await?;

        if let Some(msg) = data.notice.message() {
            return Err(AppError::ExternalApi(msg.to_string()));
        }
        let analysis = data
            .analysis
            .ok_or_else(|| AppError::Malformed(format!("no SMA({}) series", period)))?;

        Ok(parse_dated(analysis, |v| v.sma.as_str()))
    }

    /// Fetch all three series and align them.
    pub async fn fetch_bundle(&self) -> Result<IndicatorBundle> {
        let (closes, sma50, sma200) =
            tokio::try_join!(self.get_daily_closes(), self.get_sma(50), self.get_sma(200))?;

        debug!(
            "Alpha Vantage returned {} closes, {} SMA(50), {} SMA(200)",
            closes.len(),
            sma50.len(),
            sma200.len()
        );

        align_series(&closes, &sma50, &sma200)
    }
}
