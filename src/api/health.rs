use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Liveness plus a coarse view of the bundle store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub source: &'static str,
    pub has_bundle: bool,
    pub refreshing: bool,
    pub refresh_interval_secs: u64,
    pub stale_after_secs: u64,
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        source: state.store.source_name(),
        has_bundle: state.store.current().await.is_some(),
        refreshing: state.store.is_refreshing_periodically(),
        refresh_interval_secs: state.config.refresh_interval.as_secs(),
        stale_after_secs: state.config.stale_after.as_secs(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
