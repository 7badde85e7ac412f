//! Bundle endpoints.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::time::Duration;

use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::services::Snapshot;
use crate::types::WireBundle;
use crate::AppState;

/// Provenance and freshness of the served bundle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMeta {
    pub synthetic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub stale: bool,
    /// Unix timestamp (milliseconds) of the fetch.
    pub fetched_at: i64,
}

impl BundleMeta {
    pub fn from_snapshot(snapshot: &Snapshot, stale_after: Duration) -> Self {
        Self {
            synthetic: snapshot.origin.is_synthetic(),
            warning: snapshot.origin.warning(),
            stale: snapshot.age() > stale_after,
            fetched_at: snapshot.fetched_at.timestamp_millis(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bundle", get(get_bundle))
        .route("/api/refresh", post(refresh))
}

fn no_data() -> AppError {
    AppError::Unavailable("indicator bundle is still loading".to_string())
}

/// Latest bundle in the canonical wire schema.
async fn get_bundle(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<WireBundle, BundleMeta>>> {
    let snapshot = state.store.get_or_revalidate().await.ok_or_else(no_data)?;

    Ok(Json(ApiResponse {
        data: WireBundle::from(snapshot.bundle.as_ref()),
        meta: BundleMeta::from_snapshot(&snapshot, state.store.stale_after()),
    }))
}

/// Fetch immediately.
async fn refresh(State(state): State<AppState>) -> Result<Json<BundleMeta>> {
    let snapshot = state.store.refresh().await.ok_or_else(|| {
        AppError::Unavailable("bundle store has no subscribers".to_string())
    })?;

    Ok(Json(BundleMeta::from_snapshot(&snapshot, state.store.stale_after())))
}
