use axum::{extract::State, routing::get, Json, Router};

use crate::api::bundle::BundleMeta;
use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::services::{indicator_cards, IndicatorCard};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/indicators", get(get_indicators))
}

async fn get_indicators(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<IndicatorCard>, BundleMeta>>> {
    let snapshot = state
        .store
        .get_or_revalidate()
        .await
        .ok_or_else(|| AppError::Unavailable("indicator bundle is still loading".to_string()))?;

    Ok(Json(ApiResponse {
        data: indicator_cards(&snapshot.bundle),
        meta: BundleMeta::from_snapshot(&snapshot, state.store.stale_after()),
    }))
}
