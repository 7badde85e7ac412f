pub mod bundle;
pub mod health;
pub mod indicators;
pub mod recommendation;

use crate::AppState;
use axum::Router;
use serde::Serialize;

/// API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T, M> {
    pub data: T,
    pub meta: M,
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(bundle::router())
        .merge(recommendation::router())
        .merge(indicators::router())
}
