//! Recommendation endpoint.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::types::RecommendationLabel;
use crate::AppState;

/// Query parameters for the recommendation endpoint.
#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    /// Override label: buy, wait, sell, loading.
    pub force: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub label: RecommendationLabel,
    pub description: &'static str,
    pub rule: &'static str,
    pub synthetic: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/recommendation", get(get_recommendation))
}

async fn get_recommendation(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationResponse>> {
    let force = match query.force.as_deref() {
        Some(raw) => Some(RecommendationLabel::from_str(raw).ok_or_else(|| {
            AppError::BadRequest(format!("unknown recommendation label '{}'", raw))
        })?),
        None => None,
    };

    let snapshot = state.store.get_or_revalidate().await;
    let is_loading = state.store.is_loading().await;

    let label = state.classifier.classify(
        snapshot.as_ref().map(|s| s.bundle.as_ref()),
        is_loading,
        force,
    );

    Ok(Json(RecommendationResponse {
        label,
        description: label.description(),
        rule: state.classifier.rule().as_str(),
        synthetic: snapshot
            .as_ref()
            .map(|s| s.origin.is_synthetic())
            .unwrap_or(false),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parsing() {
        let query: RecommendationQuery = serde_urlencoded::from_str("force=sell").unwrap();
        assert_eq!(query.force.as_deref(), Some("sell"));

        let query: RecommendationQuery = serde_urlencoded::from_str("").unwrap();
        assert!(query.force.is_none());
    }

    #[test]
    fn test_response_serialization() {
        let response = RecommendationResponse {
            label: RecommendationLabel::Wait,
            description: RecommendationLabel::Wait.description(),
            rule: "trend",
            synthetic: true,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"label\":\"wait\""));
        assert!(json.contains("\"synthetic\":true"));
    }
}
