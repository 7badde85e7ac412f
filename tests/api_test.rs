//! HTTP API tests driven through the router.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use bitsignal::config::Config;
use bitsignal::services::{
    BundleStore, ClassifierRule, DataProvider, FixedPicker, RandomBundleGenerator, SignalClassifier,
    Subscription,
};
use bitsignal::sources::{http_client, BundleSource, RemoteBundleClient};
use bitsignal::types::RecommendationLabel;
use bitsignal::{api, AppState};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn test_store() -> Arc<BundleStore> {
    let client = http_client(Duration::from_secs(2)).unwrap();
    let provider = DataProvider::with_generator(
        BundleSource::Remote(RemoteBundleClient::new(client, common::UNREACHABLE_URL)),
        Arc::new(RandomBundleGenerator::seeded(5)),
    );
    BundleStore::new(provider, Duration::from_secs(3600), Duration::from_secs(120))
}

fn app(store: Arc<BundleStore>) -> axum::Router {
    app_with_config(store, Config::default())
}

fn app_with_config(store: Arc<BundleStore>, config: Config) -> axum::Router {
    let classifier = SignalClassifier::with_picker(
        ClassifierRule::Trend,
        Box::new(FixedPicker(RecommendationLabel::Wait)),
    );
    api::router().with_state(AppState::new(Arc::new(config), store, classifier))
}

async fn loaded_store() -> (Arc<BundleStore>, Subscription) {
    let store = test_store();
    let mut updates = store.updates();
    let sub = store.subscribe();
    tokio::time::timeout(Duration::from_secs(5), updates.recv())
        .await
        .unwrap()
        .unwrap();
    (store, sub)
}

async fn call(app: axum::Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// =========================================================================
// Before any data
// =========================================================================

#[tokio::test]
async fn test_health() {
    let (status, body) = call(app(test_store()), Method::GET, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["source"], "remote");
    assert_eq!(body["hasBundle"], false);
    assert_eq!(body["refreshing"], false);
}

#[tokio::test]
async fn test_health_reports_configured_timings() {
    let config = Config {
        refresh_interval: Duration::from_secs(42),
        stale_after: Duration::from_secs(7),
        ..Config::default()
    };
    let (_, body) = call(app_with_config(test_store(), config), Method::GET, "/api/health").await;
    assert_eq!(body["refreshIntervalSecs"], 42);
    assert_eq!(body["staleAfterSecs"], 7);
}

#[tokio::test]
async fn test_health_after_first_bundle() {
    let (store, _sub) = loaded_store().await;
    let (_, body) = call(app(store), Method::GET, "/api/health").await;
    assert_eq!(body["hasBundle"], true);
    assert_eq!(body["refreshing"], true);
}

#[tokio::test]
async fn test_bundle_unavailable_before_first_fetch() {
    let (status, body) = call(app(test_store()), Method::GET, "/api/bundle").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], 503);
}

#[tokio::test]
async fn test_recommendation_loading_before_first_fetch() {
    let (status, body) = call(app(test_store()), Method::GET, "/api/recommendation").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "loading");
    assert_eq!(body["synthetic"], false);
}

#[tokio::test]
async fn test_override_wins_before_first_fetch() {
    let (_, body) = call(app(test_store()), Method::GET, "/api/recommendation?force=sell").await;
    assert_eq!(body["label"], "sell");
}

#[tokio::test]
async fn test_refresh_without_subscribers_is_unavailable() {
    let (status, _) = call(app(test_store()), Method::POST, "/api/refresh").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// =========================================================================
// With a synthetic bundle loaded
// =========================================================================

#[tokio::test]
async fn test_bundle_reports_synthetic_origin() {
    let (store, _sub) = loaded_store().await;
    let (status, body) = call(app(store), Method::GET, "/api/bundle").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["schemaVersion"], 1);
    assert_eq!(body["data"]["priceData"].as_array().unwrap().len(), 31);
    assert_eq!(body["data"]["lowestMayer"], 0.5);
    assert_eq!(body["meta"]["synthetic"], true);
    assert_eq!(body["meta"]["stale"], false);
    assert!(body["meta"]["warning"].as_str().unwrap().contains("simulated"));
}

#[tokio::test]
async fn test_recommendation_is_a_decision() {
    let (store, _sub) = loaded_store().await;
    let (status, body) = call(app(store), Method::GET, "/api/recommendation").await;

    assert_eq!(status, StatusCode::OK);
    let label = body["label"].as_str().unwrap();
    assert!(["buy", "wait", "sell"].contains(&label), "got {}", label);
    assert_eq!(body["rule"], "trend");
    assert_eq!(body["synthetic"], true);
}

#[tokio::test]
async fn test_invalid_override_is_bad_request() {
    let (store, _sub) = loaded_store().await;
    let (status, body) = call(app(store), Method::GET, "/api/recommendation?force=hodl").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("hodl"));
}

#[tokio::test]
async fn test_indicator_cards() {
    let (store, _sub) = loaded_store().await;
    let (status, body) = call(app(store), Method::GET, "/api/indicators").await;

    assert_eq!(status, StatusCode::OK);
    let cards = body["data"].as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["id"], "mayerMultiple");
    assert_eq!(cards[0]["isFavorable"], true);
    assert_eq!(cards[1]["id"], "fearGreed");
    assert_eq!(cards[1]["current"], 25.0);
    assert_eq!(cards[1]["isFavorable"], true);
}

#[tokio::test]
async fn test_manual_refresh() {
    let (store, _sub) = loaded_store().await;
    let before = store.current().await.unwrap().fetched_at;

    let (status, body) = call(app(store.clone()), Method::POST, "/api/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["synthetic"], true);
    assert!(store.current().await.unwrap().fetched_at >= before);
}
