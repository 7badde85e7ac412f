//! Shared helpers for integration tests.
#![allow(dead_code)]

use axum::Router;
use serde_json::{json, Value};

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A URL nothing listens on.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1/bitcoin";

/// Flat-schema bundle body with two price points.
pub fn flat_bundle(mayer: f64) -> Value {
    json!({
        "mayerMultiple": mayer,
        "lowestMayer": 0.5,
        "highestMayer": 2.4,
        "fearGreedIndex": 15,
        "lowestFearGreed": 10,
        "highestFearGreed": 90,
        "priceData": [
            { "date": "1/6", "price": 90.0, "sma50": 92.0, "sma100": 93.0, "sma200": 95.0 },
            { "date": "2/6", "price": 100.0, "sma50": 96.0, "sma100": 95.0, "sma200": 95.0 }
        ]
    })
}
