use axum::Router;
use bitsignal::config::Config;
use bitsignal::services::SignalClassifier;
use bitsignal::{api, build_store, AppState};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bitsignal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env());
    info!(
        "Starting bitsignal on {}:{} (source: {:?}, rule: {})",
        config.host,
        config.port,
        config.source,
        config.classifier_rule.as_str()
    );

    let store = build_store(&config).await?;

    // Held for the server's lifetime; dropping it stops the refresh timer.
    let subscription = store.subscribe();

    let state = AppState::new(
        config.clone(),
        store.clone(),
        SignalClassifier::new(config.classifier_rule),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("bitsignal listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;

    drop(subscription);
    Ok(())
}
