//! Diagnosis Prediction Server
//!
//! Serves pre-trained classifiers for Parkinson's disease, breast cancer and
//! heart disease over a small JSON API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  DIAGNOSIS PREDICTION                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌─────────────┐  ┌───────────────────────┐ │
//! │  │  API      │  │  Request    │  │  Inference            │ │
//! │  │  (Axum)   │─▶│  Normalizer │─▶│  (ONNX / linear)      │ │
//! │  └─────┬─────┘  └──────┬──────┘  └───────────┬───────────┘ │
//! │        └───────────────┼─────────────────────┘              │
//! │                        ▼                                    │
//! │        ┌────────────────────────────────────┐              │
//! │        │ Feature + Model Registries (RO)    │              │
//! │        └────────────────────────────────────┘              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod classifier;
mod registry;
mod normalize;
mod inference;
mod handlers;
mod error;

#[cfg(test)]
mod test_support;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::sync::Arc;

pub use error::{AppError, AppResult};

use registry::ModelRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "diagnosis_server=debug,tower_http=debug".into());
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Diagnosis Prediction Server starting...");
    tracing::info!("Model base directory: {}", config.models.base_dir.display());

    // Load models before accepting traffic
    let models = ModelRegistry::load(&config.models);
    tracing::info!(
        "{}/{} models loaded",
        models.loaded_count(),
        registry::Disease::ALL.len()
    );

    // Build application state
    let state = AppState {
        models: Arc::new(models),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = bind(&config.host, config.port).await?;
    tracing::info!("🚀 Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Shared application state, read-only once serving starts
#[derive(Clone)]
pub struct AppState {
    pub models: Arc<ModelRegistry>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index::page))
        .route("/health", get(handlers::health::check))
        .route("/models", get(handlers::models::list))
        .route("/features/:disease", get(handlers::features::get))
        .route("/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

/// Bind the listener. `host` may be a hostname or a bare IPv6 address.
async fn bind(host: &str, port: u16) -> std::io::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((host, port)).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
