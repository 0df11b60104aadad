// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::explore_repository::ExploreRepository;
use crate::infrastructure::catalog_repository::CatalogRepository;
use crate::infrastructure::config::{load_catalog_config, load_service_config, ExploreSource};
use crate::infrastructure::runtime_repository::RuntimeRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    canonical_url, explore_state, get_dashboard, health_check, list_explores, patch_dashboard,
    reset_dashboard, restore_dashboard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_service_config()?;

    // Create repository (infrastructure layer)
    let repository: Arc<dyn ExploreRepository> = match config.server.source {
        ExploreSource::Catalog => Arc::new(CatalogRepository::new(load_catalog_config()?)),
        ExploreSource::Runtime => {
            let runtime = config
                .runtime
                .ok_or_else(|| anyhow::anyhow!("[runtime] settings are required when source = \"runtime\""))?;
            Arc::new(RuntimeRepository::new(runtime.host, runtime.instance_id, runtime.token))
        }
    };

    // Create application state
    let state = Arc::new(AppState::new(repository));

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/explores", get(list_explores))
        .route("/explores/:name/state", get(explore_state))
        .route("/explores/:name/url", get(canonical_url))
        .route(
            "/explores/:name/dashboard",
            get(get_dashboard)
                .post(restore_dashboard)
                .patch(patch_dashboard)
                .delete(reset_dashboard),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind_addr.parse()?;
    tracing::info!("Starting explore-state service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
