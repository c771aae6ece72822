// Main entry point - Dependency injection, update scheduling and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::sensor_store::SensorStore;
use crate::application::update_service::UpdateService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::conso_client::ConsoApiClient;
use crate::presentation::app_state::AppState;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("linky_energy=info,tower_http=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Load configuration
    let cfg = load_app_config().context("Failed to load configuration")?;
    let account = Arc::new(cfg.account_context());
    tracing::info!(?account, "Linky configuration loaded");

    // Create repository (infrastructure layer)
    let repository = Arc::new(ConsoApiClient::new(&cfg.api)?);

    // Create store and update service (application layer)
    let store = Arc::new(SensorStore::new());
    let update_service = Arc::new(UpdateService::new(
        repository,
        account,
        store,
        cfg.update.failure_policy,
    ));

    // Log every applied update
    let mut updates = update_service.subscribe();
    tokio::spawn(async move {
        while updates.recv().await.is_ok() {
            tracing::debug!("linky_update");
        }
    });

    // First cycle runs immediately, then every interval
    tokio::spawn(update_service.clone().run_periodic(cfg.update.interval()));

    // Build router (presentation layer)
    let state = Arc::new(AppState::new(update_service));
    let router = presentation::router(state);

    // Start server
    let addr: SocketAddr = cfg
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("invalid server.bind_addr '{}'", cfg.server.bind_addr))?;
    tracing::info!(%addr, "Starting linky-energy service");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
