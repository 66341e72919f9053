pub mod cli;
pub mod context;
pub mod store;
pub mod web;

use anyhow::Context as _;
use opsboard_core::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;

pub use context::Workspace;
pub use web::{create_router, AppState};

/// Load state from the configured store and serve the API until shutdown.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;
    let store = store::open_store(&config)?;
    let workspace = Arc::new(Workspace::load(store).await?);
    let bind_address = config.bind_address;

    let state = Arc::new(AppState {
        workspace,
        config: Arc::new(config),
    });
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    tracing::info!("Listening on {}", bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
