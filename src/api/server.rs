// Server lifecycle: bind, serve, stop on Ctrl-C

use crate::api::{create_router, AppState};
use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Serve the API until a shutdown signal arrives
pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("[API] listening on http://{}/api", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("[API] server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("[API] shutdown signal received, stopping server..."),
        Err(e) => {
            warn!("[API] cannot listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
