pub mod error;
pub mod handlers;
mod router;
pub mod types;

pub use router::build_router;
pub use types::{AppState, ServerConfig, SharedState};

use anyhow::Context;
use tracing::info;

/// Bind and serve until ctrl-c.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.docs).with_context(|| {
        format!(
            "failed to create document root {}",
            config.docs.to_string_lossy()
        )
    })?;
    let addr = config.parse_addr()?;
    let state = AppState::new(config.docs.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(docs = %config.docs.display(), "serving at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("ctrl-c received, shutting down");
}
