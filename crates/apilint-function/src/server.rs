//! Custom handler HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use apilint::{LintEngine, Pipeline};
use apilint_telemetry::log_listening;

use crate::router::create_router;

/// Server configuration.
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
}

/// Serve trigger invocations until the process is told to stop.
pub async fn run<E>(config: ServerConfig, pipeline: Pipeline<E>) -> anyhow::Result<()>
where
    E: LintEngine + 'static,
{
    let app = create_router(Arc::new(pipeline));

    let listener = TcpListener::bind(config.listen_addr).await?;
    log_listening!(address = %config.listen_addr, "custom handler listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
