// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::Context;
use kvlog_kernel::Store;
use kvlog_node::config::NodeConfig;
use kvlog_node::events::watch_errors;
use kvlog_node::recovery;
use kvlog_node::server::{build_router, AppState};
use kvlog_node::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();

    let cfg = NodeConfig::from_env()?;
    tracing::info!("Initializing kvlog node with config: {:?}", cfg);

    let backend = cfg
        .open_backend()
        .with_context(|| format!("failed to create event logger at {:?}", cfg.log_path))?;

    // Nothing is served until replay has rebuilt the store.
    let store = Arc::new(Store::new());
    let mut logger = recovery::initialize(&store, backend, cfg.queue_capacity).await?;

    if let Some(errors) = logger.errors() {
        tokio::spawn(watch_errors(errors));
    }

    let app = build_router(AppState {
        store,
        writer: logger.writer(),
    });

    let listener = TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;
    tracing::info!("Listening on {}", cfg.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped. Draining transaction log queue...");
    logger.shutdown().await?;
    tracing::info!("Transaction log closed");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
