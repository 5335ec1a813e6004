// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry() {
    // 1. Tracing (Logs)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "kvlog_node=debug,kvlog_persistence=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Metrics (Prometheus)
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROM_HANDLE.set(handle).is_err() {
                tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
            }
        }
        Err(e) => tracing::warn!("Failed to install Prometheus recorder: {}", e),
    }

    metrics::describe_counter!("kvlog_events_appended_total", "Events persisted by the transaction log pump");
    metrics::describe_counter!("kvlog_append_failures_total", "Append failures (each one halts the pump)");
    metrics::describe_counter!("kvlog_events_dropped_total", "Events enqueued after the pump halted");
    metrics::describe_counter!("kvlog_events_replayed_total", "Events applied to the store during startup replay");
    metrics::describe_histogram!("kvlog_replay_duration_seconds", "Time taken to replay the transaction log");
    metrics::describe_gauge!("kvlog_log_healthy", "1 while the transaction log pump is persisting writes");

    metrics::gauge!("kvlog_node_up", 1.0);
}

/// Get the Prometheus handle to render metrics
pub fn get_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}
