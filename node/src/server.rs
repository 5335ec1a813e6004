// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::errors::ApiError;
use crate::events::LogWriter;
use crate::telemetry;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use kvlog_kernel::Store;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Everything a request handler may touch.
///
/// Only built once startup replay has finished, so handlers never observe a
/// partially rebuilt store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub writer: LogWriter,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/key/:key", get(get_key).put(put_key).delete(delete_key))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn put_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let value = String::from_utf8(body.to_vec())
        .map_err(|_| ApiError::InvalidInput("value must be valid UTF-8".to_string()))?;

    state.store.put(&key, &value)?;
    state.writer.write_put(&key, &value).await;

    Ok(StatusCode::CREATED)
}

async fn get_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<String, ApiError> {
    Ok(state.store.get(&key)?)
}

async fn delete_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&key)?;
    state.writer.write_delete(&key).await;

    Ok(StatusCode::OK)
}

async fn metrics_handler() -> String {
    telemetry::get_metrics()
}
