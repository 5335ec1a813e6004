// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kvlog_kernel::KernelError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Store error: {0}")]
    Store(#[from] KernelError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Store(k_err) => match k_err {
                KernelError::NoSuchKey => (StatusCode::NOT_FOUND, k_err.to_string()),
                KernelError::EmptyKey | KernelError::InvalidEventType(_) => {
                    (StatusCode::BAD_REQUEST, k_err.to_string())
                }
                KernelError::OutOfSequence { .. } | KernelError::Poisoned => {
                    tracing::error!("Store failure while serving request: {}", k_err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
                }
            },
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
