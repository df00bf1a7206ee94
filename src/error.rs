//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::inference::InferenceError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Registry errors
    UnknownDisease,
    DiseaseNotFound,
    ModelUnavailable { load_error: Option<String> },

    // Model errors
    InferenceFailure(InferenceError),

    // Request errors
    BadRequest(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::UnknownDisease => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Unknown disease" }),
            ),
            AppError::DiseaseNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Unknown disease" }),
            ),
            AppError::ModelUnavailable { load_error } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Model not loaded on server", "load_error": load_error }),
            ),
            AppError::InferenceFailure(err) => {
                tracing::error!("Inference error: {}", err.trace);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": err.message, "trace": err.trace }),
                )
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": msg }),
            ),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::InferenceFailure(err)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        if !err.is_panic() {
            return AppError::InternalError(err.to_string());
        }

        // A panic inside the blocking inference task is a model failure
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "model panicked".to_string());

        AppError::InferenceFailure(InferenceError {
            trace: format!("panicked during inference: {}", message),
            message,
        })
    }
}
