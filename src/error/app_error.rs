use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// Fallback message for upstream failures that carry no detail.
pub const GENERIC_UPSTREAM_MESSAGE: &str = "Something went wrong";

#[derive(Debug)]
pub enum AppError {
    // Seat/plan validation; recoverable locally, never forwarded upstream.
    Validation(String),

    // Malformed client input.
    BadRequest(String),

    // Unknown plan id, unknown owner, and similar lookups.
    NotFound(String),

    // A concurrent upgrade is already in flight for the account.
    UpgradeInFlight,

    // The billing or repository upstream rejected or failed a call.
    // `detail` is the server-provided message, when one was present.
    Upstream { detail: Option<String> },

    // Recently-visited store errors.
    Store(redis::RedisError),

    // Everything else.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::UpgradeInFlight => write!(f, "Upgrade already in progress"),
            AppError::Upstream { detail } => write!(
                f,
                "Upstream error: {}",
                detail.as_deref().unwrap_or(GENERIC_UPSTREAM_MESSAGE)
            ),
            AppError::Store(e) => write!(f, "Store error: {}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Message suitable for a user-facing notification.
    pub fn notification_message(&self) -> String {
        match self {
            AppError::Upstream { detail } => detail
                .clone()
                .unwrap_or_else(|| GENERIC_UPSTREAM_MESSAGE.to_string()),
            AppError::Validation(msg) | AppError::BadRequest(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::UpgradeInFlight => "Upgrade already in progress".to_string(),
            _ => GENERIC_UPSTREAM_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                msg.clone(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::UpgradeInFlight => (
                StatusCode::CONFLICT,
                "UPGRADE_IN_FLIGHT",
                "Upgrade already in progress".to_string(),
            ),
            AppError::Upstream { detail } => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                detail
                    .clone()
                    .unwrap_or_else(|| GENERIC_UPSTREAM_MESSAGE.to_string()),
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "store error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Server Error".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

// From implementations for automatic conversion
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Upstream transport error: {}", err);
        AppError::Upstream { detail: None }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Store(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON parse error: {}", err))
    }
}

// Result type alias
pub type AppResult<T> = Result<T, AppError>;
