//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use domain::OrderError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Malformed or missing required input fields.
    Validation(String),
    /// Domain logic error.
    Order(OrderError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, field_errors) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), Some(msg)),
            ApiError::Order(err) => {
                let (status, message) = order_error_to_response(err);
                (status, message, None)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None)
            }
        };

        let mut body = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "status": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Unknown"),
            "message": message,
        });
        if let Some(detail) = field_errors {
            body["errors"] = serde_json::json!({ "body": detail });
        }

        (status, axum::Json(body)).into_response()
    }
}

fn order_error_to_response(err: OrderError) -> (StatusCode, String) {
    match &err {
        OrderError::OrderNotFound(_)
        | OrderError::CustomerNotFound(_)
        | OrderError::ProductsNotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        OrderError::EmptyProducts | OrderError::InvalidTransition { .. } => {
            (StatusCode::CONFLICT, err.to_string())
        }
        OrderError::CreatedAtInFuture(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        OrderError::Store(StoreError::Integrity(_)) => (StatusCode::BAD_REQUEST, err.to_string()),
        OrderError::Store(_) => {
            tracing::error!(error = %err, "store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}
