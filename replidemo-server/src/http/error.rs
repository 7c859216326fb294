//! API error type with IntoResponse
//!
//! Every failure leaves the server as `{"error": "..."}`. Store errors carry
//! the database's own message so a replica's write rejection reaches the page
//! unchanged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::compare::CompareError;
use crate::db::StoreError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Request body could not be parsed (400)
    BadRequest { message: String },

    /// Query against the selected handle failed (500)
    Store(StoreError),

    /// Strict comparison failed (500)
    Compare(CompareError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Store(e) if e.is_write_rejected() => {
                // Expected when writing to a replica
                tracing::info!("Write rejected: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            Self::Store(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            Self::Compare(e) => {
                tracing::error!("Compare error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<CompareError> for ApiError {
    fn from(e: CompareError) -> Self {
        Self::Compare(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_is_400() {
        let err = ApiError::BadRequest {
            message: "expected value".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "expected value");
    }

    #[tokio::test]
    async fn write_rejected_is_500_with_database_message() {
        let err = ApiError::from(StoreError::WriteRejected {
            message: "cannot execute INSERT in a read-only transaction".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"],
            "cannot execute INSERT in a read-only transaction"
        );
    }

    #[tokio::test]
    async fn unavailable_is_500() {
        let err = ApiError::from(StoreError::Unavailable("connection refused".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }
}
