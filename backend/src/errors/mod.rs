//! Global application error types and handlers.
//!
//! This module defines the error types used across the backend: the
//! two-kind taxonomy of the remote transfer session, and the application
//! error every service returns, together with its HTTP response mapping.

use adapters::AdapterError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures of a remote transfer session. No transport error crosses the
/// session boundary in any other form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Transport or authentication failure before a usable session existed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Failure during an upload or download. The session is already closed.
    #[error("Transfer failed: {0}")]
    Transfer(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Old password does not match")]
    PasswordMismatch,

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::PasswordMismatch => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Session(_) => StatusCode::BAD_GATEWAY,
            AppError::Adapter(AdapterError::Pdf(_)) => StatusCode::BAD_REQUEST,
            AppError::Adapter(AdapterError::Llm(_) | AdapterError::Http(_)) => StatusCode::BAD_GATEWAY,
            AppError::Adapter(_) | AppError::Database(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal details stay in the logs.
        let message = if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            tracing::error!(error = %self, "request failed");
            "Something went wrong. Please try again.".to_string()
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
            self.to_string()
        };

        (
            status,
            Json(json!({ "status": status.as_u16(), "message": message })),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::PasswordMismatch.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::from(SessionError::Transfer("550".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(AdapterError::Storage("disk".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn session_errors_keep_the_underlying_message() {
        let err = SessionError::Connection("Server replied 530: Login incorrect".into());
        assert_eq!(err.to_string(), "Connection failed: Server replied 530: Login incorrect");
    }
}
