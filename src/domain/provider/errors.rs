//! Webhook error types for provider webhook handling.
//!
//! Maps every failure to the HTTP status the provider sees. Business outcomes
//! (declined calls, unknown events, billing trouble) are not errors and are
//! acknowledged with 200.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// A secret is configured but the delivery carries no signature header.
    #[error("Missing signature")]
    MissingSignature,

    /// Signature does not match the raw body.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Body is not valid JSON or does not match the event shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Call record store failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the provider should redeliver the event.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Database(_))
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// - 401: authentication failed, nothing was parsed
    /// - 500: malformed payload or storage failure
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::ParseError(_)
            | WebhookError::MissingField(_)
            | WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            WebhookError::MissingSignature => "MISSING_SIGNATURE",
            WebhookError::InvalidSignature => "INVALID_SIGNATURE",
            WebhookError::ParseError(_) => "MALFORMED_PAYLOAD",
            WebhookError::MissingField(_) => "MALFORMED_PAYLOAD",
            WebhookError::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        WebhookError::ParseError(err.to_string())
    }
}
