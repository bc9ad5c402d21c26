//! Webhook error types for payment gateway handling.
//!
//! Defines all error conditions that can occur while processing an
//! inbound payment confirmation, with HTTP status code mapping and
//! retryability semantics.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is outside the 180-second freshness window.
    #[error("Stale timestamp")]
    StaleTimestamp,

    /// Failed to parse the webhook payload or a signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Payment amount matches no recognized plan bracket.
    #[error("Unrecognized payment amount: {0}")]
    InvalidAmount(i64),

    /// The user identifier in the payload is not a well-formed reference.
    #[error("Malformed user id: {0}")]
    MalformedUserId(String),

    /// No user exists for the referenced identifier.
    #[error("User not found")]
    UserNotFound,

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the gateway should retry delivering this webhook.
    ///
    /// Only transient infrastructure failures qualify; everything else
    /// would fail identically on redelivery.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Database(_))
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// Status codes drive gateway retry behavior:
    /// - 2xx: event acknowledged, no retry
    /// - 4xx: client error, no retry
    /// - 5xx: server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Replay/forgery defenses - reject without mutation
            WebhookError::InvalidSignature | WebhookError::StaleTimestamp => {
                StatusCode::UNAUTHORIZED
            }

            // Malformed input - no point retrying
            WebhookError::ParseError(_)
            | WebhookError::MissingField(_)
            | WebhookError::InvalidAmount(_)
            | WebhookError::MalformedUserId(_) => StatusCode::BAD_REQUEST,

            // Unknown reference
            WebhookError::UserNotFound => StatusCode::NOT_FOUND,

            // Transient - gateway will retry
            WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_signature_returns_unauthorized() {
        assert_eq!(
            WebhookError::InvalidSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn stale_timestamp_returns_unauthorized() {
        assert_eq!(
            WebhookError::StaleTimestamp.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn parse_error_returns_bad_request() {
        let err = WebhookError::ParseError("bad json".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_amount_returns_bad_request() {
        assert_eq!(
            WebhookError::InvalidAmount(4999).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn malformed_user_id_returns_bad_request() {
        let err = WebhookError::MalformedUserId("abc".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn user_not_found_returns_not_found() {
        assert_eq!(
            WebhookError::UserNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn database_error_returns_internal_error() {
        let err = WebhookError::Database("connection lost".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn only_database_errors_are_retryable() {
        assert!(WebhookError::Database("timeout".to_string()).is_retryable());
        assert!(!WebhookError::InvalidSignature.is_retryable());
        assert!(!WebhookError::StaleTimestamp.is_retryable());
        assert!(!WebhookError::InvalidAmount(1).is_retryable());
        assert!(!WebhookError::UserNotFound.is_retryable());
        assert!(!WebhookError::MalformedUserId("abc".to_string()).is_retryable());
    }

    #[test]
    fn errors_display_their_context() {
        assert_eq!(
            format!("{}", WebhookError::MissingField("amount")),
            "Missing field: amount"
        );
        assert_eq!(
            format!("{}", WebhookError::InvalidAmount(250)),
            "Unrecognized payment amount: 250"
        );
    }
}
