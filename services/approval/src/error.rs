//! Custom error types for the approval service
//!
//! Token-state conflicts are deliberately distinct variants: an external
//! reviewer who follows a dead link needs to know whether the decision was
//! already made (`AlreadyUsed`) or the link lapsed (`Expired`), and the two
//! lead to different advice.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::mailer::MailError;
use crate::token::TokenError;

/// Custom error type for the approval service
#[derive(Error, Debug)]
pub enum ApprovalError {
    /// Request payload failed validation
    #[error("{0}")]
    Validation(String),

    /// The action value is neither `approve` nor `reject`
    #[error("invalid action '{0}', expected 'approve' or 'reject'")]
    InvalidAction(String),

    /// No entry carries the given token (or the referenced record is gone)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The token was already consumed by an earlier decision
    #[error("approval token has already been used")]
    AlreadyUsed,

    /// The token lapsed before it was used
    #[error("approval token has expired, request a new link")]
    Expired,

    /// The approval email could not be delivered
    #[error("failed to send approval email")]
    Mail(#[from] MailError),

    /// Too many requests from one source
    #[error("too many requests, slow down")]
    RateLimited,

    /// Stored data failed to map back into a domain type
    #[error("internal error: {0}")]
    Internal(String),

    /// Database error
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl From<TokenError> for ApprovalError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::AlreadyUsed => ApprovalError::AlreadyUsed,
            TokenError::Expired => ApprovalError::Expired,
        }
    }
}

impl IntoResponse for ApprovalError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApprovalError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApprovalError::InvalidAction(action) => (
                StatusCode::BAD_REQUEST,
                format!("invalid action '{action}', expected 'approve' or 'reject'"),
            ),
            ApprovalError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{what} not found"))
            }
            ApprovalError::AlreadyUsed => (
                StatusCode::BAD_REQUEST,
                "approval token has already been used".to_string(),
            ),
            ApprovalError::Expired => (
                StatusCode::BAD_REQUEST,
                "approval token has expired, request a new link".to_string(),
            ),
            ApprovalError::Mail(e) => {
                error!("Mail delivery error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to send approval email".to_string(),
                )
            }
            ApprovalError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "too many requests, slow down".to_string(),
            ),
            ApprovalError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApprovalError::Database(e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for approval results
pub type ApprovalResult<T> = Result<T, ApprovalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_and_used_are_distinct_outcomes() {
        assert_ne!(
            ApprovalError::Expired.to_string(),
            ApprovalError::AlreadyUsed.to_string()
        );
    }

    #[test]
    fn token_errors_convert_to_their_approval_variants() {
        assert!(matches!(
            ApprovalError::from(TokenError::AlreadyUsed),
            ApprovalError::AlreadyUsed
        ));
        assert!(matches!(
            ApprovalError::from(TokenError::Expired),
            ApprovalError::Expired
        ));
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = ApprovalError::NotFound("timesheet").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflicts_map_to_bad_request() {
        assert_eq!(
            ApprovalError::AlreadyUsed.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApprovalError::Expired.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApprovalError::InvalidAction("defer".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
