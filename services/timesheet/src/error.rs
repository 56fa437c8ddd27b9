//! Custom error types for the timesheet service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::duration::DurationError;

/// Custom error type for the timesheet service
#[derive(Error, Debug)]
pub enum TimesheetError {
    /// Request payload failed validation before any persistence
    #[error("{0}")]
    Validation(String),

    /// Duration engine rejected the entered times
    #[error("{0}")]
    Duration(#[from] DurationError),

    /// The named resource does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The entry belongs to an approved submission and is immutable
    #[error("time entry is locked: its submission has been approved")]
    Locked,

    /// The submission already carries a terminal decision
    #[error("submission has already been decided")]
    AlreadyDecided,

    /// Stored data failed to map back into a domain type
    #[error("internal error: {0}")]
    Internal(String),

    /// Database error
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for TimesheetError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            TimesheetError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            TimesheetError::Duration(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            TimesheetError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{what} not found"))
            }
            TimesheetError::Locked => (
                StatusCode::BAD_REQUEST,
                "time entry is locked: its submission has been approved".to_string(),
            ),
            TimesheetError::AlreadyDecided => (
                StatusCode::BAD_REQUEST,
                "submission has already been decided".to_string(),
            ),
            TimesheetError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            TimesheetError::Database(e) => {
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

/// Type alias for timesheet results
pub type TimesheetResult<T> = Result<T, TimesheetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let response = TimesheetError::Validation("name is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_errors_stay_distinguishable_by_message() {
        assert_ne!(
            TimesheetError::Locked.to_string(),
            TimesheetError::AlreadyDecided.to_string()
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = TimesheetError::NotFound("time entry").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn duration_errors_map_to_bad_request() {
        let response =
            TimesheetError::Duration(DurationError::NegativeBreak).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
