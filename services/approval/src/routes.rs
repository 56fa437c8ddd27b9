//! Approval service routes
//!
//! These endpoints are reachable without a login: the token in the request
//! body is the credential. Everything here is POST; the router answers 405
//! for other methods.

use axum::{
    Json, Router,
    extract::{ConnectInfo, State},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::json;
use std::net::SocketAddr;
use tracing::info;

use crate::{
    AppState,
    error::{ApprovalError, ApprovalResult},
    models::{ApprovalAction, DecideRequest, FetchRequest, SafeTimesheet, SubmitRequest},
    token,
    validation::{validate_rejection_note, validate_reviewer_email, validate_reviewer_name},
};

/// Create the router for the approval service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/timesheet/submit", post(submit_for_approval))
        .route("/timesheet/fetch-by-token", post(fetch_by_token))
        .route("/timesheet/approve", post(decide_approval))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "service": "approval-service",
        "database": database,
    }))
}

/// Issue an approval token for a time entry and email the approval link to
/// the location contact.
///
/// The token is committed before the email goes out: when the send fails
/// the caller gets a delivery error, the entry stays client-pending, and
/// submitting again issues a fresh token (superseding this one) for the
/// retry email.
pub async fn submit_for_approval(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> ApprovalResult<impl IntoResponse> {
    let time_entry_id = payload
        .time_entry_id
        .ok_or_else(|| ApprovalError::Validation("Missing time_entry_id".to_string()))?;

    let entry = state
        .approval_repository
        .find_entry_by_id(time_entry_id)
        .await?
        .ok_or(ApprovalError::NotFound("timesheet"))?;

    let contact = state
        .approval_repository
        .location_contact(entry.location_id)
        .await?
        .ok_or(ApprovalError::NotFound("location"))?;

    let token_value = token::generate_token();
    let expires_at = Utc::now() + state.token_ttl;
    state
        .approval_repository
        .issue_token(entry.id, &token_value, expires_at)
        .await?;

    info!("Issued approval token for time entry {}", entry.id);

    let approval_url = state.mailer.approval_url(&token_value);
    state
        .mailer
        .send_approval_request(
            &contact.contact_email,
            &approval_url,
            state.token_ttl.num_hours(),
        )
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// Look up the reviewable subset of a timesheet by its approval token
pub async fn fetch_by_token(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<FetchRequest>,
) -> ApprovalResult<impl IntoResponse> {
    if !state.rate_limiter.is_allowed(&addr.ip().to_string()).await {
        return Err(ApprovalError::RateLimited);
    }

    let token_value = payload
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApprovalError::Validation("Missing token".to_string()))?;

    let entry = state
        .approval_repository
        .find_entry_by_token(token_value)
        .await?
        .ok_or(ApprovalError::NotFound("timesheet"))?;

    let (used, expires_at) = match (entry.used, entry.expires_at) {
        (Some(used), Some(expires_at)) => (used, expires_at),
        _ => {
            return Err(ApprovalError::Internal(
                "approval columns out of sync for time entry".to_string(),
            ));
        }
    };
    token::validate(used, expires_at, Utc::now())?;

    Ok(Json(json!({ "timesheet": SafeTimesheet::from(&entry) })))
}

/// Apply the external reviewer's decision and consume the token.
///
/// Token validity is re-checked inside the store's conditional update, not
/// just here, so a decision that races another one loses cleanly with
/// "already used".
pub async fn decide_approval(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<DecideRequest>,
) -> ApprovalResult<impl IntoResponse> {
    if !state.rate_limiter.is_allowed(&addr.ip().to_string()).await {
        return Err(ApprovalError::RateLimited);
    }

    let token_value = payload
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApprovalError::Validation("Missing token".to_string()))?;
    let action_value = payload
        .action
        .as_deref()
        .ok_or_else(|| ApprovalError::Validation("Missing action".to_string()))?;
    let name = payload
        .name
        .as_deref()
        .ok_or_else(|| ApprovalError::Validation("Missing reviewer name".to_string()))?;
    let email = payload
        .email
        .as_deref()
        .ok_or_else(|| ApprovalError::Validation("Missing reviewer email".to_string()))?;

    let action: ApprovalAction = action_value
        .parse()
        .map_err(|_| ApprovalError::InvalidAction(action_value.to_string()))?;

    validate_reviewer_name(name).map_err(ApprovalError::Validation)?;
    validate_reviewer_email(email).map_err(ApprovalError::Validation)?;

    let note = match action {
        ApprovalAction::Approve => None,
        ApprovalAction::Reject => {
            let note = payload.note.as_deref().unwrap_or("");
            validate_rejection_note(note).map_err(ApprovalError::Validation)?;
            Some(note.trim())
        }
    };

    let entry = state
        .approval_repository
        .decide(token_value, action, name.trim(), email, note)
        .await?;

    info!(
        "Time entry {} moved to {} by external reviewer",
        entry.id, entry.status
    );

    Ok(Json(json!({ "success": true, "status": entry.status })))
}
