//! Timesheet service routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{TimesheetError, TimesheetResult},
    models::{
        NewClient, NewLocation, NewTechnician, UpdateClient, UpdateLocation, UpdateTechnician,
        submission::{DecisionRequest, NewJobSubmission, SubmissionFilter},
        time_entry::{NewTimeEntry, TimeEntryFilter, TimeEntryResponse, UpdateTimeEntry},
    },
    state::AppState,
};

/// Advisory message returned alongside entries that exceed the sanity
/// ceiling under the warn policy
const EXCESSIVE_DURATION_WARNING: &str =
    "calculated work duration is over 48 hours, check the entered times";

/// Create the router for the timesheet service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/time-entries", post(create_time_entry))
        .route("/time-entries", get(list_time_entries))
        .route("/time-entries/:id", get(get_time_entry))
        .route("/time-entries/:id", put(update_time_entry))
        .route("/time-entries/:id", delete(delete_time_entry))
        .route("/submissions", post(create_submission))
        .route("/submissions", get(list_submissions))
        .route("/submissions/:id", get(get_submission))
        .route("/submissions/:id/entries", get(get_submission_entries))
        .route("/submissions/:id/decision", post(decide_submission))
        .route("/clients", post(create_client))
        .route("/clients", get(list_clients))
        .route("/clients/:id", get(get_client))
        .route("/clients/:id", put(update_client))
        .route("/clients/:id", delete(delete_client))
        .route("/locations", post(create_location))
        .route("/locations", get(list_locations))
        .route("/locations/:id", get(get_location))
        .route("/locations/:id", put(update_location))
        .route("/locations/:id", delete(delete_location))
        .route("/technicians", post(create_technician))
        .route("/technicians", get(list_technicians))
        .route("/technicians/:id", get(get_technician))
        .route("/technicians/:id", put(update_technician))
        .route("/technicians/:id", delete(delete_technician))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "service": "timesheet-service",
        "database": database,
    }))
}

/// Log a new time entry
pub async fn create_time_entry(
    State(state): State<AppState>,
    Json(payload): Json<NewTimeEntry>,
) -> TimesheetResult<impl IntoResponse> {
    let (entry, excessive) = state.time_entry_repository.create(&payload).await?;

    let response = TimeEntryResponse {
        entry,
        warning: excessive.then(|| EXCESSIVE_DURATION_WARNING.to_string()),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// List time entries with optional filters and ordering
pub async fn list_time_entries(
    State(state): State<AppState>,
    Query(filter): Query<TimeEntryFilter>,
) -> TimesheetResult<impl IntoResponse> {
    let entries = state.time_entry_repository.query(&filter).await?;
    Ok(Json(entries))
}

/// Get a time entry by ID
pub async fn get_time_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> TimesheetResult<impl IntoResponse> {
    let entry = state
        .time_entry_repository
        .find_by_id(id)
        .await?
        .ok_or(TimesheetError::NotFound("time entry"))?;

    Ok(Json(entry))
}

/// Update a time entry; times and break are revalidated and the duration
/// recomputed
pub async fn update_time_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTimeEntry>,
) -> TimesheetResult<impl IntoResponse> {
    let (entry, excessive) = state.time_entry_repository.update(id, &payload).await?;

    let response = TimeEntryResponse {
        entry,
        warning: excessive.then(|| EXCESSIVE_DURATION_WARNING.to_string()),
    };
    Ok(Json(response))
}

/// Delete a time entry
pub async fn delete_time_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> TimesheetResult<impl IntoResponse> {
    state.time_entry_repository.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

/// Submit a day's work for internal review
pub async fn create_submission(
    State(state): State<AppState>,
    Json(payload): Json<NewJobSubmission>,
) -> TimesheetResult<impl IntoResponse> {
    let submission = state.submission_repository.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// List submissions, most recent first
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(filter): Query<SubmissionFilter>,
) -> TimesheetResult<impl IntoResponse> {
    let submissions = state.submission_repository.list(&filter).await?;
    Ok(Json(submissions))
}

/// Get a submission by ID
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> TimesheetResult<impl IntoResponse> {
    let submission = state
        .submission_repository
        .find_by_id(id)
        .await?
        .ok_or(TimesheetError::NotFound("submission"))?;

    Ok(Json(submission))
}

/// List the time entries associated with a submission (same technician,
/// client, location and day)
pub async fn get_submission_entries(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> TimesheetResult<impl IntoResponse> {
    let submission = state
        .submission_repository
        .find_by_id(id)
        .await?
        .ok_or(TimesheetError::NotFound("submission"))?;

    let entries = state
        .time_entry_repository
        .list_for_submission(&submission)
        .await?;
    Ok(Json(entries))
}

/// Apply an administrator decision to a pending submission
pub async fn decide_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecisionRequest>,
) -> TimesheetResult<impl IntoResponse> {
    let submission = state
        .submission_repository
        .decide(id, payload.decision)
        .await?;
    Ok(Json(submission))
}

/// Create a new client
pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<NewClient>,
) -> TimesheetResult<impl IntoResponse> {
    if payload.name.trim().is_empty() {
        return Err(TimesheetError::Validation(
            "client name is required".to_string(),
        ));
    }

    let client = state.client_repository.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// List all clients
pub async fn list_clients(State(state): State<AppState>) -> TimesheetResult<impl IntoResponse> {
    let clients = state.client_repository.list().await?;
    Ok(Json(clients))
}

/// Get a client by ID
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> TimesheetResult<impl IntoResponse> {
    let client = state
        .client_repository
        .find_by_id(id)
        .await?
        .ok_or(TimesheetError::NotFound("client"))?;

    Ok(Json(client))
}

/// Update a client
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClient>,
) -> TimesheetResult<impl IntoResponse> {
    let client = state.client_repository.update(id, &payload).await?;
    Ok(Json(client))
}

/// Delete a client
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> TimesheetResult<impl IntoResponse> {
    state.client_repository.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

/// Query parameters for listing locations
#[derive(Debug, Deserialize)]
pub struct LocationListParams {
    pub client_id: Option<Uuid>,
}

/// Create a new location
pub async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<NewLocation>,
) -> TimesheetResult<impl IntoResponse> {
    if payload.name.trim().is_empty() {
        return Err(TimesheetError::Validation(
            "location name is required".to_string(),
        ));
    }
    if payload.contact_email.trim().is_empty() {
        return Err(TimesheetError::Validation(
            "location contact email is required".to_string(),
        ));
    }

    let location = state.location_repository.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// List locations, optionally restricted to one client
pub async fn list_locations(
    State(state): State<AppState>,
    Query(params): Query<LocationListParams>,
) -> TimesheetResult<impl IntoResponse> {
    let locations = state.location_repository.list(params.client_id).await?;
    Ok(Json(locations))
}

/// Get a location by ID
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> TimesheetResult<impl IntoResponse> {
    let location = state
        .location_repository
        .find_by_id(id)
        .await?
        .ok_or(TimesheetError::NotFound("location"))?;

    Ok(Json(location))
}

/// Update a location
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocation>,
) -> TimesheetResult<impl IntoResponse> {
    let location = state.location_repository.update(id, &payload).await?;
    Ok(Json(location))
}

/// Delete a location
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> TimesheetResult<impl IntoResponse> {
    state.location_repository.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

/// Create a new technician
pub async fn create_technician(
    State(state): State<AppState>,
    Json(payload): Json<NewTechnician>,
) -> TimesheetResult<impl IntoResponse> {
    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(TimesheetError::Validation(
            "technician name and email are required".to_string(),
        ));
    }

    let technician = state.technician_repository.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(technician)))
}

/// List all technicians
pub async fn list_technicians(
    State(state): State<AppState>,
) -> TimesheetResult<impl IntoResponse> {
    let technicians = state.technician_repository.list().await?;
    Ok(Json(technicians))
}

/// Get a technician by ID
pub async fn get_technician(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> TimesheetResult<impl IntoResponse> {
    let technician = state
        .technician_repository
        .find_by_id(id)
        .await?
        .ok_or(TimesheetError::NotFound("technician"))?;

    Ok(Json(technician))
}

/// Update a technician
pub async fn update_technician(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTechnician>,
) -> TimesheetResult<impl IntoResponse> {
    let technician = state.technician_repository.update(id, &payload).await?;
    Ok(Json(technician))
}

/// Delete a technician
pub async fn delete_technician(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> TimesheetResult<impl IntoResponse> {
    state.technician_repository.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}
