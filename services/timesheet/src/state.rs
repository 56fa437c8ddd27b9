//! Application state shared across handlers

use sqlx::PgPool;

use crate::repositories::{
    ClientRepository, LocationRepository, TechnicianRepository,
    submission::SubmissionRepository, time_entry::TimeEntryRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub time_entry_repository: TimeEntryRepository,
    pub submission_repository: SubmissionRepository,
    pub client_repository: ClientRepository,
    pub location_repository: LocationRepository,
    pub technician_repository: TechnicianRepository,
}
