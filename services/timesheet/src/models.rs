//! Timesheet service models for request and response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod submission;
pub mod time_entry;

/// Client (customer) entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New client payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub contact_email: Option<String>,
}

/// Client update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub contact_email: Option<String>,
}

/// Service location belonging to a client; the contact email receives
/// external approval requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New location payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewLocation {
    pub client_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: String,
}

/// Location update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateLocation {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
}

/// Technician (field employee) entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technician {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New technician payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewTechnician {
    pub name: String,
    pub email: String,
}

/// Technician update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateTechnician {
    pub name: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
}
