//! Approval service models for request and response payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Entry status once a token has been issued and not yet consumed
pub const STATUS_CLIENT_PENDING: &str = "client-pending";
/// Entry status after the client contact approved
pub const STATUS_CLIENT_APPROVED: &str = "client-approved";
/// Entry status after the client contact rejected
pub const STATUS_CLIENT_REJECTED: &str = "client-rejected";

/// The two decisions an external reviewer can make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalAction {
    Approve,
    Reject,
}

impl FromStr for ApprovalAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ApprovalAction::Approve),
            "reject" => Ok(ApprovalAction::Reject),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

/// The slice of a time entry this service reads and writes
#[derive(Debug, Clone)]
pub struct ApprovalEntry {
    pub id: Uuid,
    pub technician_id: Uuid,
    pub location_id: Uuid,
    pub entry_date: NaiveDate,
    pub task_notes: Option<String>,
    pub status: String,
    pub token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub used: Option<bool>,
}

/// Contact details of the location a time entry was worked at
#[derive(Debug, Clone)]
pub struct LocationContact {
    pub contact_name: Option<String>,
    pub contact_email: String,
}

/// Request to issue an approval token and email the approval link.
///
/// Fields are optional at the serde level so a missing field yields a 400
/// with an explicit message instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub time_entry_id: Option<Uuid>,
}

/// Request to look up the reviewable subset of a timesheet by token
#[derive(Debug, Default, Deserialize)]
pub struct FetchRequest {
    pub token: Option<String>,
}

/// External reviewer decision payload
#[derive(Debug, Default, Deserialize)]
pub struct DecideRequest {
    pub token: Option<String>,
    pub action: Option<String>,
    pub note: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// The safe subset of a time entry shown to the external reviewer; internal
/// identifiers beyond the technician reference never leave the service
#[derive(Debug, Serialize)]
pub struct SafeTimesheet {
    pub entry_date: NaiveDate,
    pub technician_id: Uuid,
    pub task_notes: Option<String>,
    pub status: String,
}

impl From<&ApprovalEntry> for SafeTimesheet {
    fn from(entry: &ApprovalEntry) -> Self {
        SafeTimesheet {
            entry_date: entry.entry_date,
            technician_id: entry.technician_id,
            task_notes: entry.task_notes.clone(),
            status: entry.status.clone(),
        }
    }
}
