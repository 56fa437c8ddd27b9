//! Time entry model and related payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Client-facing approval status of a time entry, independent of the
/// internal submission status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryStatus {
    /// Saved by the technician, no external approval requested
    Logged,
    /// An approval token has been issued and not yet consumed
    ClientPending,
    /// The client contact approved the entry
    ClientApproved,
    /// The client contact rejected the entry
    ClientRejected,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryStatus::Logged => "logged",
            EntryStatus::ClientPending => "client-pending",
            EntryStatus::ClientApproved => "client-approved",
            EntryStatus::ClientRejected => "client-rejected",
        };
        f.write_str(s)
    }
}

impl FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logged" => Ok(EntryStatus::Logged),
            "client-pending" => Ok(EntryStatus::ClientPending),
            "client-approved" => Ok(EntryStatus::ClientApproved),
            "client-rejected" => Ok(EntryStatus::ClientRejected),
            other => Err(format!("unknown entry status '{other}'")),
        }
    }
}

/// External approval sub-record, present once a token has been issued
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientApproval {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub approver_name: Option<String>,
    pub approver_email: Option<String>,
    pub rejection_note: Option<String>,
    pub action_at: Option<DateTime<Utc>>,
}

/// Time entry entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Uuid,
    pub technician_id: Uuid,
    pub client_id: Uuid,
    pub location_id: Uuid,
    /// Civil date the shift is attributed to, even when it runs overnight
    pub entry_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_break_seconds: i64,
    pub work_duration_seconds: i64,
    pub task_notes: Option<String>,
    pub status: EntryStatus,
    pub client_approval: Option<ClientApproval>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New time entry payload; clocks arrive as HH:mm strings and the duration
/// is always recomputed server-side
#[derive(Debug, Clone, Deserialize)]
pub struct NewTimeEntry {
    pub technician_id: Uuid,
    pub client_id: Uuid,
    pub location_id: Uuid,
    pub entry_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub break_minutes: i64,
    pub task_notes: Option<String>,
}

/// Partial update payload for a time entry
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateTimeEntry {
    pub entry_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub break_minutes: Option<i64>,
    pub task_notes: Option<String>,
}

/// Response for create/update operations; carries the advisory duration
/// warning when the computed span exceeds the sanity ceiling
#[derive(Debug, Serialize)]
pub struct TimeEntryResponse {
    pub entry: TimeEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Sort direction for entry queries; reports read ascending, "recent first"
/// views read descending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query filters for listing time entries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeEntryFilter {
    pub technician_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    /// Inclusive lower bound on the entry date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the entry date
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub order: SortOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_status_round_trips_through_strings() {
        for status in [
            EntryStatus::Logged,
            EntryStatus::ClientPending,
            EntryStatus::ClientApproved,
            EntryStatus::ClientRejected,
        ] {
            assert_eq!(status.to_string().parse::<EntryStatus>(), Ok(status));
        }
    }

    #[test]
    fn entry_status_rejects_unknown_strings() {
        assert!("pending".parse::<EntryStatus>().is_err());
        assert!("".parse::<EntryStatus>().is_err());
    }

    #[test]
    fn entry_status_serializes_kebab_case() {
        let json = serde_json::to_string(&EntryStatus::ClientPending).unwrap();
        assert_eq!(json, "\"client-pending\"");
    }
}
