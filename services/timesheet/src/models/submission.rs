//! Job submission model and its status state machine

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Internal review status of a job submission.
///
/// The only legal transitions are `pending_approval -> approved` and
/// `pending_approval -> rejected`; both targets are terminal. A corrected
/// submission is a new record, never a mutation of a decided one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    PendingApproval,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    /// Whether an administrator decision may still be applied
    pub fn can_decide(&self) -> bool {
        matches!(self, SubmissionStatus::PendingApproval)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionStatus::PendingApproval => "pending_approval",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_approval" => Ok(SubmissionStatus::PendingApproval),
            "approved" => Ok(SubmissionStatus::Approved),
            "rejected" => Ok(SubmissionStatus::Rejected),
            other => Err(format!("unknown submission status '{other}'")),
        }
    }
}

/// Administrator decision on a pending submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// Terminal status this decision moves a pending submission into
    pub fn target_status(self) -> SubmissionStatus {
        match self {
            Decision::Approved => SubmissionStatus::Approved,
            Decision::Rejected => SubmissionStatus::Rejected,
        }
    }
}

/// Job submission entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSubmission {
    pub id: Uuid,
    pub technician_id: Uuid,
    pub client_id: Uuid,
    pub location_id: Uuid,
    /// Civil date used to associate time entries with this submission
    pub submission_date: NaiveDate,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// New submission payload; the submission date defaults to today
#[derive(Debug, Clone, Deserialize)]
pub struct NewJobSubmission {
    pub technician_id: Uuid,
    pub client_id: Uuid,
    pub location_id: Uuid,
    pub submission_date: Option<NaiveDate>,
}

/// Administrator decision payload
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}

/// Query filters for listing submissions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionFilter {
    pub technician_id: Option<Uuid>,
    pub status: Option<SubmissionStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_submissions_accept_a_decision() {
        assert!(SubmissionStatus::PendingApproval.can_decide());
        assert!(!SubmissionStatus::Approved.can_decide());
        assert!(!SubmissionStatus::Rejected.can_decide());
    }

    #[test]
    fn decisions_map_onto_terminal_statuses() {
        assert_eq!(Decision::Approved.target_status(), SubmissionStatus::Approved);
        assert_eq!(Decision::Rejected.target_status(), SubmissionStatus::Rejected);
        assert!(!Decision::Approved.target_status().can_decide());
        assert!(!Decision::Rejected.target_status().can_decide());
    }

    #[test]
    fn submission_status_round_trips_through_strings() {
        for status in [
            SubmissionStatus::PendingApproval,
            SubmissionStatus::Approved,
            SubmissionStatus::Rejected,
        ] {
            assert_eq!(status.to_string().parse::<SubmissionStatus>(), Ok(status));
        }
    }

    #[test]
    fn decision_deserializes_snake_case() {
        let decision: Decision = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(decision, Decision::Approved);
        assert!(serde_json::from_str::<Decision>("\"pending_approval\"").is_err());
    }
}
