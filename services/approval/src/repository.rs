//! Approval repository for database operations
//!
//! All token state changes are conditional updates: issuing a token
//! supersedes any prior unused one in a single statement, and consuming a
//! token requires `approval_used = FALSE` plus an unexpired deadline at
//! commit time. Two concurrent decisions on the same token therefore
//! serialize in the store, and the loser is told the token was already
//! used.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{ApprovalError, ApprovalResult};
use crate::models::{
    ApprovalAction, ApprovalEntry, LocationContact, STATUS_CLIENT_APPROVED,
    STATUS_CLIENT_PENDING, STATUS_CLIENT_REJECTED,
};
use crate::token;

/// Column list for the time-entry slice this service works on
const APPROVAL_ENTRY_COLUMNS: &str = "id, technician_id, location_id, entry_date, task_notes, \
    status, approval_token, approval_expires_at, approval_used";

fn map_entry(row: &PgRow) -> ApprovalEntry {
    ApprovalEntry {
        id: row.get("id"),
        technician_id: row.get("technician_id"),
        location_id: row.get("location_id"),
        entry_date: row.get("entry_date"),
        task_notes: row.get("task_notes"),
        status: row.get("status"),
        token: row.get("approval_token"),
        expires_at: row.get("approval_expires_at"),
        used: row.get("approval_used"),
    }
}

/// Approval repository
#[derive(Clone)]
pub struct ApprovalRepository {
    pool: PgPool,
}

impl ApprovalRepository {
    /// Create a new approval repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a time entry by ID
    pub async fn find_entry_by_id(&self, id: Uuid) -> ApprovalResult<Option<ApprovalEntry>> {
        let query = format!("SELECT {APPROVAL_ENTRY_COLUMNS} FROM time_entries WHERE id = $1");
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.as_ref().map(map_entry))
    }

    /// Find the time entry carrying the given approval token
    pub async fn find_entry_by_token(
        &self,
        token: &str,
    ) -> ApprovalResult<Option<ApprovalEntry>> {
        let query = format!(
            "SELECT {APPROVAL_ENTRY_COLUMNS} FROM time_entries WHERE approval_token = $1"
        );
        let row = sqlx::query(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_entry))
    }

    /// Look up the contact details of a location
    pub async fn location_contact(
        &self,
        location_id: Uuid,
    ) -> ApprovalResult<Option<LocationContact>> {
        let row = sqlx::query(
            r#"
            SELECT contact_name, contact_email
            FROM locations
            WHERE id = $1
            "#,
        )
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| LocationContact {
            contact_name: row.get("contact_name"),
            contact_email: row.get("contact_email"),
        }))
    }

    /// Attach a fresh approval token to an entry and move it to the
    /// client-pending status.
    ///
    /// The single UPDATE also supersedes any prior token, used or not: only
    /// one token can ever be live per entry, and an old emailed link stops
    /// resolving the moment a new one is issued.
    pub async fn issue_token(
        &self,
        entry_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> ApprovalResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE time_entries
            SET status = $2,
                approval_token = $3,
                approval_expires_at = $4,
                approval_used = FALSE,
                approver_name = NULL,
                approver_email = NULL,
                rejection_note = NULL,
                approval_action_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(entry_id)
        .bind(STATUS_CLIENT_PENDING)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApprovalError::NotFound("timesheet"));
        }
        Ok(())
    }

    /// Consume a token with a reviewer decision.
    ///
    /// The conditional update is the authoritative validity check: it only
    /// matches an unused, unexpired token. When it matches nothing the
    /// entry is re-read once to report which precondition failed.
    pub async fn decide(
        &self,
        token_value: &str,
        action: ApprovalAction,
        reviewer_name: &str,
        reviewer_email: &str,
        note: Option<&str>,
    ) -> ApprovalResult<ApprovalEntry> {
        let status = match action {
            ApprovalAction::Approve => STATUS_CLIENT_APPROVED,
            ApprovalAction::Reject => STATUS_CLIENT_REJECTED,
        };

        let query = format!(
            "UPDATE time_entries
             SET status = $2,
                 approval_used = TRUE,
                 approver_name = $3,
                 approver_email = $4,
                 rejection_note = $5,
                 approval_action_at = NOW(),
                 updated_at = NOW()
             WHERE approval_token = $1
               AND approval_used = FALSE
               AND approval_expires_at > NOW()
             RETURNING {APPROVAL_ENTRY_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(token_value)
            .bind(status)
            .bind(reviewer_name)
            .bind(reviewer_email)
            .bind(note)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = row {
            return Ok(map_entry(&row));
        }

        match self.find_entry_by_token(token_value).await? {
            None => Err(ApprovalError::NotFound("timesheet")),
            Some(entry) => {
                let (used, expires_at) = match (entry.used, entry.expires_at) {
                    (Some(used), Some(expires_at)) => (used, expires_at),
                    _ => {
                        return Err(ApprovalError::Internal(
                            "approval columns out of sync for time entry".to_string(),
                        ));
                    }
                };
                token::validate(used, expires_at, Utc::now())?;
                // The update matched nothing yet the token re-reads as
                // valid; the record changed between the two statements.
                Err(ApprovalError::Internal(
                    "token state changed while the decision was applied".to_string(),
                ))
            }
        }
    }
}
