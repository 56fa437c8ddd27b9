//! Time entry repository for database operations
//!
//! The repository is the single write path for entries: every create or
//! update re-runs the duration engine, so a caller-supplied duration is
//! never stored. Edits and deletes are refused for entries whose owning
//! submission (matched by technician/client/location/date) has been
//! approved.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::warn;
use uuid::Uuid;

use crate::duration::{self, CeilingPolicy, ComputedDuration};
use crate::error::{TimesheetError, TimesheetResult};
use crate::models::submission::JobSubmission;
use crate::models::time_entry::{
    ClientApproval, NewTimeEntry, SortOrder, TimeEntry, TimeEntryFilter, UpdateTimeEntry,
};

/// Column list for time_entries queries
const ENTRY_COLUMNS: &str = "id, technician_id, client_id, location_id, entry_date, \
    start_time, end_time, total_break_seconds, work_duration_seconds, task_notes, status, \
    approval_token, approval_expires_at, approval_used, approver_name, approver_email, \
    rejection_note, approval_action_at, created_at, updated_at";

/// Map a database row onto a [`TimeEntry`]
pub(crate) fn map_entry(row: &PgRow) -> TimesheetResult<TimeEntry> {
    let status: String = row.get("status");
    let status = status.parse().map_err(TimesheetError::Internal)?;

    let token: Option<String> = row.get("approval_token");
    let client_approval = match token {
        Some(token) => {
            let expires_at: Option<DateTime<Utc>> = row.get("approval_expires_at");
            let used: Option<bool> = row.get("approval_used");
            match (expires_at, used) {
                (Some(expires_at), Some(used)) => Some(ClientApproval {
                    token,
                    expires_at,
                    used,
                    approver_name: row.get("approver_name"),
                    approver_email: row.get("approver_email"),
                    rejection_note: row.get("rejection_note"),
                    action_at: row.get("approval_action_at"),
                }),
                _ => {
                    return Err(TimesheetError::Internal(
                        "approval columns out of sync for time entry".to_string(),
                    ));
                }
            }
        }
        None => None,
    };

    Ok(TimeEntry {
        id: row.get("id"),
        technician_id: row.get("technician_id"),
        client_id: row.get("client_id"),
        location_id: row.get("location_id"),
        entry_date: row.get("entry_date"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        total_break_seconds: row.get("total_break_seconds"),
        work_duration_seconds: row.get("work_duration_seconds"),
        task_notes: row.get("task_notes"),
        status,
        client_approval,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Time entry repository
#[derive(Clone)]
pub struct TimeEntryRepository {
    pool: PgPool,
    policy: CeilingPolicy,
}

impl TimeEntryRepository {
    /// Create a new time entry repository
    pub fn new(pool: PgPool, policy: CeilingPolicy) -> Self {
        Self { pool, policy }
    }

    /// Create a new time entry; returns the stored entry and whether the
    /// computed duration tripped the advisory ceiling
    pub async fn create(&self, payload: &NewTimeEntry) -> TimesheetResult<(TimeEntry, bool)> {
        let computed = duration::compute_work_duration(
            payload.entry_date,
            &payload.start_time,
            &payload.end_time,
            payload.break_minutes,
            self.policy,
        )?;
        self.warn_if_excessive(&computed);

        let query = format!(
            "INSERT INTO time_entries
                (technician_id, client_id, location_id, entry_date, start_time, end_time,
                 total_break_seconds, work_duration_seconds, task_notes, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'logged')
             RETURNING {ENTRY_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(payload.technician_id)
            .bind(payload.client_id)
            .bind(payload.location_id)
            .bind(payload.entry_date)
            .bind(computed.start_time)
            .bind(computed.end_time)
            .bind(computed.total_break_seconds)
            .bind(computed.work_duration_seconds)
            .bind(&payload.task_notes)
            .fetch_one(&self.pool)
            .await?;

        Ok((map_entry(&row)?, computed.excessive))
    }

    /// Find a time entry by ID
    pub async fn find_by_id(&self, id: Uuid) -> TimesheetResult<Option<TimeEntry>> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM time_entries WHERE id = $1");
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;

        row.map(|row| map_entry(&row)).transpose()
    }

    /// Update a time entry.
    ///
    /// Clock fields not present in the payload keep their stored values;
    /// the duration is recomputed from the merged inputs either way.
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateTimeEntry,
    ) -> TimesheetResult<(TimeEntry, bool)> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or(TimesheetError::NotFound("time entry"))?;
        self.ensure_not_locked(&existing).await?;

        let entry_date = payload.entry_date.unwrap_or(existing.entry_date);
        let start_clock = payload
            .start_time
            .clone()
            .unwrap_or_else(|| existing.start_time.format("%H:%M").to_string());
        let end_clock = payload
            .end_time
            .clone()
            .unwrap_or_else(|| existing.end_time.format("%H:%M").to_string());
        let break_minutes = payload
            .break_minutes
            .unwrap_or(existing.total_break_seconds / 60);

        let computed = duration::compute_work_duration(
            entry_date,
            &start_clock,
            &end_clock,
            break_minutes,
            self.policy,
        )?;
        self.warn_if_excessive(&computed);

        let task_notes = payload.task_notes.clone().or(existing.task_notes);

        let query = format!(
            "UPDATE time_entries
             SET entry_date = $2, start_time = $3, end_time = $4, total_break_seconds = $5,
                 work_duration_seconds = $6, task_notes = $7, updated_at = NOW()
             WHERE id = $1
             RETURNING {ENTRY_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(entry_date)
            .bind(computed.start_time)
            .bind(computed.end_time)
            .bind(computed.total_break_seconds)
            .bind(computed.work_duration_seconds)
            .bind(&task_notes)
            .fetch_one(&self.pool)
            .await?;

        Ok((map_entry(&row)?, computed.excessive))
    }

    /// Delete a time entry
    pub async fn delete(&self, id: Uuid) -> TimesheetResult<()> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or(TimesheetError::NotFound("time entry"))?;
        self.ensure_not_locked(&existing).await?;

        sqlx::query("DELETE FROM time_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List time entries matching the given filters, ordered by
    /// (entry_date, start_time) in the requested direction
    pub async fn query(&self, filter: &TimeEntryFilter) -> TimesheetResult<Vec<TimeEntry>> {
        let mut sql = format!("SELECT {ENTRY_COLUMNS} FROM time_entries");
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_index = 0usize;

        if filter.technician_id.is_some() {
            bind_index += 1;
            conditions.push(format!("technician_id = ${bind_index}"));
        }
        if filter.client_id.is_some() {
            bind_index += 1;
            conditions.push(format!("client_id = ${bind_index}"));
        }
        if filter.location_id.is_some() {
            bind_index += 1;
            conditions.push(format!("location_id = ${bind_index}"));
        }
        if filter.from.is_some() {
            bind_index += 1;
            conditions.push(format!("entry_date >= ${bind_index}"));
        }
        if filter.to.is_some() {
            bind_index += 1;
            conditions.push(format!("entry_date <= ${bind_index}"));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        let direction = match filter.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        sql.push_str(&format!(" ORDER BY entry_date {direction}, start_time {direction}"));

        let mut query = sqlx::query(&sql);
        if let Some(technician_id) = filter.technician_id {
            query = query.bind(technician_id);
        }
        if let Some(client_id) = filter.client_id {
            query = query.bind(client_id);
        }
        if let Some(location_id) = filter.location_id {
            query = query.bind(location_id);
        }
        if let Some(from) = filter.from {
            query = query.bind(from);
        }
        if let Some(to) = filter.to {
            query = query.bind(to);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(map_entry).collect()
    }

    /// List the entries associated with a submission: same technician,
    /// client and location, entry date equal to the submission date
    pub async fn list_for_submission(
        &self,
        submission: &JobSubmission,
    ) -> TimesheetResult<Vec<TimeEntry>> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM time_entries
             WHERE technician_id = $1 AND client_id = $2 AND location_id = $3
               AND entry_date = $4
             ORDER BY start_time ASC"
        );
        let rows = sqlx::query(&query)
            .bind(submission.technician_id)
            .bind(submission.client_id)
            .bind(submission.location_id)
            .bind(submission.submission_date)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_entry).collect()
    }

    /// Refuse mutation when an approved submission covers the entry's day
    async fn ensure_not_locked(&self, entry: &TimeEntry) -> TimesheetResult<()> {
        let locked: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM job_submissions
                WHERE technician_id = $1 AND client_id = $2 AND location_id = $3
                  AND submission_date = $4 AND status = 'approved'
            )",
        )
        .bind(entry.technician_id)
        .bind(entry.client_id)
        .bind(entry.location_id)
        .bind(entry.entry_date)
        .fetch_one(&self.pool)
        .await?;

        if locked {
            return Err(TimesheetError::Locked);
        }
        Ok(())
    }

    fn warn_if_excessive(&self, computed: &ComputedDuration) {
        if computed.excessive {
            warn!(
                "Computed work duration of {}s exceeds the sanity ceiling",
                computed.work_duration_seconds
            );
        }
    }
}
