//! Job submission repository for database operations
//!
//! Decisions are applied as a conditional update on the pending status, so
//! two concurrent administrators cannot both win: the loser is told the
//! submission was already decided instead of silently overwriting it.

use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{TimesheetError, TimesheetResult};
use crate::models::submission::{
    Decision, JobSubmission, NewJobSubmission, SubmissionFilter,
};

/// Column list for job_submissions queries
const SUBMISSION_COLUMNS: &str = "id, technician_id, client_id, location_id, submission_date, \
    status, submitted_at, decided_at";

/// Map a database row onto a [`JobSubmission`]
fn map_submission(row: &PgRow) -> TimesheetResult<JobSubmission> {
    let status: String = row.get("status");
    let status = status.parse().map_err(TimesheetError::Internal)?;

    Ok(JobSubmission {
        id: row.get("id"),
        technician_id: row.get("technician_id"),
        client_id: row.get("client_id"),
        location_id: row.get("location_id"),
        submission_date: row.get("submission_date"),
        status,
        submitted_at: row.get("submitted_at"),
        decided_at: row.get("decided_at"),
    })
}

/// Job submission repository
#[derive(Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    /// Create a new submission repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new submission in the pending state; the submission date
    /// defaults to today when the payload leaves it out
    pub async fn create(&self, payload: &NewJobSubmission) -> TimesheetResult<JobSubmission> {
        let submission_date = payload
            .submission_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let query = format!(
            "INSERT INTO job_submissions (technician_id, client_id, location_id, submission_date)
             VALUES ($1, $2, $3, $4)
             RETURNING {SUBMISSION_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(payload.technician_id)
            .bind(payload.client_id)
            .bind(payload.location_id)
            .bind(submission_date)
            .fetch_one(&self.pool)
            .await?;

        map_submission(&row)
    }

    /// Find a submission by ID
    pub async fn find_by_id(&self, id: Uuid) -> TimesheetResult<Option<JobSubmission>> {
        let query = format!("SELECT {SUBMISSION_COLUMNS} FROM job_submissions WHERE id = $1");
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;

        row.map(|row| map_submission(&row)).transpose()
    }

    /// List submissions, optionally filtered by technician and status,
    /// most recent first
    pub async fn list(&self, filter: &SubmissionFilter) -> TimesheetResult<Vec<JobSubmission>> {
        let mut sql = format!("SELECT {SUBMISSION_COLUMNS} FROM job_submissions");
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_index = 0usize;

        if filter.technician_id.is_some() {
            bind_index += 1;
            conditions.push(format!("technician_id = ${bind_index}"));
        }
        if filter.status.is_some() {
            bind_index += 1;
            conditions.push(format!("status = ${bind_index}"));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY submitted_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(technician_id) = filter.technician_id {
            query = query.bind(technician_id);
        }
        if let Some(status) = filter.status {
            query = query.bind(status.to_string());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(map_submission).collect()
    }

    /// Apply an administrator decision to a pending submission.
    ///
    /// The update is conditional on the pending status; when it matches
    /// nothing, the submission is either unknown or already terminal.
    pub async fn decide(&self, id: Uuid, decision: Decision) -> TimesheetResult<JobSubmission> {
        let target = decision.target_status();

        let query = format!(
            "UPDATE job_submissions
             SET status = $2, decided_at = NOW()
             WHERE id = $1 AND status = 'pending_approval'
             RETURNING {SUBMISSION_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(target.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => map_submission(&row),
            None => match self.find_by_id(id).await? {
                None => Err(TimesheetError::NotFound("submission")),
                Some(current) if !current.status.can_decide() => {
                    Err(TimesheetError::AlreadyDecided)
                }
                // Terminal states never revert, so the row cannot have
                // turned pending again between the two statements.
                Some(_) => Err(TimesheetError::AlreadyDecided),
            },
        }
    }
}
