//! Integration tests for the timesheet flow
//!
//! These tests need a running PostgreSQL instance with the schema from
//! `migrations/0001_schema.sql` applied, and are ignored by default:
//!
//! ```text
//! cargo test -p timesheet -- --ignored
//! ```

use chrono::NaiveDate;
use uuid::Uuid;

use common::database::{DatabaseConfig, init_pool};
use timesheet::duration::CeilingPolicy;
use timesheet::error::TimesheetError;
use timesheet::models::submission::{Decision, NewJobSubmission, SubmissionStatus};
use timesheet::models::time_entry::{NewTimeEntry, SortOrder, TimeEntryFilter, UpdateTimeEntry};
use timesheet::models::{NewClient, NewLocation, NewTechnician};
use timesheet::repositories::submission::SubmissionRepository;
use timesheet::repositories::time_entry::TimeEntryRepository;
use timesheet::repositories::{ClientRepository, LocationRepository, TechnicianRepository};

struct Fixture {
    entries: TimeEntryRepository,
    submissions: SubmissionRepository,
    technician_id: Uuid,
    client_id: Uuid,
    location_id: Uuid,
}

/// Seed a client, location, and technician to hang entries off
async fn fixture() -> Fixture {
    let config = DatabaseConfig::from_env().expect("database config");
    let pool = init_pool(&config).await.expect("database pool");

    let client = ClientRepository::new(pool.clone())
        .create(&NewClient {
            name: format!("Acme Refrigeration {}", Uuid::new_v4()),
            contact_email: None,
        })
        .await
        .expect("create client");

    let location = LocationRepository::new(pool.clone())
        .create(&NewLocation {
            client_id: client.id,
            name: "Cold Storage North".to_string(),
            address: Some("1 Dock Road".to_string()),
            contact_name: Some("Sam Plumber".to_string()),
            contact_email: "sam@example.com".to_string(),
        })
        .await
        .expect("create location");

    let technician = TechnicianRepository::new(pool.clone())
        .create(&NewTechnician {
            name: "Jordan Field".to_string(),
            email: format!("jordan+{}@example.com", Uuid::new_v4()),
        })
        .await
        .expect("create technician");

    Fixture {
        entries: TimeEntryRepository::new(pool.clone(), CeilingPolicy::Warn),
        submissions: SubmissionRepository::new(pool),
        technician_id: technician.id,
        client_id: client.id,
        location_id: location.id,
    }
}

fn new_entry(fx: &Fixture, date: NaiveDate, start: &str, end: &str, break_minutes: i64) -> NewTimeEntry {
    NewTimeEntry {
        technician_id: fx.technician_id,
        client_id: fx.client_id,
        location_id: fx.location_id,
        entry_date: date,
        start_time: start.to_string(),
        end_time: end.to_string(),
        break_minutes,
        task_notes: None,
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn full_day_is_logged_submitted_approved_and_locked() {
    let fx = fixture().await;
    let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

    // 09:00-17:30 with a 30 minute break is 8h - 30m of work.
    let (entry, excessive) = fx
        .entries
        .create(&new_entry(&fx, date, "09:00", "17:30", 30))
        .await
        .expect("create entry");
    assert_eq!(entry.work_duration_seconds, 27_000);
    assert_eq!(entry.total_break_seconds, 1_800);
    assert!(!excessive);

    let submission = fx
        .submissions
        .create(&NewJobSubmission {
            technician_id: fx.technician_id,
            client_id: fx.client_id,
            location_id: fx.location_id,
            submission_date: Some(date),
        })
        .await
        .expect("create submission");
    assert_eq!(submission.status, SubmissionStatus::PendingApproval);
    assert!(submission.decided_at.is_none());

    let decided = fx
        .submissions
        .decide(submission.id, Decision::Approved)
        .await
        .expect("approve submission");
    assert_eq!(decided.status, SubmissionStatus::Approved);
    assert!(decided.decided_at.is_some());

    // A second decision is refused and the stored status keeps the first.
    let second = fx.submissions.decide(submission.id, Decision::Rejected).await;
    assert!(matches!(second, Err(TimesheetError::AlreadyDecided)));
    let stored = fx
        .submissions
        .find_by_id(submission.id)
        .await
        .expect("reload submission")
        .expect("submission exists");
    assert_eq!(stored.status, SubmissionStatus::Approved);

    // The approved day locks the entry against edits and deletes.
    let update = fx
        .entries
        .update(
            entry.id,
            &UpdateTimeEntry {
                break_minutes: Some(60),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(update, Err(TimesheetError::Locked)));

    let delete = fx.entries.delete(entry.id).await;
    assert!(matches!(delete, Err(TimesheetError::Locked)));

    // The association endpoint sees the locked entry.
    let associated = fx
        .entries
        .list_for_submission(&stored)
        .await
        .expect("list associated entries");
    assert!(associated.iter().any(|e| e.id == entry.id));

    // A different day of the same job stays editable.
    let other_date = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
    let (other, _) = fx
        .entries
        .create(&new_entry(&fx, other_date, "08:00", "12:00", 0))
        .await
        .expect("create second entry");
    fx.entries
        .update(
            other.id,
            &UpdateTimeEntry {
                break_minutes: Some(15),
                ..Default::default()
            },
        )
        .await
        .expect("other day still editable");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn overnight_entries_store_a_next_day_end() {
    let fx = fixture().await;
    let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

    let (entry, _) = fx
        .entries
        .create(&new_entry(&fx, date, "23:30", "00:15", 0))
        .await
        .expect("create overnight entry");

    assert_eq!(entry.work_duration_seconds, 45 * 60);
    assert_eq!(entry.entry_date, date);
    assert_eq!(
        entry.end_time.date_naive(),
        NaiveDate::from_ymd_opt(2024, 2, 2).unwrap()
    );
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn oversized_break_is_rejected_before_persistence() {
    let fx = fixture().await;
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

    let result = fx
        .entries
        .create(&new_entry(&fx, date, "09:00", "17:00", 600))
        .await;
    assert!(matches!(result, Err(TimesheetError::Duration(_))));

    let stored = fx
        .entries
        .query(&TimeEntryFilter {
            technician_id: Some(fx.technician_id),
            ..Default::default()
        })
        .await
        .expect("query entries");
    assert!(stored.is_empty(), "rejected entry must not be persisted");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn queries_order_by_date_then_start_time() {
    let fx = fixture().await;
    let first_day = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let second_day = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();

    for (date, start, end) in [
        (second_day, "09:00", "11:00"),
        (first_day, "13:00", "15:00"),
        (first_day, "08:00", "10:00"),
    ] {
        fx.entries
            .create(&new_entry(&fx, date, start, end, 0))
            .await
            .expect("create entry");
    }

    let ascending = fx
        .entries
        .query(&TimeEntryFilter {
            technician_id: Some(fx.technician_id),
            order: SortOrder::Asc,
            ..Default::default()
        })
        .await
        .expect("ascending query");
    let starts: Vec<_> = ascending.iter().map(|e| e.start_time).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    assert_eq!(ascending.len(), 3);

    let descending = fx
        .entries
        .query(&TimeEntryFilter {
            technician_id: Some(fx.technician_id),
            order: SortOrder::Desc,
            ..Default::default()
        })
        .await
        .expect("descending query");
    let reversed: Vec<_> = descending.iter().map(|e| e.start_time).collect();
    let mut expected = starts;
    expected.sort();
    expected.reverse();
    assert_eq!(reversed, expected);
}
