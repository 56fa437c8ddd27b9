//! Work-duration engine for time entries
//!
//! Turns a civil entry date, HH:mm clock strings, and a break length into a
//! validated pair of timestamps plus the elapsed work duration in seconds.
//! A shift whose end clock is at or before its start clock is treated as
//! crossing midnight, provided the resulting span stays under the rollover
//! ceiling. The functions here are pure: the same inputs always produce the
//! same result, so they serve both live validation and final persistence.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

/// Longest span an overnight rollover may produce before the range is
/// considered nonsensical rather than overnight.
pub const ROLLOVER_CEILING_SECONDS: i64 = 36 * 60 * 60;

/// Work durations above this are flagged (or rejected, per policy).
pub const SANITY_CEILING_SECONDS: i64 = 48 * 60 * 60;

/// Validation errors for a time-entry duration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DurationError {
    /// The clock string is not a valid HH:mm time
    #[error("invalid clock time '{0}', expected HH:mm")]
    InvalidClock(String),

    /// The break length is negative
    #[error("break duration cannot be negative")]
    NegativeBreak,

    /// End does not come after start, even allowing a midnight rollover
    #[error("end time must be after start time; overnight shifts must stay under 36 hours")]
    InvalidRange,

    /// The break swallows the whole shift
    #[error("break duration ({break_seconds}s) exceeds the elapsed time ({elapsed_seconds}s)")]
    BreakExceedsElapsed {
        break_seconds: i64,
        elapsed_seconds: i64,
    },

    /// The computed work duration breaks the sanity ceiling under the
    /// `reject` policy
    #[error("computed work duration exceeds 48 hours, check the entered times")]
    ExcessiveDuration,
}

/// What to do when a computed duration exceeds [`SANITY_CEILING_SECONDS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CeilingPolicy {
    /// Flag the result so callers can warn the user (default)
    #[default]
    Warn,
    /// Fail validation outright
    Reject,
}

impl CeilingPolicy {
    /// Read the policy from `DURATION_CEILING_POLICY` (`warn` | `reject`)
    pub fn from_env() -> Self {
        match std::env::var("DURATION_CEILING_POLICY").as_deref() {
            Ok("reject") => CeilingPolicy::Reject,
            _ => CeilingPolicy::Warn,
        }
    }
}

/// A validated duration computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedDuration {
    /// Entry date combined with the start clock
    pub start_time: DateTime<Utc>,
    /// Entry date combined with the end clock, rolled one day forward for
    /// overnight shifts
    pub end_time: DateTime<Utc>,
    /// Break length in seconds
    pub total_break_seconds: i64,
    /// Elapsed seconds minus the break
    pub work_duration_seconds: i64,
    /// True when the result exceeds the sanity ceiling under the `warn`
    /// policy
    pub excessive: bool,
}

/// Parse an HH:mm (24-hour) clock string
pub fn parse_clock(clock: &str) -> Result<NaiveTime, DurationError> {
    NaiveTime::parse_from_str(clock, "%H:%M")
        .map_err(|_| DurationError::InvalidClock(clock.to_string()))
}

/// Compute the validated work duration for a time entry.
///
/// Combines `entry_date` with both clocks (interpreted in UTC). When the
/// candidate end is at or before the start, the end rolls forward one
/// calendar day; the rolled span must stay under
/// [`ROLLOVER_CEILING_SECONDS`]. The break must fit inside the elapsed
/// span. The result never carries a negative duration.
pub fn compute_work_duration(
    entry_date: NaiveDate,
    start_clock: &str,
    end_clock: &str,
    break_minutes: i64,
    policy: CeilingPolicy,
) -> Result<ComputedDuration, DurationError> {
    if break_minutes < 0 {
        return Err(DurationError::NegativeBreak);
    }

    let start = entry_date.and_time(parse_clock(start_clock)?).and_utc();
    let mut end = entry_date.and_time(parse_clock(end_clock)?).and_utc();

    if end <= start {
        let rolled = end + Duration::days(1);
        let elapsed = (rolled - start).num_seconds();
        if elapsed <= 0 || elapsed >= ROLLOVER_CEILING_SECONDS {
            return Err(DurationError::InvalidRange);
        }
        end = rolled;
    }

    finalize(start, end, break_minutes * 60, policy)
}

/// Validate a (start, end, break) triple that already carries absolute
/// timestamps, e.g. when only the break of a stored entry changes.
pub fn finalize(
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    break_seconds: i64,
    policy: CeilingPolicy,
) -> Result<ComputedDuration, DurationError> {
    let elapsed_seconds = (end_time - start_time).num_seconds();
    if elapsed_seconds <= 0 {
        return Err(DurationError::InvalidRange);
    }
    if break_seconds < 0 {
        return Err(DurationError::NegativeBreak);
    }
    if break_seconds > elapsed_seconds {
        return Err(DurationError::BreakExceedsElapsed {
            break_seconds,
            elapsed_seconds,
        });
    }

    let work_duration_seconds = elapsed_seconds - break_seconds;
    let excessive = work_duration_seconds > SANITY_CEILING_SECONDS;
    if excessive && policy == CeilingPolicy::Reject {
        return Err(DurationError::ExcessiveDuration);
    }

    Ok(ComputedDuration {
        start_time,
        end_time,
        total_break_seconds: break_seconds,
        work_duration_seconds,
        excessive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_shift_subtracts_break() {
        let result =
            compute_work_duration(date(2024, 1, 10), "09:00", "17:30", 30, CeilingPolicy::Warn)
                .unwrap();
        assert_eq!(result.work_duration_seconds, 8 * 3600 - 30 * 60);
        assert_eq!(result.total_break_seconds, 1800);
        assert!(!result.excessive);
        assert_eq!(result.start_time.date_naive(), date(2024, 1, 10));
        assert_eq!(result.end_time.date_naive(), date(2024, 1, 10));
    }

    #[test]
    fn overnight_shift_rolls_end_to_next_day() {
        let result =
            compute_work_duration(date(2024, 1, 10), "23:30", "00:15", 0, CeilingPolicy::Warn)
                .unwrap();
        assert_eq!(result.work_duration_seconds, 45 * 60);
        assert_eq!(result.end_time.date_naive(), date(2024, 1, 11));
    }

    #[test]
    fn equal_clocks_roll_over_to_a_full_day() {
        let result =
            compute_work_duration(date(2024, 1, 10), "08:00", "08:00", 0, CeilingPolicy::Warn)
                .unwrap();
        assert_eq!(result.work_duration_seconds, 24 * 3600);
        assert_eq!(result.end_time.date_naive(), date(2024, 1, 11));
    }

    #[test]
    fn break_exceeding_elapsed_is_rejected() {
        let err =
            compute_work_duration(date(2024, 1, 10), "09:00", "17:00", 600, CeilingPolicy::Warn)
                .unwrap_err();
        assert_eq!(
            err,
            DurationError::BreakExceedsElapsed {
                break_seconds: 36_000,
                elapsed_seconds: 8 * 3600,
            }
        );
    }

    #[test]
    fn break_equal_to_elapsed_yields_zero_work() {
        let result =
            compute_work_duration(date(2024, 1, 10), "09:00", "10:00", 60, CeilingPolicy::Warn)
                .unwrap();
        assert_eq!(result.work_duration_seconds, 0);
    }

    #[test]
    fn negative_break_is_rejected() {
        let err =
            compute_work_duration(date(2024, 1, 10), "09:00", "17:00", -1, CeilingPolicy::Warn)
                .unwrap_err();
        assert_eq!(err, DurationError::NegativeBreak);
    }

    #[test]
    fn malformed_clock_strings_are_rejected() {
        for clock in ["", "9am", "25:00", "12:61", "12-30", "12:30:00"] {
            let err = compute_work_duration(
                date(2024, 1, 10),
                clock,
                "17:00",
                0,
                CeilingPolicy::Warn,
            )
            .unwrap_err();
            assert_eq!(err, DurationError::InvalidClock(clock.to_string()), "{clock}");
        }
    }

    #[test]
    fn finalize_rejects_end_before_start() {
        let start = date(2024, 1, 10).and_hms_opt(9, 0, 0).unwrap().and_utc();
        let end = start - Duration::hours(1);
        assert_eq!(
            finalize(start, end, 0, CeilingPolicy::Warn).unwrap_err(),
            DurationError::InvalidRange
        );
    }

    #[test]
    fn finalize_flags_excessive_duration_under_warn() {
        let start = date(2024, 1, 10).and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end = start + Duration::hours(50);
        let result = finalize(start, end, 0, CeilingPolicy::Warn).unwrap();
        assert!(result.excessive);
        assert_eq!(result.work_duration_seconds, 50 * 3600);
    }

    #[test]
    fn finalize_rejects_excessive_duration_under_reject() {
        let start = date(2024, 1, 10).and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end = start + Duration::hours(50);
        assert_eq!(
            finalize(start, end, 0, CeilingPolicy::Reject).unwrap_err(),
            DurationError::ExcessiveDuration
        );
    }

    #[test]
    fn duration_at_the_ceiling_is_not_excessive() {
        let start = date(2024, 1, 10).and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end = start + Duration::hours(48);
        let result = finalize(start, end, 0, CeilingPolicy::Reject).unwrap();
        assert!(!result.excessive);
    }

    #[test]
    #[serial]
    fn ceiling_policy_from_env() {
        unsafe {
            std::env::remove_var("DURATION_CEILING_POLICY");
        }
        assert_eq!(CeilingPolicy::from_env(), CeilingPolicy::Warn);

        unsafe {
            std::env::set_var("DURATION_CEILING_POLICY", "reject");
        }
        assert_eq!(CeilingPolicy::from_env(), CeilingPolicy::Reject);

        unsafe {
            std::env::remove_var("DURATION_CEILING_POLICY");
        }
    }
}
