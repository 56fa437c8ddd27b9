//! Approval service: the external, token-authenticated client sign-off API
//!
//! Issues single-use, time-limited approval tokens for time entries, emails
//! the approval link to the location contact, and applies the reviewer's
//! decision back onto the entry.

use sqlx::PgPool;

pub mod error;
pub mod mailer;
pub mod models;
pub mod rate_limiter;
pub mod repository;
pub mod routes;
pub mod token;
pub mod validation;

use crate::mailer::Mailer;
use crate::rate_limiter::RateLimiter;
use crate::repository::ApprovalRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub approval_repository: ApprovalRepository,
    pub mailer: Mailer,
    pub rate_limiter: RateLimiter,
    pub token_ttl: chrono::Duration,
}
