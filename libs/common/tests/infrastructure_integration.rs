//! Integration tests for the shared infrastructure
//!
//! These tests verify that the PostgreSQL database is properly configured
//! and reachable from the application. They require a running PostgreSQL
//! instance and are therefore ignored by default:
//!
//! ```text
//! cargo test -- --ignored
//! ```

use common::database::{DatabaseConfig, health_check, init_pool};
use sqlx::Row;

/// Verifies that PostgreSQL is accessible and can run a basic query
#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize PostgreSQL connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Verify PostgreSQL connectivity
    assert!(health_check(&pool).await?, "Database health check failed");

    // Perform a simple query to test database connectivity
    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;

    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    Ok(())
}
