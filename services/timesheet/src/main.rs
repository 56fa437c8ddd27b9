use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool};

use timesheet::duration::CeilingPolicy;
use timesheet::repositories::{
    ClientRepository, LocationRepository, TechnicianRepository,
    submission::SubmissionRepository, time_entry::TimeEntryRepository,
};
use timesheet::routes;
use timesheet::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting timesheet service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let policy = CeilingPolicy::from_env();
    info!("Duration ceiling policy: {:?}", policy);

    // Initialize repositories
    let time_entry_repository = TimeEntryRepository::new(pool.clone(), policy);
    let submission_repository = SubmissionRepository::new(pool.clone());
    let client_repository = ClientRepository::new(pool.clone());
    let location_repository = LocationRepository::new(pool.clone());
    let technician_repository = TechnicianRepository::new(pool.clone());

    let app_state = AppState {
        db_pool: pool,
        time_entry_repository,
        submission_repository,
        client_repository,
        location_repository,
        technician_repository,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr =
        std::env::var("TIMESHEET_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Timesheet service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
