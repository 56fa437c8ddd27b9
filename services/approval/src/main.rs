use anyhow::Result;
use std::net::SocketAddr;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool};

use approval::AppState;
use approval::mailer::{Mailer, MailerConfig};
use approval::rate_limiter::{RateLimiter, RateLimiterConfig};
use approval::repository::ApprovalRepository;
use approval::{routes, token};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting approval service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize the mailer; the approval flow cannot run without SMTP
    let mailer_config = MailerConfig::from_env()?;
    let mailer = Mailer::new(mailer_config);

    let approval_repository = ApprovalRepository::new(pool.clone());
    let rate_limiter = RateLimiter::new(RateLimiterConfig::default());
    let token_ttl = token::token_ttl();

    info!("Approval service initialized successfully");

    let app_state = AppState {
        db_pool: pool,
        approval_repository,
        mailer,
        rate_limiter,
        token_ttl,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr =
        std::env::var("APPROVAL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3002".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Approval service listening on {}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
