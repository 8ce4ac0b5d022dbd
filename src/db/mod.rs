//! Database layer
//!
//! SQLite storage for accounts, role profiles, jobs and the application
//! pipeline. Schema changes live in `migrations/` and are embedded at build
//! time.

pub mod application_repository;
pub mod commander_repository;
pub mod hr_repository;
pub mod interview_repository;
pub mod job_repository;
pub mod resume_repository;
pub mod user_repository;
pub mod volunteer_repository;

pub use application_repository::ApplicationRepository;
pub use commander_repository::CommanderRepository;
pub use hr_repository::HrRepository;
pub use interview_repository::InterviewRepository;
pub use job_repository::JobRepository;
pub use resume_repository::ResumeRepository;
pub use user_repository::UserRepository;
pub use volunteer_repository::VolunteerRepository;

use std::{str::FromStr, time::Duration};

use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};
use tracing::info;

use crate::config::DatabaseConfig;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Open the connection pool and bring the schema up to date
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .with_context(|| format!("Invalid database URL: {}", config.url))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Apply any pending embedded migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations applied");
    Ok(())
}

/// Cheap round trip used by the readiness probe
pub async fn check_health(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .context("Database health check failed")?;
    Ok(())
}
