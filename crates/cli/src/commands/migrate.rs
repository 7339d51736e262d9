//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `THREEWORDS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/web/migrations/` and are embedded at compile time:
//! ```text
//! migrations/
//! ├── 20260101000001_create_profiles.sql
//! ├── 20260101000002_create_word_submissions.sql
//! ├── 20260101000003_create_accounts.sql
//! └── 20260101000004_create_sessions.sql
//! ```

use std::collections::HashSet;

use sqlx::PgPool;
use sqlx::migrate::{Migrate, Migrator};

static MIGRATOR: Migrator = sqlx::migrate!("../web/migrations");

/// Errors from the migration commands.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

fn database_url() -> Result<String, MigrationError> {
    dotenvy::dotenv().ok();

    std::env::var("THREEWORDS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("THREEWORDS_DATABASE_URL"))
}

async fn connect() -> Result<PgPool, MigrationError> {
    let url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(&url).await?)
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

/// Log each known migration and whether it has been applied.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn status() -> Result<(), MigrationError> {
    let pool = connect().await?;
    let mut conn = pool.acquire().await?;

    conn.ensure_migrations_table().await?;
    let applied: HashSet<i64> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect();

    for migration in MIGRATOR.iter() {
        let state = if applied.contains(&migration.version) {
            "applied"
        } else {
            "pending"
        };
        tracing::info!(
            version = migration.version,
            description = %migration.description,
            "{state}"
        );
    }

    Ok(())
}
