//! CLI command implementations.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use invoicedash_web::config::{ConfigError, get_database_url};
use invoicedash_web::db::{self, StoreError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Seeding failed.
    #[error("Seed error: {0}")]
    Seed(#[from] StoreError),
}

/// Connect to the dashboard database named by `INVOICEDASH_DATABASE_URL`
/// (or `DATABASE_URL`).
async fn connect() -> Result<PgPool, CommandError> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    let database_url: SecretString = get_database_url("INVOICEDASH_DATABASE_URL")?;
    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
