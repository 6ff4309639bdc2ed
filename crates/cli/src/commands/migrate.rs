//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! invoicedash migrate
//! ```
//!
//! # Environment Variables
//!
//! - `INVOICEDASH_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/web/migrations/` and are embedded at compile time.

use super::{CommandError, connect};

/// Run the dashboard database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or
/// a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
