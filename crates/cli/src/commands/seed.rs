//! Seed the database with placeholder customers and invoices.
//!
//! Safe to run repeatedly: existing rows are left untouched.

use tracing::info;

use invoicedash_web::db::seed;

use super::{CommandError, connect};

/// Insert placeholder data.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or
/// an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    let report = seed::seed(&pool).await?;

    info!("Seeding complete!");
    info!("  Customers inserted: {}", report.customers);
    info!("  Invoices inserted: {}", report.invoices);

    Ok(())
}
