//! Invoice storage.
//!
//! # Tables
//!
//! - `invoices` - `id` (UUID), `customer_id`, `amount` (integer cents),
//!   `status` (`pending` | `paid`), `date`
//! - `customers` - `id`, `name`, `email`, `image_url`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p invoicedash-cli -- migrate
//! ```
//!
//! Handlers talk to storage through the [`InvoiceStore`] trait. The
//! `PostgreSQL` implementation backs the server; the in-memory one backs tests.

pub mod memory;
pub mod postgres;
pub mod seed;

use std::time::Duration;

use async_trait::async_trait;
use invoicedash_core::InvoiceId;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::models::{CardData, Customer, Invoice, InvoiceChanges, InvoiceListItem, NewInvoice};

pub use memory::MemoryInvoiceStore;
pub use postgres::PgInvoiceStore;

/// Invoices shown per listing page.
pub const ITEMS_PER_PAGE: u32 = 6;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The backing store cannot be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence operations used by the dashboard.
///
/// Writes report the number of affected rows; a missing id is `Ok(0)`, never
/// an error.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a new invoice row.
    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<(), StoreError>;

    /// Overwrite `customer_id`, `amount` and `status` of the invoice with `id`.
    async fn update_invoice(
        &self,
        id: InvoiceId,
        changes: &InvoiceChanges,
    ) -> Result<u64, StoreError>;

    /// Delete the invoice with `id`.
    async fn delete_invoice(&self, id: InvoiceId) -> Result<u64, StoreError>;

    /// Fetch a single invoice.
    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError>;

    /// One page (1-based) of invoices matching `query`, newest first.
    async fn filtered_invoices(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<InvoiceListItem>, StoreError>;

    /// Number of pages of invoices matching `query`.
    async fn invoice_pages(&self, query: &str) -> Result<u32, StoreError>;

    /// The `limit` most recent invoices.
    async fn latest_invoices(&self, limit: u32) -> Result<Vec<InvoiceListItem>, StoreError>;

    /// Totals for the dashboard cards.
    async fn card_data(&self) -> Result<CardData, StoreError>;

    /// All customers, ordered by name.
    async fn customers(&self) -> Result<Vec<Customer>, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// `ceil(count / ITEMS_PER_PAGE)`.
#[must_use]
pub fn total_pages(count: i64) -> u32 {
    let count = u64::try_from(count).unwrap_or(0);
    let pages = count.div_ceil(u64::from(ITEMS_PER_PAGE));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Row offset of a 1-based page. Page `0` is treated as page `1`.
#[must_use]
pub fn page_offset(page: u32) -> i64 {
    i64::from(page.max(1) - 1) * i64::from(ITEMS_PER_PAGE)
}

/// Build an `ILIKE` pattern that matches `query` anywhere, with `%`, `_` and
/// `\` in the query taken literally.
#[must_use]
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
