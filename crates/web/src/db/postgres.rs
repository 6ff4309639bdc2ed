//! `PostgreSQL`-backed invoice store.

use async_trait::async_trait;
use invoicedash_core::InvoiceId;
use sqlx::PgPool;
use tracing::instrument;

use super::{InvoiceStore, StoreError, like_pattern, page_offset, total_pages, ITEMS_PER_PAGE};
use crate::models::{CardData, Customer, Invoice, InvoiceChanges, InvoiceListItem, NewInvoice};

/// Columns of an invoice joined with its customer. Invoices whose customer is
/// unknown still list, showing the raw customer id as the name.
const LIST_COLUMNS: &str = "
    invoices.id,
    invoices.customer_id,
    COALESCE(customers.name, invoices.customer_id) AS name,
    COALESCE(customers.email, '') AS email,
    customers.image_url,
    invoices.amount,
    invoices.status,
    invoices.date";

const LIST_FROM: &str = "
    FROM invoices
    LEFT JOIN customers ON customers.id = invoices.customer_id";

/// Case-insensitive match of `$1` against every searchable column.
const SEARCH_FILTER: &str = "
    WHERE COALESCE(customers.name, invoices.customer_id) ILIKE $1
       OR COALESCE(customers.email, '') ILIKE $1
       OR invoices.amount::text ILIKE $1
       OR invoices.date::text ILIKE $1
       OR invoices.status ILIKE $1";

/// Invoice store over a `PgPool`.
#[derive(Debug, Clone)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id))]
    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO invoices (id, customer_id, amount, status, date)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(invoice.id)
        .bind(&invoice.customer_id)
        .bind(invoice.amount)
        .bind(invoice.status)
        .bind(invoice.date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self, changes), fields(invoice_id = %id))]
    async fn update_invoice(
        &self,
        id: InvoiceId,
        changes: &InvoiceChanges,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r"
            UPDATE invoices
            SET customer_id = $2, amount = $3, status = $4
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&changes.customer_id)
        .bind(changes.amount)
        .bind(changes.status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn delete_invoice(&self, id: InvoiceId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r"
            SELECT id, customer_id, amount, status, date
            FROM invoices
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    #[instrument(skip(self))]
    async fn filtered_invoices(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<InvoiceListItem>, StoreError> {
        let sql = format!(
            "SELECT {LIST_COLUMNS} {LIST_FROM} {SEARCH_FILTER}
             ORDER BY invoices.date DESC, invoices.id
             LIMIT $2 OFFSET $3"
        );

        let invoices = sqlx::query_as::<_, InvoiceListItem>(&sql)
            .bind(like_pattern(query))
            .bind(i64::from(ITEMS_PER_PAGE))
            .bind(page_offset(page))
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }

    #[instrument(skip(self))]
    async fn invoice_pages(&self, query: &str) -> Result<u32, StoreError> {
        let sql = format!("SELECT COUNT(*) {LIST_FROM} {SEARCH_FILTER}");

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(like_pattern(query))
            .fetch_one(&self.pool)
            .await?;

        Ok(total_pages(count))
    }

    #[instrument(skip(self))]
    async fn latest_invoices(&self, limit: u32) -> Result<Vec<InvoiceListItem>, StoreError> {
        let sql = format!(
            "SELECT {LIST_COLUMNS} {LIST_FROM}
             ORDER BY invoices.date DESC, invoices.id
             LIMIT $1"
        );

        let invoices = sqlx::query_as::<_, InvoiceListItem>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }

    /// Totals are summed as `NUMERIC` and saturate at the `BIGINT` range.
    #[instrument(skip(self))]
    async fn card_data(&self) -> Result<CardData, StoreError> {
        let cards = sqlx::query_as::<_, CardData>(
            r"
            SELECT
                (SELECT COUNT(*) FROM invoices) AS number_of_invoices,
                (SELECT COUNT(*) FROM customers) AS number_of_customers,
                (SELECT GREATEST(LEAST(COALESCE(SUM(amount), 0), $1), $2)::BIGINT
                   FROM invoices WHERE status = 'paid') AS total_paid,
                (SELECT GREATEST(LEAST(COALESCE(SUM(amount), 0), $1), $2)::BIGINT
                   FROM invoices WHERE status = 'pending') AS total_pending
            ",
        )
        .bind(i64::MAX)
        .bind(i64::MIN)
        .fetch_one(&self.pool)
        .await?;

        Ok(cards)
    }

    #[instrument(skip(self))]
    async fn customers(&self) -> Result<Vec<Customer>, StoreError> {
        let customers = sqlx::query_as::<_, Customer>(
            r"
            SELECT id, name, email, image_url
            FROM customers
            ORDER BY name ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
