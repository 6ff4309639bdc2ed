//! Placeholder data for local development.
//!
//! Seeding is idempotent: rows that already exist are left alone.

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::StoreError;

/// A seeded customer: id, name, email, avatar.
const CUSTOMERS: &[(&str, &str, &str, &str)] = &[
    (
        "d6e15727-9fe1-4961-8c5b-ea44a9bd81aa",
        "Evil Rabbit",
        "evil@rabbit.com",
        "/customers/evil-rabbit.png",
    ),
    (
        "3958dc9e-712f-4377-85e9-fec4b6a6442a",
        "Delba de Oliveira",
        "delba@oliveira.com",
        "/customers/delba-de-oliveira.png",
    ),
    (
        "3958dc9e-742f-4377-85e9-fec4b6a6442a",
        "Lee Robinson",
        "lee@robinson.com",
        "/customers/lee-robinson.png",
    ),
    (
        "76d65c26-f784-44a2-ac19-586678f7c2f2",
        "Michael Novotny",
        "michael@novotny.com",
        "/customers/michael-novotny.png",
    ),
    (
        "cc27c14a-0acf-4f4a-a6c9-d45682c144b9",
        "Amy Burns",
        "amy@burns.com",
        "/customers/amy-burns.png",
    ),
    (
        "13d07535-c59e-4157-a011-f8d2ef4e0cbb",
        "Balazs Orban",
        "balazs@orban.com",
        "/customers/balazs-orban.png",
    ),
];

/// A seeded invoice: id, customer index, cents, status, date.
const INVOICES: &[(&str, usize, i64, &str, &str)] = &[
    ("6b0c2a5e-59a4-4a0b-9a3c-0d6a1f1e2b01", 0, 15_795, "pending", "2022-12-06"),
    ("6b0c2a5e-59a4-4a0b-9a3c-0d6a1f1e2b02", 1, 20_348, "pending", "2022-11-14"),
    ("6b0c2a5e-59a4-4a0b-9a3c-0d6a1f1e2b03", 4, 3_040, "paid", "2022-10-29"),
    ("6b0c2a5e-59a4-4a0b-9a3c-0d6a1f1e2b04", 3, 44_800, "paid", "2023-09-10"),
    ("6b0c2a5e-59a4-4a0b-9a3c-0d6a1f1e2b05", 5, 34_577, "pending", "2023-08-05"),
    ("6b0c2a5e-59a4-4a0b-9a3c-0d6a1f1e2b06", 2, 54_246, "pending", "2023-07-16"),
    ("6b0c2a5e-59a4-4a0b-9a3c-0d6a1f1e2b07", 0, 666, "pending", "2023-06-27"),
    ("6b0c2a5e-59a4-4a0b-9a3c-0d6a1f1e2b08", 3, 32_545, "paid", "2023-06-09"),
    ("6b0c2a5e-59a4-4a0b-9a3c-0d6a1f1e2b09", 4, 1_250, "paid", "2023-06-17"),
    ("6b0c2a5e-59a4-4a0b-9a3c-0d6a1f1e2b10", 5, 8_546, "paid", "2023-06-07"),
    ("6b0c2a5e-59a4-4a0b-9a3c-0d6a1f1e2b11", 1, 500, "paid", "2023-08-19"),
    ("6b0c2a5e-59a4-4a0b-9a3c-0d6a1f1e2b12", 5, 8_945, "paid", "2023-06-03"),
    ("6b0c2a5e-59a4-4a0b-9a3c-0d6a1f1e2b13", 2, 1_000, "paid", "2022-06-05"),
];

/// Counts of rows inserted by [`seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub customers: u64,
    pub invoices: u64,
}

/// Insert the placeholder customers and invoices.
///
/// # Errors
///
/// Returns `StoreError` if a statement fails or the placeholder data is malformed.
pub async fn seed(pool: &PgPool) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();

    for (id, name, email, image_url) in CUSTOMERS {
        let result = sqlx::query(
            r"
            INSERT INTO customers (id, name, email, image_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(*id)
        .bind(*name)
        .bind(*email)
        .bind(*image_url)
        .execute(pool)
        .await?;
        report.customers += result.rows_affected();
    }

    for (id, customer, amount, status, date) in INVOICES {
        let id = Uuid::parse_str(id).map_err(|e| StoreError::DataCorruption(e.to_string()))?;
        let customer_id = CUSTOMERS
            .get(*customer)
            .map(|(customer_id, ..)| *customer_id)
            .ok_or_else(|| StoreError::DataCorruption(format!("no customer #{customer}")))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| StoreError::DataCorruption(e.to_string()))?;

        let result = sqlx::query(
            r"
            INSERT INTO invoices (id, customer_id, amount, status, date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(id)
        .bind(customer_id)
        .bind(*amount)
        .bind(*status)
        .bind(date)
        .execute(pool)
        .await?;
        report.invoices += result.rows_affected();
    }

    info!(
        customers = report.customers,
        invoices = report.invoices,
        "Seeded placeholder data"
    );

    Ok(report)
}
