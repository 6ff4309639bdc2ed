//! In-memory invoice store.
//!
//! Mirrors the `PostgreSQL` queries closely enough for handler and route tests:
//! same ordering, same page size, same case-insensitive search columns.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use invoicedash_core::{Cents, InvoiceId, InvoiceStatus};
use tokio::sync::RwLock;

use super::{InvoiceStore, StoreError, ITEMS_PER_PAGE, page_offset, total_pages};
use crate::models::{CardData, Customer, Invoice, InvoiceChanges, InvoiceListItem, NewInvoice};

/// Invoice store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryInvoiceStore {
    invoices: RwLock<HashMap<InvoiceId, Invoice>>,
    customers: RwLock<Vec<Customer>>,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryInvoiceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `customers`.
    #[must_use]
    pub fn with_customers(customers: Vec<Customer>) -> Self {
        Self {
            customers: RwLock::new(customers),
            ..Self::default()
        }
    }

    /// Number of insert, update and delete calls that reached the store.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent operation fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of all stored invoices, in listing order.
    pub async fn all_invoices(&self) -> Vec<Invoice> {
        let mut invoices: Vec<Invoice> = self.invoices.read().await.values().cloned().collect();
        invoices.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| a.id.as_uuid().cmp(&b.id.as_uuid()))
        });
        invoices
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store disabled".to_string()));
        }
        Ok(())
    }

    async fn list_items(&self) -> Vec<InvoiceListItem> {
        let customers = self.customers.read().await;
        self.all_invoices()
            .await
            .into_iter()
            .map(|invoice| {
                let customer = customers.iter().find(|c| c.id == invoice.customer_id);
                InvoiceListItem {
                    id: invoice.id,
                    name: customer.map_or_else(
                        || invoice.customer_id.to_string(),
                        |c| c.name.clone(),
                    ),
                    email: customer.map(|c| c.email.clone()).unwrap_or_default(),
                    image_url: customer.and_then(|c| c.image_url.clone()),
                    customer_id: invoice.customer_id,
                    amount: invoice.amount,
                    status: invoice.status,
                    date: invoice.date,
                }
            })
            .collect()
    }

    async fn matching(&self, query: &str) -> Vec<InvoiceListItem> {
        let needle = query.to_lowercase();
        self.list_items()
            .await
            .into_iter()
            .filter(|item| matches_query(item, &needle))
            .collect()
    }
}

/// Same columns as the SQL search filter.
fn matches_query(item: &InvoiceListItem, needle: &str) -> bool {
    [
        item.name.to_lowercase(),
        item.email.to_lowercase(),
        item.amount.as_i64().to_string(),
        item.date.format("%Y-%m-%d").to_string(),
        item.status.as_str().to_string(),
    ]
    .iter()
    .any(|haystack| haystack.contains(needle))
}

/// Sum of amounts with `status`, saturating at the `i64` range like the SQL.
fn sum_with_status(invoices: &HashMap<InvoiceId, Invoice>, status: InvoiceStatus) -> Cents {
    let total: i128 = invoices
        .values()
        .filter(|i| i.status == status)
        .map(|i| i128::from(i.amount.as_i64()))
        .sum();
    let clamped = total.clamp(i128::from(i64::MIN), i128::from(i64::MAX));
    Cents::new(i64::try_from(clamped).unwrap_or_default())
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<(), StoreError> {
        self.check_available()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut invoices = self.invoices.write().await;
        if invoices.contains_key(&invoice.id) {
            return Err(StoreError::DataCorruption(format!(
                "duplicate invoice id {}",
                invoice.id
            )));
        }
        invoices.insert(invoice.id, Invoice::from(invoice.clone()));
        Ok(())
    }

    async fn update_invoice(
        &self,
        id: InvoiceId,
        changes: &InvoiceChanges,
    ) -> Result<u64, StoreError> {
        self.check_available()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut invoices = self.invoices.write().await;
        let Some(invoice) = invoices.get_mut(&id) else {
            return Ok(0);
        };
        invoice.customer_id = changes.customer_id.clone();
        invoice.amount = changes.amount;
        invoice.status = changes.status;
        Ok(1)
    }

    async fn delete_invoice(&self, id: InvoiceId) -> Result<u64, StoreError> {
        self.check_available()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let removed = self.invoices.write().await.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError> {
        self.check_available()?;
        Ok(self.invoices.read().await.get(&id).cloned())
    }

    async fn filtered_invoices(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<InvoiceListItem>, StoreError> {
        self.check_available()?;
        let offset = usize::try_from(page_offset(page)).unwrap_or(usize::MAX);
        Ok(self
            .matching(query)
            .await
            .into_iter()
            .skip(offset)
            .take(ITEMS_PER_PAGE as usize)
            .collect())
    }

    async fn invoice_pages(&self, query: &str) -> Result<u32, StoreError> {
        self.check_available()?;
        let count = self.matching(query).await.len();
        Ok(total_pages(i64::try_from(count).unwrap_or(i64::MAX)))
    }

    async fn latest_invoices(&self, limit: u32) -> Result<Vec<InvoiceListItem>, StoreError> {
        self.check_available()?;
        Ok(self
            .list_items()
            .await
            .into_iter()
            .take(limit as usize)
            .collect())
    }

    async fn card_data(&self) -> Result<CardData, StoreError> {
        self.check_available()?;
        let invoices = self.invoices.read().await;
        let customers = self.customers.read().await;
        Ok(CardData {
            number_of_invoices: i64::try_from(invoices.len()).unwrap_or(i64::MAX),
            number_of_customers: i64::try_from(customers.len()).unwrap_or(i64::MAX),
            total_paid: sum_with_status(&invoices, InvoiceStatus::Paid),
            total_pending: sum_with_status(&invoices, InvoiceStatus::Pending),
        })
    }

    async fn customers(&self) -> Result<Vec<Customer>, StoreError> {
        self.check_available()?;
        let mut customers = self.customers.read().await.clone();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use invoicedash_core::CustomerId;

    use super::*;

    fn customer(id: &str, name: &str, email: &str) -> Customer {
        Customer {
            id: CustomerId::parse(id).unwrap(),
            name: name.to_string(),
            email: email.to_string(),
            image_url: None,
        }
    }

    fn new_invoice(customer: &str, cents: i64, status: InvoiceStatus, day: u32) -> NewInvoice {
        NewInvoice {
            id: InvoiceId::generate(),
            customer_id: CustomerId::parse(customer).unwrap(),
            amount: Cents::new(cents),
            status,
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        }
    }

    fn store() -> MemoryInvoiceStore {
        MemoryInvoiceStore::with_customers(vec![
            customer("c1", "Lee Robinson", "lee@robinson.com"),
            customer("c2", "Delba de Oliveira", "delba@oliveira.com"),
        ])
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_ids_are_noops() {
        let store = store();
        let id = InvoiceId::generate();
        let changes = InvoiceChanges {
            customer_id: CustomerId::parse("c1").unwrap(),
            amount: Cents::new(100),
            status: InvoiceStatus::Paid,
        };
        assert_eq!(store.update_invoice(id, &changes).await.unwrap(), 0);
        assert_eq!(store.delete_invoice(id).await.unwrap(), 0);
        assert_eq!(store.writes(), 2);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_across_columns() {
        let store = store();
        store
            .insert_invoice(&new_invoice("c1", 4250, InvoiceStatus::Pending, 1))
            .await
            .unwrap();
        store
            .insert_invoice(&new_invoice("c2", 999, InvoiceStatus::Paid, 2))
            .await
            .unwrap();

        assert_eq!(store.filtered_invoices("LEE", 1).await.unwrap().len(), 1);
        assert_eq!(store.filtered_invoices("oliveira.com", 1).await.unwrap().len(), 1);
        assert_eq!(store.filtered_invoices("4250", 1).await.unwrap().len(), 1);
        assert_eq!(store.filtered_invoices("2024-03", 1).await.unwrap().len(), 2);
        assert_eq!(store.filtered_invoices("paid", 1).await.unwrap().len(), 1);
        assert_eq!(store.filtered_invoices("", 1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_pagination_newest_first() {
        let store = store();
        for day in 1..=8 {
            store
                .insert_invoice(&new_invoice("c1", 100, InvoiceStatus::Paid, day))
                .await
                .unwrap();
        }

        assert_eq!(store.invoice_pages("").await.unwrap(), 2);
        let first = store.filtered_invoices("", 1).await.unwrap();
        assert_eq!(first.len(), 6);
        assert_eq!(first[0].date.to_string(), "2024-03-08");
        let second = store.filtered_invoices("", 2).await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[1].date.to_string(), "2024-03-01");
    }

    #[tokio::test]
    async fn test_unknown_customer_lists_raw_id() {
        let store = store();
        store
            .insert_invoice(&new_invoice("c9", 1, InvoiceStatus::Pending, 1))
            .await
            .unwrap();
        let items = store.latest_invoices(5).await.unwrap();
        assert_eq!(items[0].name, "c9");
        assert_eq!(items[0].email, "");
    }

    #[tokio::test]
    async fn test_card_data_sums_by_status() {
        let store = store();
        store
            .insert_invoice(&new_invoice("c1", 1000, InvoiceStatus::Paid, 1))
            .await
            .unwrap();
        store
            .insert_invoice(&new_invoice("c2", 250, InvoiceStatus::Pending, 2))
            .await
            .unwrap();
        store
            .insert_invoice(&new_invoice("c2", 50, InvoiceStatus::Pending, 3))
            .await
            .unwrap();

        let cards = store.card_data().await.unwrap();
        assert_eq!(cards.number_of_invoices, 3);
        assert_eq!(cards.number_of_customers, 2);
        assert_eq!(cards.total_paid, Cents::new(1000));
        assert_eq!(cards.total_pending, Cents::new(300));
    }

    #[tokio::test]
    async fn test_card_data_saturates_huge_totals() {
        let store = store();
        for day in 1..=2 {
            store
                .insert_invoice(&new_invoice("c1", i64::MAX, InvoiceStatus::Paid, day))
                .await
                .unwrap();
        }

        let cards = store.card_data().await.unwrap();
        assert_eq!(cards.total_paid, Cents::new(i64::MAX));
        assert_eq!(cards.total_pending, Cents::new(0));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = store();
        store.set_unavailable(true);
        assert!(matches!(store.ping().await, Err(StoreError::Unavailable(_))));
        assert!(store.card_data().await.is_err());
        assert_eq!(store.writes(), 0);
    }
}
