//! Invoice mutation handlers.
//!
//! Each handler validates the form, writes through the [`InvoiceStore`],
//! invalidates the cached listing and, for create and update, redirects back
//! to it. Validation failures are returned before storage is touched.

use axum::response::Redirect;
use chrono::Utc;
use invoicedash_core::{InvoiceForm, InvoiceId, ValidationError, validate_create, validate_update};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::cache::Revalidate;
use crate::db::{InvoiceStore, StoreError};
use crate::models::{InvoiceChanges, NewInvoice};

/// The invoice listing route. Invalidated after every mutation.
pub const INVOICES_PATH: &str = "/dashboard/invoices";

/// Why a create or update did not go through.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The submitted form is invalid. Nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage rejected the write.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Create an invoice dated today (UTC) with a fresh id.
///
/// # Errors
///
/// Returns [`ActionError::Validation`] without writing when the form is
/// invalid, or [`ActionError::Storage`] if the insert fails.
#[instrument(skip_all)]
pub async fn create_invoice(
    store: &dyn InvoiceStore,
    cache: &dyn Revalidate,
    form: &InvoiceForm,
) -> Result<Redirect, ActionError> {
    let draft = validate_create(form)?;
    let invoice = NewInvoice::from_draft(draft, InvoiceId::generate(), Utc::now().date_naive());

    store.insert_invoice(&invoice).await?;
    info!(invoice_id = %invoice.id, amount = invoice.amount.as_i64(), "Invoice created");

    cache.invalidate(INVOICES_PATH).await;
    Ok(Redirect::to(INVOICES_PATH))
}

/// Overwrite customer, amount and status of invoice `id`.
///
/// An id with no matching row is a successful no-op.
///
/// # Errors
///
/// Returns [`ActionError::Validation`] without writing when the form is
/// invalid, or [`ActionError::Storage`] if the update fails.
#[instrument(skip(store, cache, form), fields(invoice_id = %id))]
pub async fn update_invoice(
    store: &dyn InvoiceStore,
    cache: &dyn Revalidate,
    id: InvoiceId,
    form: &InvoiceForm,
) -> Result<Redirect, ActionError> {
    let changes = InvoiceChanges::from(validate_update(form)?);

    let rows = store.update_invoice(id, &changes).await?;
    if rows == 0 {
        warn!("Update matched no invoice");
    } else {
        info!("Invoice updated");
    }

    cache.invalidate(INVOICES_PATH).await;
    Ok(Redirect::to(INVOICES_PATH))
}

/// Delete invoice `id`. Deleting an id that does not exist succeeds.
///
/// # Errors
///
/// Returns `StoreError` if the delete fails.
#[instrument(skip(store, cache), fields(invoice_id = %id))]
pub async fn delete_invoice(
    store: &dyn InvoiceStore,
    cache: &dyn Revalidate,
    id: InvoiceId,
) -> Result<(), StoreError> {
    let rows = store.delete_invoice(id).await?;
    info!(rows, "Invoice deleted");

    cache.invalidate(INVOICES_PATH).await;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;
    use invoicedash_core::{Cents, CustomerId, InvoiceField, InvoiceStatus};
    use tokio::sync::Mutex;

    use super::*;
    use crate::db::MemoryInvoiceStore;
    use crate::models::Customer;

    #[derive(Default)]
    struct RecordingCache {
        paths: Mutex<Vec<String>>,
    }

    impl RecordingCache {
        async fn paths(&self) -> Vec<String> {
            self.paths.lock().await.clone()
        }
    }

    #[async_trait]
    impl Revalidate for RecordingCache {
        async fn invalidate(&self, path: &str) {
            self.paths.lock().await.push(path.to_string());
        }
    }

    fn store() -> MemoryInvoiceStore {
        MemoryInvoiceStore::with_customers(vec![Customer {
            id: CustomerId::parse("c1").unwrap(),
            name: "Lee Robinson".to_string(),
            email: "lee@robinson.com".to_string(),
            image_url: None,
        }])
    }

    fn form(customer_id: Option<&str>, amount: &str, status: &str) -> InvoiceForm {
        InvoiceForm {
            customer_id: customer_id.map(String::from),
            amount: Some(amount.to_string()),
            status: Some(status.to_string()),
        }
    }

    fn location(redirect: Redirect) -> String {
        let response = redirect.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_create_persists_cents_and_redirects() {
        let store = store();
        let cache = RecordingCache::default();

        let redirect = create_invoice(&store, &cache, &form(Some("c1"), "42.50", "pending"))
            .await
            .unwrap();

        let invoices = store.all_invoices().await;
        assert_eq!(invoices.len(), 1);
        let invoice = &invoices[0];
        assert_eq!(invoice.customer_id.as_str(), "c1");
        assert_eq!(invoice.amount, Cents::new(4250));
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.date, Utc::now().date_naive());

        assert_eq!(cache.paths().await, vec![INVOICES_PATH.to_string()]);
        assert_eq!(location(redirect), INVOICES_PATH);
    }

    #[tokio::test]
    async fn test_create_rounds_to_whole_cents() {
        let store = store();
        let cache = RecordingCache::default();

        create_invoice(&store, &cache, &form(Some("c1"), "0.125", "paid"))
            .await
            .unwrap();

        assert_eq!(store.all_invoices().await[0].amount, Cents::new(13));
    }

    #[tokio::test]
    async fn test_create_missing_customer_writes_nothing() {
        let store = store();
        let cache = RecordingCache::default();

        let err = create_invoice(&store, &cache, &form(None, "10", "paid"))
            .await
            .unwrap_err();

        let ActionError::Validation(err) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(err.has(InvoiceField::CustomerId));
        assert_eq!(store.writes(), 0);
        assert!(cache.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_status() {
        let store = store();
        let cache = RecordingCache::default();

        let err = create_invoice(&store, &cache, &form(Some("c1"), "10", "overdue"))
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::Validation(ref e) if e.has(InvoiceField::Status)));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_date() {
        let store = store();
        let cache = RecordingCache::default();
        create_invoice(&store, &cache, &form(Some("c1"), "10", "pending"))
            .await
            .unwrap();
        let before = store.all_invoices().await.remove(0);

        let redirect = update_invoice(&store, &cache, before.id, &form(Some("c2"), "99.99", "paid"))
            .await
            .unwrap();

        let after = store.get_invoice(before.id).await.unwrap().unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.date, before.date);
        assert_eq!(after.customer_id.as_str(), "c2");
        assert_eq!(after.amount, Cents::new(9999));
        assert_eq!(after.status, InvoiceStatus::Paid);
        assert_eq!(cache.paths().await.len(), 2);
        assert_eq!(location(redirect), INVOICES_PATH);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_silent() {
        let store = store();
        let cache = RecordingCache::default();

        update_invoice(&store, &cache, InvoiceId::generate(), &form(Some("c1"), "1", "paid"))
            .await
            .unwrap();

        assert!(store.all_invoices().await.is_empty());
        assert_eq!(cache.paths().await, vec![INVOICES_PATH.to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_update_leaves_row_untouched() {
        let store = store();
        let cache = RecordingCache::default();
        create_invoice(&store, &cache, &form(Some("c1"), "10", "pending"))
            .await
            .unwrap();
        let before = store.all_invoices().await.remove(0);

        let err = update_invoice(&store, &cache, before.id, &form(Some("c1"), "ten", "paid"))
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::Validation(_)));
        assert_eq!(store.get_invoice(before.id).await.unwrap(), Some(before));
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_an_error() {
        let store = store();
        let cache = RecordingCache::default();
        create_invoice(&store, &cache, &form(Some("c1"), "10", "pending"))
            .await
            .unwrap();
        let id = store.all_invoices().await[0].id;

        delete_invoice(&store, &cache, id).await.unwrap();
        delete_invoice(&store, &cache, id).await.unwrap();

        assert!(store.get_invoice(id).await.unwrap().is_none());
        assert_eq!(cache.paths().await.len(), 3);
    }

    #[tokio::test]
    async fn test_storage_failure_skips_invalidation() {
        let store = store();
        let cache = RecordingCache::default();
        store.set_unavailable(true);

        let err = create_invoice(&store, &cache, &form(Some("c1"), "10", "paid"))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Storage(StoreError::Unavailable(_))));

        let err = delete_invoice(&store, &cache, InvoiceId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(cache.paths().await.is_empty());
    }
}
