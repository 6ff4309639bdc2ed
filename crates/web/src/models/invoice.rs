//! Invoice models.

use chrono::NaiveDate;
use invoicedash_core::{Cents, CustomerId, InvoiceDraft, InvoiceId, InvoiceStatus};

/// A persisted invoice.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Invoice {
    /// Server-assigned identifier. Never changes.
    pub id: InvoiceId,
    /// Customer the invoice is billed to.
    pub customer_id: CustomerId,
    /// Amount in cents.
    pub amount: Cents,
    /// Payment status.
    pub status: InvoiceStatus,
    /// Creation date. Never changes.
    pub date: NaiveDate,
}

/// Parameters for inserting an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    pub amount: Cents,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

impl NewInvoice {
    /// Build an insert from a validated draft, a fresh id and today's date.
    #[must_use]
    pub fn from_draft(draft: InvoiceDraft, id: InvoiceId, date: NaiveDate) -> Self {
        Self {
            id,
            customer_id: draft.customer_id,
            amount: draft.amount.to_cents(),
            status: draft.status,
            date,
        }
    }
}

impl From<NewInvoice> for Invoice {
    fn from(new: NewInvoice) -> Self {
        Self {
            id: new.id,
            customer_id: new.customer_id,
            amount: new.amount,
            status: new.status,
            date: new.date,
        }
    }
}

/// The mutable subset of an invoice. `id` and `date` are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceChanges {
    pub customer_id: CustomerId,
    pub amount: Cents,
    pub status: InvoiceStatus,
}

impl From<InvoiceDraft> for InvoiceChanges {
    fn from(draft: InvoiceDraft) -> Self {
        Self {
            customer_id: draft.customer_id,
            amount: draft.amount.to_cents(),
            status: draft.status,
        }
    }
}

/// An invoice joined with its customer, as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct InvoiceListItem {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    /// Customer name, or the raw customer id when the customer is unknown.
    pub name: String,
    /// Customer email, empty when the customer is unknown.
    pub email: String,
    pub image_url: Option<String>,
    pub amount: Cents,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Figures for the dashboard summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct CardData {
    pub number_of_invoices: i64,
    pub number_of_customers: i64,
    pub total_paid: Cents,
    pub total_pending: Cents,
}
