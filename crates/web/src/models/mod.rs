//! Domain models for the dashboard.
//!
//! Row types read from and written to storage. Validation-level types live in
//! `invoicedash_core`.

pub mod customer;
pub mod invoice;

pub use customer::Customer;
pub use invoice::{CardData, Invoice, InvoiceChanges, InvoiceListItem, NewInvoice};
