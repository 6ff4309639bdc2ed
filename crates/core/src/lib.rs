//! Invoicedash Core - Shared types library.
//!
//! This crate provides the types used across all invoice dashboard components:
//! - `web` - Dashboard server (listing, forms, mutations)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types, validation and pure URL logic - no I/O,
//! no database access, no HTTP server. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, money and invoice status
//! - [`validation`] - Invoice form validation (create and update variants)
//! - [`search`] - Search query-parameter rewriting and the debounce state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod search;
pub mod types;
pub mod validation;

pub use search::{Debouncer, SEARCH_DEBOUNCE, search_query, search_target};
pub use types::*;
pub use validation::{
    FieldError, FieldErrorKind, InvoiceDraft, InvoiceField, InvoiceForm, ValidationError,
    validate_create, validate_update,
};
