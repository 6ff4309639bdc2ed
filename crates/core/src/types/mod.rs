//! Core types for the invoice dashboard.
//!
//! This module provides type-safe wrappers for the domain concepts.

pub mod id;
pub mod money;
pub mod status;

pub use id::*;
pub use money::{Amount, AmountError, Cents};
pub use status::{InvoiceStatus, StatusError};
