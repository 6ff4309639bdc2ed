//! Customer model.

use invoicedash_core::CustomerId;

/// A customer that invoices can be issued to.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Customer {
    /// Opaque text identifier.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Avatar path, if any.
    pub image_url: Option<String>,
}
