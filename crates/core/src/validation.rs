//! Invoice form validation.
//!
//! Forms arrive as string key/value pairs. Validation turns them into an
//! [`InvoiceDraft`] or a [`ValidationError`] listing every failing field.
//! Failures are ordinary values; callers re-render the form with them.
//!
//! `id` and `date` are server-assigned and never read from the form: unknown
//! keys are ignored during deserialization.

use core::fmt;

use serde::Deserialize;

use crate::types::{Amount, AmountError, CustomerId, InvoiceStatus, StatusError};

/// Raw invoice form as submitted. Every field is an optional string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceForm {
    pub customer_id: Option<String>,
    pub amount: Option<String>,
    pub status: Option<String>,
}

impl InvoiceForm {
    /// Build a form from arbitrary key/value pairs.
    ///
    /// Recognizes `customerId`, `amount` and `status`; everything else,
    /// including `id` and `date`, is dropped. When a key repeats, the first
    /// occurrence wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "customerId" => &mut form.customer_id,
                "amount" => &mut form.amount,
                "status" => &mut form.status,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        form
    }
}

/// A validated invoice payload, shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub customer_id: CustomerId,
    pub amount: Amount,
    pub status: InvoiceStatus,
}

/// Form fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceField {
    CustomerId,
    Amount,
    Status,
}

impl InvoiceField {
    /// The form key for this field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerId => "customerId",
            Self::Amount => "amount",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for InvoiceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field failed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// The field was absent or blank.
    #[error("is required")]
    Missing,
    /// The amount could not be coerced.
    #[error(transparent)]
    Amount(#[from] AmountError),
    /// The status is not one of the allowed values.
    #[error(transparent)]
    Status(#[from] StatusError),
}

/// A single field failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {kind}")]
pub struct FieldError {
    pub field: InvoiceField,
    pub kind: FieldErrorKind,
}

impl FieldError {
    /// Message suitable for display next to the form input.
    #[must_use]
    pub fn message(&self) -> String {
        match (&self.field, &self.kind) {
            (InvoiceField::CustomerId, FieldErrorKind::Missing) => {
                "Please select a customer.".to_string()
            }
            (InvoiceField::Amount, FieldErrorKind::Missing) => {
                "Please enter an amount.".to_string()
            }
            (InvoiceField::Status, FieldErrorKind::Missing) => {
                "Please select an invoice status.".to_string()
            }
            (_, kind) => {
                let text = kind.to_string();
                let mut chars = text.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect::<String>() + "."
                })
            }
        }
    }
}

/// The form failed validation. Holds at least one [`FieldError`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid invoice: {}", join_errors(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// First error recorded for `field`, if any.
    #[must_use]
    pub fn for_field(&self, field: InvoiceField) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    /// Whether `field` failed.
    #[must_use]
    pub fn has(&self, field: InvoiceField) -> bool {
        self.for_field(field).is_some()
    }
}

/// Validate a create submission.
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every failing field.
pub fn validate_create(form: &InvoiceForm) -> Result<InvoiceDraft, ValidationError> {
    validate_fields(form)
}

/// Validate an update submission.
///
/// The field set matches create; the invoice id is supplied separately.
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every failing field.
pub fn validate_update(form: &InvoiceForm) -> Result<InvoiceDraft, ValidationError> {
    validate_fields(form)
}

fn validate_fields(form: &InvoiceForm) -> Result<InvoiceDraft, ValidationError> {
    let mut errors = Vec::new();

    let customer_id = required(form.customer_id.as_deref())
        .and_then(|raw| CustomerId::parse(raw).map_err(|_| FieldErrorKind::Missing))
        .map_err(|kind| {
            errors.push(FieldError {
                field: InvoiceField::CustomerId,
                kind,
            });
        })
        .ok();

    let amount = required(form.amount.as_deref())
        .and_then(|raw| Amount::parse(raw).map_err(FieldErrorKind::from))
        .map_err(|kind| {
            errors.push(FieldError {
                field: InvoiceField::Amount,
                kind,
            });
        })
        .ok();

    let status = required(form.status.as_deref())
        .and_then(|raw| raw.parse::<InvoiceStatus>().map_err(FieldErrorKind::from))
        .map_err(|kind| {
            errors.push(FieldError {
                field: InvoiceField::Status,
                kind,
            });
        })
        .ok();

    match (customer_id, amount, status) {
        (Some(customer_id), Some(amount), Some(status)) => Ok(InvoiceDraft {
            customer_id,
            amount,
            status,
        }),
        _ => Err(ValidationError { errors }),
    }
}

fn required(value: Option<&str>) -> Result<&str, FieldErrorKind> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(FieldErrorKind::Missing),
    }
}
