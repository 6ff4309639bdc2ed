//! Invoice create, edit and delete handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use invoicedash_core::{InvoiceField, InvoiceForm, InvoiceId, InvoiceStatus, ValidationError};
use tracing::instrument;

use crate::{
    actions::{self, ActionError, INVOICES_PATH},
    error::AppError,
    models::{Customer, Invoice},
    state::AppState,
};

/// Raw form body. Repeated keys are kept so the first value can win.
type FormPairs = Vec<(String, String)>;

/// Customer picker option view.
#[derive(Debug, Clone)]
pub struct CustomerOptionView {
    pub id: String,
    pub name: String,
}

impl From<&Customer> for CustomerOptionView {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.to_string(),
            name: customer.name.clone(),
        }
    }
}

/// Values shown in the form inputs.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    pub customer_id: String,
    pub amount: String,
    pub status: String,
}

impl From<&InvoiceForm> for FormValues {
    fn from(form: &InvoiceForm) -> Self {
        Self {
            customer_id: form.customer_id.clone().unwrap_or_default(),
            amount: form.amount.clone().unwrap_or_default(),
            status: form.status.clone().unwrap_or_default(),
        }
    }
}

impl From<&Invoice> for FormValues {
    fn from(invoice: &Invoice) -> Self {
        Self {
            customer_id: invoice.customer_id.to_string(),
            amount: invoice.amount.to_units().to_string(),
            status: invoice.status.to_string(),
        }
    }
}

/// Per-field messages shown under the inputs.
#[derive(Debug, Clone, Default)]
pub struct FormErrors {
    pub customer_id: Option<String>,
    pub amount: Option<String>,
    pub status: Option<String>,
    pub summary: Option<String>,
}

impl From<&ValidationError> for FormErrors {
    fn from(err: &ValidationError) -> Self {
        let message = |field| err.for_field(field).map(|e| e.message());
        Self {
            customer_id: message(InvoiceField::CustomerId),
            amount: message(InvoiceField::Amount),
            status: message(InvoiceField::Status),
            summary: Some("Missing Fields. Failed to save invoice.".to_string()),
        }
    }
}

/// Status radio option view.
#[derive(Debug, Clone)]
pub struct StatusOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub checked: bool,
}

/// Invoice create/edit form template.
#[derive(Template)]
#[template(path = "invoices/form.html")]
pub struct InvoiceFormTemplate {
    pub current_path: String,
    pub title: String,
    /// Form `action` URL.
    pub action: String,
    pub submit_label: String,
    pub customers: Vec<CustomerOptionView>,
    pub statuses: Vec<StatusOptionView>,
    pub values: FormValues,
    pub errors: FormErrors,
}

impl InvoiceFormTemplate {
    fn create(customers: &[Customer], values: FormValues, errors: FormErrors) -> Self {
        Self::build(
            "Create Invoice",
            INVOICES_PATH.to_string(),
            customers,
            values,
            errors,
        )
    }

    fn edit(id: InvoiceId, customers: &[Customer], values: FormValues, errors: FormErrors) -> Self {
        Self::build(
            "Edit Invoice",
            format!("{INVOICES_PATH}/{id}"),
            customers,
            values,
            errors,
        )
    }

    fn build(
        title: &str,
        action: String,
        customers: &[Customer],
        values: FormValues,
        errors: FormErrors,
    ) -> Self {
        let statuses = InvoiceStatus::ALL
            .iter()
            .map(|status| StatusOptionView {
                value: status.as_str(),
                label: status.label(),
                checked: values.status == status.as_str(),
            })
            .collect();

        Self {
            current_path: INVOICES_PATH.to_string(),
            title: title.to_string(),
            action,
            submit_label: title.to_string(),
            customers: customers.iter().map(CustomerOptionView::from).collect(),
            statuses,
            values,
            errors,
        }
    }

    fn into_html(self, status: StatusCode) -> Result<Response, AppError> {
        Ok((status, Html(self.render()?)).into_response())
    }
}

/// Create form page handler.
#[instrument(skip(state))]
pub async fn new_invoice(State(state): State<AppState>) -> Result<Response, AppError> {
    let customers = state.store().customers().await?;
    InvoiceFormTemplate::create(&customers, FormValues::default(), FormErrors::default())
        .into_html(StatusCode::OK)
}

/// Create invoice handler.
///
/// Redirects to the listing on success; re-renders the form with field
/// messages and `422` when validation fails.
#[instrument(skip(state, pairs))]
pub async fn create(
    State(state): State<AppState>,
    Form(pairs): Form<FormPairs>,
) -> Result<Response, AppError> {
    let form = InvoiceForm::from_pairs(pairs);
    match actions::create_invoice(state.store(), state.cache(), &form).await {
        Ok(redirect) => Ok(redirect.into_response()),
        Err(ActionError::Validation(err)) => {
            let customers = state.store().customers().await?;
            InvoiceFormTemplate::create(&customers, FormValues::from(&form), FormErrors::from(&err))
                .into_html(StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(ActionError::Storage(err)) => Err(err.into()),
    }
}

/// Edit form page handler.
///
/// Responds `404` when the id is malformed or no invoice has it.
#[instrument(skip(state))]
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let not_found = || AppError::NotFound(format!("invoice {id}"));
    let invoice_id: InvoiceId = id.parse().map_err(|_| not_found())?;

    let invoice = state
        .store()
        .get_invoice(invoice_id)
        .await?
        .ok_or_else(not_found)?;
    let customers = state.store().customers().await?;

    InvoiceFormTemplate::edit(
        invoice_id,
        &customers,
        FormValues::from(&invoice),
        FormErrors::default(),
    )
    .into_html(StatusCode::OK)
}

/// Update invoice handler.
#[instrument(skip(state, pairs))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
    Form(pairs): Form<FormPairs>,
) -> Result<Response, AppError> {
    let form = InvoiceForm::from_pairs(pairs);
    match actions::update_invoice(state.store(), state.cache(), id, &form).await {
        Ok(redirect) => Ok(redirect.into_response()),
        Err(ActionError::Validation(err)) => {
            let customers = state.store().customers().await?;
            InvoiceFormTemplate::edit(id, &customers, FormValues::from(&form), FormErrors::from(&err))
                .into_html(StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(ActionError::Storage(err)) => Err(err.into()),
    }
}

/// Delete invoice handler for scripted callers.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
) -> Result<StatusCode, AppError> {
    actions::delete_invoice(state.store(), state.cache(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete invoice handler for the listing's delete buttons.
#[instrument(skip(state))]
pub async fn delete_from_form(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
) -> Result<Redirect, AppError> {
    actions::delete_invoice(state.store(), state.cache(), id).await?;
    Ok(Redirect::to(INVOICES_PATH))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use invoicedash_core::validate_create;

    use super::*;

    #[test]
    fn test_form_errors_from_validation() {
        let form = InvoiceForm {
            customer_id: None,
            amount: Some("x".to_string()),
            status: Some("paid".to_string()),
        };
        let errors = FormErrors::from(&validate_create(&form).unwrap_err());
        assert_eq!(errors.customer_id.as_deref(), Some("Please select a customer."));
        assert!(errors.amount.is_some());
        assert!(errors.status.is_none());
        assert!(errors.summary.is_some());
    }

    #[test]
    fn test_status_options_reflect_value() {
        let values = FormValues {
            status: "paid".to_string(),
            ..FormValues::default()
        };
        let template = InvoiceFormTemplate::create(&[], values, FormErrors::default());
        let checked: Vec<_> = template
            .statuses
            .iter()
            .filter(|s| s.checked)
            .map(|s| s.value)
            .collect();
        assert_eq!(checked, vec!["paid"]);
    }
}
