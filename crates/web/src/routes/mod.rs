//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//! GET    /health/ready                    - Readiness check (storage ping)
//!
//! # Dashboard
//! GET    /                                - Redirect to /dashboard
//! GET    /dashboard                       - Summary cards and latest invoices
//!
//! # Invoices
//! GET    /dashboard/invoices              - Listing (?query=&page=)
//! POST   /dashboard/invoices              - Create invoice
//! GET    /dashboard/invoices/create       - Create form
//! GET    /dashboard/invoices/search       - Search box submit (?term=)
//! POST   /dashboard/invoices/{id}         - Update invoice
//! DELETE /dashboard/invoices/{id}         - Delete invoice (204)
//! GET    /dashboard/invoices/{id}/edit    - Edit form
//! POST   /dashboard/invoices/{id}/delete  - Delete invoice from a form (303)
//! ```

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

pub mod dashboard;
pub mod health;
pub mod invoices;

/// Build the dashboard router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Dashboard
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/dashboard", get(dashboard::index))
        // Invoices
        .route(
            "/dashboard/invoices",
            get(invoices::list::index).post(invoices::form::create),
        )
        .route("/dashboard/invoices/create", get(invoices::form::new_invoice))
        .route("/dashboard/invoices/search", get(invoices::list::search))
        .route(
            "/dashboard/invoices/{id}",
            post(invoices::form::update).delete(invoices::form::delete),
        )
        .route("/dashboard/invoices/{id}/edit", get(invoices::form::edit))
        .route(
            "/dashboard/invoices/{id}/delete",
            post(invoices::form::delete_from_form),
        )
}
