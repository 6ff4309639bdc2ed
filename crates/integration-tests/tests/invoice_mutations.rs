//! Integration tests for invoice create, update and delete.
//!
//! Requests go through the full router with an in-memory store.

use axum::http::StatusCode;
use chrono::Utc;
use invoicedash_core::{Cents, InvoiceStatus};
use invoicedash_integration_tests::{TestApp, body_text, location};

const INVOICES: &str = "/dashboard/invoices";

async fn create(app: &TestApp, customer: &str, amount: &str, status: &str) {
    let response = app
        .post_form(
            INVOICES,
            &[("customerId", customer), ("amount", amount), ("status", status)],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_stores_cents_and_redirects() {
    let app = TestApp::new();

    let response = app
        .post_form(
            INVOICES,
            &[("customerId", "c1"), ("amount", "42.50"), ("status", "pending")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), INVOICES);

    let invoices = app.store.all_invoices().await;
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].amount, Cents::new(4250));
    assert_eq!(invoices[0].status, InvoiceStatus::Pending);
    assert_eq!(invoices[0].date, Utc::now().date_naive());
}

#[tokio::test]
async fn test_create_ignores_client_id_and_date() {
    let app = TestApp::new();

    app.post_form(
        INVOICES,
        &[
            ("id", "3958dc9e-712f-4377-85e9-fec4b6a6442a"),
            ("customerId", "c1"),
            ("amount", "1"),
            ("status", "paid"),
            ("date", "1999-01-01"),
        ],
    )
    .await;

    let invoice = app.store.all_invoices().await.remove(0);
    assert_ne!(
        invoice.id.to_string(),
        "3958dc9e-712f-4377-85e9-fec4b6a6442a"
    );
    assert_eq!(invoice.date, Utc::now().date_naive());
}

#[tokio::test]
async fn test_create_repeated_key_uses_first_value() {
    let app = TestApp::new();

    let response = app
        .post_form(
            INVOICES,
            &[
                ("customerId", "c1"),
                ("amount", "5"),
                ("amount", "6"),
                ("status", "paid"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let invoices = app.store.all_invoices().await;
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].amount, Cents::new(500));
}

#[tokio::test]
async fn test_update_repeated_invalid_key_rerenders_form() {
    let app = TestApp::new();
    create(&app, "c1", "10", "pending").await;
    let id = app.store.all_invoices().await[0].id;

    let response = app
        .post_form(
            &format!("{INVOICES}/{id}"),
            &[
                ("customerId", "c1"),
                ("amount", "ten"),
                ("amount", "6"),
                ("status", "paid"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("id=\"amount-error\""));
    assert_eq!(app.store.all_invoices().await[0].amount, Cents::new(1000));
}

#[tokio::test]
async fn test_create_missing_customer_rerenders_form() {
    let app = TestApp::new();

    let response = app
        .post_form(INVOICES, &[("amount", "10"), ("status", "paid")])
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("Please select a customer."));
    assert!(body.contains("value=\"10\""));
    assert_eq!(app.store.writes(), 0);
}

#[tokio::test]
async fn test_create_reports_every_bad_field() {
    let app = TestApp::new();

    let response = app
        .post_form(
            INVOICES,
            &[("customerId", ""), ("amount", "ten"), ("status", "overdue")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("Please select a customer."));
    assert!(body.contains("Expected a number"));
    assert!(body.contains("id=\"status-error\""));
    assert!(app.store.all_invoices().await.is_empty());
}

#[tokio::test]
async fn test_create_storage_failure_is_generic_500() {
    let app = TestApp::new();
    app.store.set_unavailable(true);

    let response = app
        .post_form(
            INVOICES,
            &[("customerId", "c1"), ("amount", "1"), ("status", "paid")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Internal server error");
}

// =============================================================================
// Edit / Update
// =============================================================================

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let app = TestApp::new();
    create(&app, "c2", "42.5", "paid").await;
    let invoice = app.store.all_invoices().await.remove(0);

    let response = app
        .get(&format!("{INVOICES}/{}/edit", invoice.id))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Edit Invoice"));
    assert!(body.contains("value=\"42.50\""));
    assert!(body.contains(&format!("action=\"{INVOICES}/{}\"", invoice.id)));
}

#[tokio::test]
async fn test_edit_unknown_or_malformed_id_is_404() {
    let app = TestApp::new();

    let response = app
        .get(&format!("{INVOICES}/3958dc9e-712f-4377-85e9-fec4b6a6442a/edit"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get(&format!("{INVOICES}/not-a-uuid/edit")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_keeps_id_and_date() {
    let app = TestApp::new();
    create(&app, "c1", "10", "pending").await;
    let before = app.store.all_invoices().await.remove(0);

    let response = app
        .post_form(
            &format!("{INVOICES}/{}", before.id),
            &[("customerId", "c2"), ("amount", "19.99"), ("status", "paid")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), INVOICES);

    let after = app.store.all_invoices().await.remove(0);
    assert_eq!(after.id, before.id);
    assert_eq!(after.date, before.date);
    assert_eq!(after.customer_id.as_str(), "c2");
    assert_eq!(after.amount, Cents::new(1999));
    assert_eq!(after.status, InvoiceStatus::Paid);
}

#[tokio::test]
async fn test_invalid_update_rerenders_edit_form() {
    let app = TestApp::new();
    create(&app, "c1", "10", "pending").await;
    let before = app.store.all_invoices().await.remove(0);

    let response = app
        .post_form(
            &format!("{INVOICES}/{}", before.id),
            &[("customerId", "c1"), ("amount", "10"), ("status", "void")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Edit Invoice"));
    assert_eq!(app.store.all_invoices().await.remove(0), before);
}

#[tokio::test]
async fn test_update_missing_id_redirects_without_creating() {
    let app = TestApp::new();

    let response = app
        .post_form(
            &format!("{INVOICES}/3958dc9e-712f-4377-85e9-fec4b6a6442a"),
            &[("customerId", "c1"), ("amount", "1"), ("status", "paid")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.store.all_invoices().await.is_empty());
}

#[tokio::test]
async fn test_update_malformed_id_is_400() {
    let app = TestApp::new();

    let response = app
        .post_form(
            &format!("{INVOICES}/not-a-uuid"),
            &[("customerId", "c1"), ("amount", "1"), ("status", "paid")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.writes(), 0);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_twice_returns_no_content() {
    let app = TestApp::new();
    create(&app, "c1", "10", "pending").await;
    let id = app.store.all_invoices().await[0].id;
    let uri = format!("{INVOICES}/{id}");

    assert_eq!(app.delete(&uri).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.delete(&uri).await.status(), StatusCode::NO_CONTENT);
    assert!(app.store.all_invoices().await.is_empty());
}

#[tokio::test]
async fn test_delete_from_form_redirects_to_listing() {
    let app = TestApp::new();
    create(&app, "c1", "10", "pending").await;
    let id = app.store.all_invoices().await[0].id;

    let response = app
        .post_form(&format!("{INVOICES}/{id}/delete"), &[])
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), INVOICES);
    assert!(app.store.all_invoices().await.is_empty());
}
