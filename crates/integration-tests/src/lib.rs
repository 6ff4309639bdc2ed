//! Integration tests for the invoice dashboard.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no database needed)
//! cargo test -p invoicedash-integration-tests
//!
//! # Database and live-server tests
//! export INVOICEDASH_DATABASE_URL=postgres://localhost/invoicedash_test
//! cargo test -p invoicedash-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `invoice_mutations` - Create, update and delete through the router
//! - `invoice_listing` - Listing, search redirect, pagination and page cache
//! - `postgres_store` - `PgInvoiceStore` against a real database (ignored)
//! - `live_server` - HTTP smoke tests against a running server (ignored)

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use invoicedash_core::CustomerId;
use invoicedash_web::cache::PageCache;
use invoicedash_web::config::PageCacheConfig;
use invoicedash_web::db::MemoryInvoiceStore;
use invoicedash_web::models::Customer;
use invoicedash_web::state::AppState;
use tower::ServiceExt;
use url::form_urlencoded;

/// The router wired to an in-memory store.
pub struct TestApp {
    pub store: Arc<MemoryInvoiceStore>,
    pub router: Router,
}

impl TestApp {
    /// Build an app whose store knows customers `c1` (Lee Robinson) and
    /// `c2` (Delba de Oliveira).
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryInvoiceStore::with_customers(vec![
            customer("c1", "Lee Robinson", "lee@robinson.com"),
            customer("c2", "Delba de Oliveira", "delba@oliveira.com"),
        ]));
        let state = AppState::new(store.clone(), PageCache::new(&PageCacheConfig::default()));
        let router = invoicedash_web::app(state);
        Self { store, router }
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router fails, which it never does for well-formed requests.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// `GET uri`.
    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).expect("valid request"))
            .await
    }

    /// `POST uri` with a url-encoded form body.
    pub async fn post_form(&self, uri: &str, pairs: &[(&str, &str)]) -> Response<Body> {
        let body = url_encode(pairs);
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .expect("valid request"),
        )
        .await
    }

    /// `DELETE uri`.
    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(Request::delete(uri).body(Body::empty()).expect("valid request"))
            .await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a customer fixture.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
pub fn customer(id: &str, name: &str, email: &str) -> Customer {
    Customer {
        id: CustomerId::parse(id).expect("non-empty customer id"),
        name: name.to_string(),
        email: email.to_string(),
        image_url: None,
    }
}

/// Encode `pairs` as `application/x-www-form-urlencoded`.
#[must_use]
pub fn url_encode(pairs: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Read a response body as UTF-8 text.
///
/// # Panics
///
/// Panics if the body cannot be read or is not UTF-8.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// `Location` header of a redirect response.
///
/// # Panics
///
/// Panics if the header is missing or not ASCII.
#[must_use]
pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Location header")
        .to_str()
        .expect("ASCII Location")
        .to_string()
}

/// Database URL for ignored database tests.
#[must_use]
pub fn database_url() -> Option<String> {
    std::env::var("INVOICEDASH_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

/// Base URL of a running server for ignored live tests.
#[must_use]
pub fn base_url() -> String {
    std::env::var("INVOICEDASH_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}
