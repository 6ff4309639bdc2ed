//! Application state shared across handlers.

use std::sync::Arc;

use crate::cache::PageCache;
use crate::db::InvoiceStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the invoice store and the rendered page cache.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn InvoiceStore>,
    cache: PageCache,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn InvoiceStore>, cache: PageCache) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, cache }),
        }
    }

    /// Get a reference to the invoice store.
    #[must_use]
    pub fn store(&self) -> &dyn InvoiceStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the rendered page cache.
    #[must_use]
    pub fn cache(&self) -> &PageCache {
        &self.inner.cache
    }
}
