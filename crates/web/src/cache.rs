//! Rendered page cache and route invalidation.
//!
//! Listing pages are cached by path and query string using `moka` with a
//! TTL. Mutations call [`Revalidate::invalidate`] with the listing path so the
//! next request re-renders from storage.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use moka::future::Cache;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::PageCacheConfig;

/// Marks cached views of a route as stale.
#[async_trait]
pub trait Revalidate: Send + Sync {
    /// Drop every cached rendering of `path`, whatever its query string.
    async fn invalidate(&self, path: &str);
}

/// Cache key: request path plus raw query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub path: String,
    pub query: String,
}

impl PageKey {
    /// Build a key from a path and an optional query string.
    #[must_use]
    pub fn new(path: impl Into<String>, query: Option<&str>) -> Self {
        Self {
            path: path.into(),
            query: query.unwrap_or_default().to_string(),
        }
    }
}

/// Cache of rendered HTML pages.
///
/// Cheaply cloneable; clones share the same entries.
///
/// Inserts hold `gate` shared and invalidations hold it exclusively, so a
/// page rendered before an invalidation can never land after it.
#[derive(Clone)]
pub struct PageCache {
    pages: Cache<PageKey, Arc<str>>,
    generation: Arc<AtomicU64>,
    gate: Arc<RwLock<()>>,
}

impl PageCache {
    /// Create a cache with the configured TTL and capacity.
    #[must_use]
    pub fn new(config: &PageCacheConfig) -> Self {
        let pages = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(config.ttl)
            .build();

        Self {
            pages,
            generation: Arc::new(AtomicU64::new(0)),
            gate: Arc::new(RwLock::new(())),
        }
    }

    /// Get a cached page.
    pub async fn get(&self, key: &PageKey) -> Option<Arc<str>> {
        self.pages.get(key).await
    }

    /// Current invalidation generation. Take it before reading storage and
    /// hand it back to [`insert`](Self::insert).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Store a rendered page unless an invalidation happened since
    /// `generation` was read, in which case the page may be stale.
    pub async fn insert(&self, key: PageKey, html: Arc<str>, generation: u64) {
        let _guard = self.gate.read().await;
        if self.generation() != generation {
            debug!(path = %key.path, "Skipping cache insert after invalidation");
            return;
        }
        self.pages.insert(key, html).await;
    }

    /// Number of cached pages. Pending maintenance is run first.
    pub async fn entry_count(&self) -> u64 {
        self.pages.run_pending_tasks().await;
        self.pages.entry_count()
    }
}

#[async_trait]
impl Revalidate for PageCache {
    async fn invalidate(&self, path: &str) {
        let _guard = self.gate.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);

        let stale: Vec<Arc<PageKey>> = self
            .pages
            .iter()
            .filter(|(key, _)| key.path == path)
            .map(|(key, _)| key)
            .collect();

        for key in &stale {
            self.pages.invalidate(key.as_ref()).await;
        }

        debug!(path, pages = stale.len(), "Invalidated cached pages");
    }
}
