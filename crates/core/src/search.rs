//! Search box behaviour: query-parameter rewriting and debouncing.
//!
//! Typing into the invoice search box rewrites the current URL's query string
//! (`page` reset to `1`, `query` set or removed) and replaces the current
//! navigation entry. Updates are debounced: only the last keystroke in a burst
//! produces a navigation.

use std::ops::Add;
use std::time::Duration;

use url::form_urlencoded;

/// Quiet period before a search term is applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Query parameter holding the search term.
pub const QUERY_PARAM: &str = "query";

/// Query parameter holding the 1-based page number.
pub const PAGE_PARAM: &str = "page";

/// Rewrite `current_query` for a new search `term`.
///
/// Existing parameters keep their position. `page` is always set to `1`;
/// `query` is set to `term`, or removed when `term` is empty. A leading `?`
/// on `current_query` is ignored.
///
/// ```
/// use invoicedash_core::search_query;
///
/// assert_eq!(search_query("", "lee"), "page=1&query=lee");
/// assert_eq!(search_query("?query=lee&page=3", ""), "page=1");
/// ```
#[must_use]
pub fn search_query(current_query: &str, term: &str) -> String {
    let current = current_query.strip_prefix('?').unwrap_or(current_query);
    let mut params: Vec<(String, String)> = form_urlencoded::parse(current.as_bytes())
        .into_owned()
        .collect();

    set_param(&mut params, PAGE_PARAM, "1");
    if term.is_empty() {
        params.retain(|(key, _)| key != QUERY_PARAM);
    } else {
        set_param(&mut params, QUERY_PARAM, term);
    }

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

/// Navigation target for a new search `term`: `pathname?<rewritten query>`.
///
/// ```
/// use invoicedash_core::search_target;
///
/// assert_eq!(
///     search_target("/dashboard/invoices", "", "lee"),
///     "/dashboard/invoices?page=1&query=lee",
/// );
/// ```
#[must_use]
pub fn search_target(pathname: &str, current_query: &str, term: &str) -> String {
    format!("{pathname}?{}", search_query(current_query, term))
}

/// Rewrite `current_query` to point at `page`, keeping every other parameter.
///
/// ```
/// use invoicedash_core::search::with_page;
///
/// assert_eq!(with_page("query=lee&page=1", 2), "query=lee&page=2");
/// ```
#[must_use]
pub fn with_page(current_query: &str, page: u32) -> String {
    let current = current_query.strip_prefix('?').unwrap_or(current_query);
    let mut params: Vec<(String, String)> = form_urlencoded::parse(current.as_bytes())
        .into_owned()
        .collect();
    set_param(&mut params, PAGE_PARAM, &page.to_string());
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

/// Replace the first `key` entry in place and drop any others; append if absent.
fn set_param(params: &mut Vec<(String, String)>, key: &str, value: &str) {
    let mut seen = false;
    params.retain_mut(|(k, v)| {
        if k != key {
            return true;
        }
        if seen {
            return false;
        }
        seen = true;
        value.clone_into(v);
        true
    });
    if !seen {
        params.push((key.to_owned(), value.to_owned()));
    }
}

/// Trailing-edge debounce as an explicit state machine.
///
/// The machine is either idle or holds exactly one pending value with a
/// deadline. [`push`](Self::push) cancels any pending value and schedules the
/// new one `delay` after `now`; [`fire`](Self::fire) yields the pending value
/// once its deadline has passed. Time is supplied by the caller, so the same
/// machine runs under `std::time::Instant`, `tokio::time::Instant`, or a test
/// clock.
#[derive(Debug, Clone)]
pub struct Debouncer<T, I = std::time::Instant> {
    delay: Duration,
    pending: Option<(I, T)>,
}

impl<T, I> Debouncer<T, I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create an idle debouncer.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// The configured quiet period.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, replacing whatever was pending. Returns the new deadline.
    pub fn push(&mut self, now: I, value: T) -> I {
        let deadline = now + self.delay;
        self.pending = Some((deadline, value));
        deadline
    }

    /// Deadline of the pending value, or `None` when idle.
    #[must_use]
    pub fn deadline(&self) -> Option<I> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Whether a value is waiting for its deadline.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its deadline is at or before `now`.
    pub fn fire(&mut self, now: I) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// Drop the pending value without firing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }
}
