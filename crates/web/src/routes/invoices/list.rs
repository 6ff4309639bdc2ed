//! Invoice listing and search handlers.

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, RawQuery, State},
    response::{Html, Redirect},
};
use invoicedash_core::search::{PAGE_PARAM, QUERY_PARAM, with_page};
use invoicedash_core::search_target;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::form_urlencoded;

use super::{InvoiceRowView, PageLink, page_links};
use crate::{
    actions::INVOICES_PATH,
    cache::PageKey,
    error::AppError,
    filters,
    state::AppState,
};

/// Search box field carrying the typed term.
const TERM_PARAM: &str = "term";

/// Listing query parameters.
///
/// `page` is kept as text so malformed values fall back to page 1 instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub query: Option<String>,
    pub page: Option<String>,
}

impl ListQuery {
    /// Search term, trimmed. Empty means no filter.
    #[must_use]
    pub fn term(&self) -> &str {
        self.query.as_deref().map_or("", str::trim)
    }

    /// 1-based page number. Missing, malformed or zero values mean page 1.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }

    /// Canonical query string. Used as the page cache key and as the base of
    /// every pagination link, so unknown parameters never reach either.
    fn normalized(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair(PAGE_PARAM, &self.page().to_string());
        if !self.term().is_empty() {
            serializer.append_pair(QUERY_PARAM, self.term());
        }
        serializer.finish()
    }
}

/// Pagination bar entry view.
#[derive(Debug, Clone)]
pub struct PageLinkView {
    pub label: String,
    pub href: Option<String>,
    pub active: bool,
}

/// Invoices list page template.
#[derive(Template)]
#[template(path = "invoices/index.html")]
pub struct InvoicesIndexTemplate {
    pub current_path: String,
    pub invoices: Vec<InvoiceRowView>,
    pub search_value: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub page_links: Vec<PageLinkView>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

fn page_href(current_query: &str, page: u32) -> String {
    format!("{INVOICES_PATH}?{}", with_page(current_query, page))
}

fn link_views(current_query: &str, current: u32, total: u32) -> Vec<PageLinkView> {
    page_links(current, total)
        .into_iter()
        .map(|link| match link {
            PageLink::Page(page) => PageLinkView {
                label: page.to_string(),
                href: (page != current).then(|| page_href(current_query, page)),
                active: page == current,
            },
            PageLink::Ellipsis => PageLinkView {
                label: "...".to_string(),
                href: None,
                active: false,
            },
        })
        .collect()
}

/// Invoices list page handler.
///
/// Rendered pages are served from the page cache until a mutation
/// invalidates the listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let current_query = query.normalized();
    let key = PageKey::new(INVOICES_PATH, Some(&current_query));
    if let Some(html) = state.cache().get(&key).await {
        debug!("Serving cached invoice listing");
        return Ok(Html(html.to_string()));
    }

    let generation = state.cache().generation();
    let term = query.term();
    let page = query.page();
    let store = state.store();

    let invoices = store.filtered_invoices(term, page).await?;
    let total_pages = store.invoice_pages(term).await?;

    let template = InvoicesIndexTemplate {
        current_path: INVOICES_PATH.to_string(),
        invoices: invoices.iter().map(InvoiceRowView::from).collect(),
        search_value: term.to_string(),
        current_page: page,
        total_pages,
        page_links: link_views(&current_query, page, total_pages),
        prev_href: (page > 1).then(|| page_href(&current_query, page - 1)),
        next_href: (page < total_pages).then(|| page_href(&current_query, page + 1)),
    };

    let html: Arc<str> = template.render()?.into();
    state.cache().insert(key, Arc::clone(&html), generation).await;

    Ok(Html(html.to_string()))
}

/// Search box submit handler.
///
/// Takes the typed `term` plus the listing's current parameters, applies the
/// search rewrite (`page` reset to 1, `query` set or removed) and redirects
/// to the resulting listing URL.
#[instrument]
pub async fn search(RawQuery(raw_query): RawQuery) -> Redirect {
    let raw = raw_query.unwrap_or_default();
    let mut term = String::new();
    let mut current = form_urlencoded::Serializer::new(String::new());

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        if key == TERM_PARAM {
            term = value.into_owned();
        } else {
            current.append_pair(&key, &value);
        }
    }

    Redirect::to(&search_target(INVOICES_PATH, &current.finish(), &term))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(query: Option<&str>, page: Option<&str>) -> ListQuery {
        ListQuery {
            query: query.map(String::from),
            page: page.map(String::from),
        }
    }

    #[test]
    fn test_page_defaults_to_one() {
        assert_eq!(query(None, None).page(), 1);
        assert_eq!(query(None, Some("0")).page(), 1);
        assert_eq!(query(None, Some("-2")).page(), 1);
        assert_eq!(query(None, Some("abc")).page(), 1);
        assert_eq!(query(None, Some("4")).page(), 4);
    }

    #[test]
    fn test_normalized_key_ignores_noise() {
        assert_eq!(
            query(Some(" lee "), Some("x")).normalized(),
            query(Some("lee"), None).normalized()
        );
        assert_eq!(query(Some("lee"), Some("2")).normalized(), "page=2&query=lee");
        assert_eq!(query(None, None).normalized(), "page=1");
        assert_eq!(query(Some("  "), Some("3")).normalized(), "page=3");
    }

    #[test]
    fn test_link_views_mark_current_page() {
        let views = link_views("query=lee&page=2", 2, 3);
        assert_eq!(views.len(), 3);
        assert!(views[1].active);
        assert!(views[1].href.is_none());
        assert_eq!(
            views[2].href.as_deref(),
            Some("/dashboard/invoices?query=lee&page=3")
        );
    }
}
