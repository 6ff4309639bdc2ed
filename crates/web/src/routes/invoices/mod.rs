//! Invoice route handlers and their view types.

pub mod form;
pub mod list;

use invoicedash_core::InvoiceStatus;

use crate::models::InvoiceListItem;

/// Invoice row view for templates.
#[derive(Debug, Clone)]
pub struct InvoiceRowView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    /// Formatted amount, e.g. `$1,234.56`.
    pub amount: String,
    /// ISO date; templates format it with `short_date`.
    pub date: String,
    pub status: InvoiceStatus,
}

impl From<&InvoiceListItem> for InvoiceRowView {
    fn from(item: &InvoiceListItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            email: item.email.clone(),
            image_url: item.image_url.clone(),
            amount: item.amount.format_usd(),
            date: item.date.to_string(),
            status: item.status,
        }
    }
}

/// One entry of the pagination bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLink {
    Page(u32),
    Ellipsis,
}

/// Page numbers to show for `current` of `total` pages.
///
/// Up to seven pages are listed in full; beyond that the first and last
/// pages stay visible around the current one and gaps become ellipses.
#[must_use]
pub fn page_links(current: u32, total: u32) -> Vec<PageLink> {
    use PageLink::{Ellipsis, Page};

    if total <= 7 {
        return (1..=total).map(Page).collect();
    }
    if current <= 3 {
        return vec![Page(1), Page(2), Page(3), Ellipsis, Page(total - 1), Page(total)];
    }
    if current >= total - 2 {
        return vec![Page(1), Page(2), Ellipsis, Page(total - 2), Page(total - 1), Page(total)];
    }
    vec![
        Page(1),
        Ellipsis,
        Page(current - 1),
        Page(current),
        Page(current + 1),
        Ellipsis,
        Page(total),
    ]
}
