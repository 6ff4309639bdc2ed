//! Dashboard overview handler.

use askama::Template;
use axum::{extract::State, response::Html};
use tracing::instrument;

use super::invoices::InvoiceRowView;
use crate::{error::AppError, models::CardData, state::AppState};

/// Number of invoices in the "latest invoices" panel.
const LATEST_INVOICES: u32 = 5;

/// Summary card view.
#[derive(Debug, Clone)]
pub struct CardView {
    pub title: &'static str,
    pub value: String,
}

impl CardView {
    fn from_data(cards: &CardData) -> Vec<Self> {
        vec![
            Self {
                title: "Collected",
                value: cards.total_paid.format_usd(),
            },
            Self {
                title: "Pending",
                value: cards.total_pending.format_usd(),
            },
            Self {
                title: "Total Invoices",
                value: cards.number_of_invoices.to_string(),
            },
            Self {
                title: "Total Customers",
                value: cards.number_of_customers.to_string(),
            },
        ]
    }
}

/// Dashboard overview template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub current_path: String,
    pub cards: Vec<CardView>,
    pub latest_invoices: Vec<InvoiceRowView>,
}

/// Dashboard overview handler.
///
/// Always rendered from storage so totals reflect the latest mutations.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let store = state.store();
    let (cards, latest) = tokio::try_join!(store.card_data(), store.latest_invoices(LATEST_INVOICES))?;

    let template = DashboardTemplate {
        current_path: "/dashboard".to_string(),
        cards: CardView::from_data(&cards),
        latest_invoices: latest.iter().map(InvoiceRowView::from).collect(),
    };

    Ok(Html(template.render()?))
}
