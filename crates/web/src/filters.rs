//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::NaiveDate;

/// Formats an ISO date (`2024-03-05`) as `Mar 5, 2024`.
///
/// Values that are not ISO dates are passed through unchanged.
///
/// Usage in templates: `{{ invoice.date|short_date }}`
#[askama::filter_fn]
pub fn short_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_short_date(&value.to_string()))
}

fn format_short_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_or_else(|_| raw.to_string(), |date| date.format("%b %-d, %Y").to_string())
}
