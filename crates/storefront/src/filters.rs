//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Pluralizes an item count in Portuguese.
///
/// Usage in templates: `{{ cart.item_count|itens }}` renders `1 item` or `3 itens`.
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn itens(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(count_label(&count.to_string()))
}

fn count_label(count: &str) -> String {
    if count == "1" {
        "1 item".to_string()
    } else {
        format!("{count} itens")
    }
}
