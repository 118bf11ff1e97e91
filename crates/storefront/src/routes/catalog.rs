//! Catalog page: category filter bar and product grid.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use fofurices_core::{Category, CategoryId};
use serde::Deserialize;
use tracing::instrument;

use super::LayoutView;
use super::products::ProductView;
use crate::filters;
use crate::state::AppState;

/// Category button data for templates.
#[derive(Clone)]
pub struct CategoryView {
    pub href: String,
    pub label: String,
    pub active: bool,
}

impl CategoryView {
    fn new(category: &Category, selected: Option<&CategoryId>) -> Self {
        Self {
            href: format!("/?category={}", urlencoding::encode(category.id.as_str())),
            label: category.label(),
            active: selected == Some(&category.id),
        }
    }
}

/// Catalog query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Active category; absent or empty shows everything.
    pub category: Option<String>,
}

impl CatalogQuery {
    fn selected(&self) -> Option<CategoryId> {
        self.category
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(CategoryId::from)
    }
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogTemplate {
    pub layout: LayoutView,
    pub all_active: bool,
    pub categories: Vec<CategoryView>,
    pub products: Vec<ProductView>,
    pub return_to: String,
}

/// Display the catalog, optionally filtered to one category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let selected = query.selected();
    let catalog = state.catalog();
    let favorites = state.favorites().favorites().await;

    let categories = catalog
        .categories()
        .iter()
        .map(|category| CategoryView::new(category, selected.as_ref()))
        .collect();
    let products = catalog
        .products_in(selected.as_ref())
        .map(|product| ProductView::new(product, &favorites))
        .collect();
    let return_to = selected.as_ref().map_or_else(
        || "/".to_string(),
        |id| format!("/?category={}", urlencoding::encode(id.as_str())),
    );

    CatalogTemplate {
        layout: LayoutView::new(&state).await,
        all_active: selected.is_none(),
        categories,
        products,
        return_to,
    }
}
