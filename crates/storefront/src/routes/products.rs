//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use fofurices_core::image::resolve_image_url;
use fofurices_core::{Favorites, Product, ProductId};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use super::LayoutView;
use crate::filters;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub href: String,
    pub name: String,
    pub description: String,
    pub price: String,
    /// Embeddable image URL; `None` renders the placeholder.
    pub image_url: Option<String>,
    pub available: bool,
    pub favorite: bool,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, favorites: &Favorites) -> Self {
        Self {
            id: product.id.to_string(),
            href: product_path(&product.id),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price().display(),
            image_url: resolve_image_url(&product.image_url),
            available: product.available,
            favorite: favorites.contains(&product.id),
        }
    }
}

/// Link to a product's detail page.
#[must_use]
pub fn product_path(id: &ProductId) -> String {
    format!("/products/{}", urlencoding::encode(id.as_str()))
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: LayoutView,
    /// `None` renders the not-found message.
    pub product: Option<ProductView>,
    pub return_to: String,
}

/// Display product detail page.
///
/// A product missing from the catalog may have just been added to the
/// sheet, so the catalog is refreshed once before giving up. The refresh is
/// bounded by the catalog's startup wait; past it the not-found page is
/// rendered.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let id = ProductId::new(id);

    let mut product = state.catalog().product(&id).cloned();
    if product.is_none() {
        debug!(product_id = %id, "Product not in catalog, refreshing");
        let wait = state.config().catalog.startup_wait;
        if timeout(wait, state.loader().refresh()).await.is_err() {
            warn!(product_id = %id, wait_secs = wait.as_secs(), "Refresh timed out");
        }
        product = state.catalog().product(&id).cloned();
    }

    let status = if product.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    let favorites = state.favorites().favorites().await;

    (
        status,
        ProductShowTemplate {
            layout: LayoutView::new(&state).await,
            product: product.as_ref().map(|p| ProductView::new(p, &favorites)),
            return_to: product_path(&id),
        },
    )
}
