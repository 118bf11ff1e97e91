//! HTTP route handlers for storefront.
//!
//! Pages are pure functions of [`AppState`]: each handler builds a view model
//! and hands it to an askama template. Shopper actions are plain HTML form
//! posts that mutate the cart or favorites and redirect back (POST/redirect/GET).
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Catalog (categories + products, ?category=<id>)
//! GET  /products/{id}          - Product detail
//! GET  /favorites              - Favorites list
//! POST /favorites/toggle       - Add or remove a favorite (redirects to return_to)
//! POST /favorites/remove       - Remove a favorite (redirects to /favorites)
//! GET  /cart                   - Cart page with total
//! POST /cart/add               - Add one unit (redirects to return_to or /cart)
//! POST /cart/update            - Set a line's quantity, <= 0 removes (redirects to /cart)
//! POST /cart/remove            - Remove a line (redirects to /cart)
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (startup load finished)
//! ```

pub mod cart;
pub mod catalog;
pub mod favorites;
pub mod health;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use crate::state::AppState;

/// Data every page's layout needs.
#[derive(Clone)]
pub struct LayoutView {
    pub store_name: String,
    pub cart_count: u64,
}

impl LayoutView {
    pub async fn new(state: &AppState) -> Self {
        Self {
            store_name: state.config().store_name.clone(),
            cart_count: state.cart().cart().await.item_count(),
        }
    }
}

/// Form posted by the add-to-cart and favorite buttons.
#[derive(Debug, Deserialize)]
pub struct ProductActionForm {
    pub id: String,
    pub return_to: Option<String>,
}

/// Only local paths are accepted as redirect targets.
pub(crate) fn safe_return_to(return_to: Option<&str>, default: &str) -> String {
    match return_to {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => default.to_string(),
    }
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the favorites routes router.
pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index))
        .route("/toggle", post(favorites::toggle))
        .route("/remove", post(favorites::remove))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/", get(catalog::index))
        .route("/products/{id}", get(products::show))
        // Shopper collections
        .nest("/cart", cart_routes())
        .nest("/favorites", favorites_routes())
        // Health
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}
