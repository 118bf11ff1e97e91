//! Favorites route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use fofurices_core::ProductId;
use tracing::instrument;

use super::products::ProductView;
use super::{LayoutView, ProductActionForm, safe_return_to};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Favorites page template.
#[derive(Template, WebTemplate)]
#[template(path = "favorites/index.html")]
pub struct FavoritesTemplate {
    pub layout: LayoutView,
    pub products: Vec<ProductView>,
}

/// Display the favorites list.
///
/// Entries render from their stored snapshots, not from the live catalog.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let favorites = state.favorites().favorites().await;
    let products = favorites
        .entries()
        .iter()
        .map(|entry| ProductView::new(&entry.product, &favorites))
        .collect();

    FavoritesTemplate {
        layout: LayoutView::new(&state).await,
        products,
    }
}

/// Add or remove a favorite.
///
/// # Errors
///
/// Returns `NotFound` if the product is unknown, or a cache error if the
/// favorites cannot be saved.
#[instrument(skip(state))]
pub async fn toggle(
    State(state): State<AppState>,
    Form(form): Form<ProductActionForm>,
) -> Result<Redirect> {
    let id = ProductId::new(form.id);
    let product = state
        .find_product(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("produto {id}")))?;

    let favorite = state.favorites().toggle(&product).await?;
    tracing::debug!(product_id = %id, favorite, "Favorite toggled");

    Ok(Redirect::to(&safe_return_to(form.return_to.as_deref(), "/")))
}

/// Remove a favorite from the favorites page.
///
/// # Errors
///
/// Returns a cache error if the favorites cannot be saved.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<ProductActionForm>,
) -> Result<Redirect> {
    state.favorites().remove(&ProductId::new(form.id)).await?;
    Ok(Redirect::to("/favorites"))
}
