//! Cart route handlers.
//!
//! The cart lives in the local cache store. Each action loads it, applies one
//! change, saves it and redirects, so a page refresh never repeats an action.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use fofurices_core::image::resolve_image_url;
use fofurices_core::{Cart, CartLine, Price, ProductId};
use serde::Deserialize;
use tracing::instrument;

use super::products::product_path;
use super::{LayoutView, ProductActionForm, safe_return_to};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: String,
    pub href: String,
    pub name: String,
    pub price: String,
    pub line_total: String,
    pub quantity: u32,
    /// Quantity posted by the "+" button.
    pub increment: i64,
    /// Quantity posted by the "−" button; zero removes the line.
    pub decrement: i64,
    pub image_url: Option<String>,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        let quantity = i64::from(line.quantity);
        Self {
            id: line.id().to_string(),
            href: product_path(line.id()),
            name: line.product.name.clone(),
            price: line.product.price().display(),
            line_total: Price::brl(line.line_total()).display(),
            quantity: line.quantity,
            increment: quantity + 1,
            decrement: quantity - 1,
            image_url: resolve_image_url(&line.product.image_url),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    /// Recomputed from the lines on every render.
    pub total: String,
    pub item_count: u64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            total: cart.total_price().display(),
            item_count: cart.item_count(),
        }
    }
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: LayoutView,
    pub cart: CartView,
}

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    let cart = state.cart().cart().await;

    CartShowTemplate {
        layout: LayoutView::new(&state).await,
        cart: CartView::from(&cart),
    }
}

/// Add one unit of a product to the cart.
///
/// # Errors
///
/// Returns `NotFound` if the product is unknown, or a cache error if the cart
/// cannot be saved.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Form(form): Form<ProductActionForm>,
) -> Result<Redirect> {
    let id = ProductId::new(form.id);
    let product = state
        .find_product(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("produto {id}")))?;

    state.cart().add(&product).await?;
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));

    Ok(Redirect::to(&safe_return_to(form.return_to.as_deref(), "/cart")))
}

/// Set the quantity of a cart line.
///
/// # Errors
///
/// Returns a cache error if the cart cannot be saved.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    state
        .cart()
        .set_quantity(&ProductId::new(form.id), form.quantity)
        .await?;
    Ok(Redirect::to("/cart"))
}

/// Remove a cart line.
///
/// # Errors
///
/// Returns a cache error if the cart cannot be saved.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect> {
    let id = ProductId::new(form.id);
    state.cart().remove(&id).await?;
    add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", id.as_str())]));
    Ok(Redirect::to("/cart"))
}
