//! Fofurices storefront library.
//!
//! Server-rendered catalog, cart and favorites over a product sheet
//! published as CSV. The binary in `main.rs` wires configuration, logging
//! and the startup load around [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod startup;
pub mod state;

use axum::{Router, middleware::from_fn};
use tower_http::{services::ServeDir, trace::TraceLayer};

use state::AppState;

/// Directory holding the stylesheet and other static assets.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the storefront router over `state`.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(middleware::make_span))
        .with_state(state)
}
