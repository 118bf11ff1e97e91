//! Fofurices Core - Shared domain library.
//!
//! This crate provides the pieces of the storefront that do not touch the
//! outside world:
//! - `storefront` - Server-rendered shop (catalog, favorites, cart)
//! - `cli` - Operator commands (decode exports, refresh and inspect the cache)
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage, no HTTP clients. The storefront crate wires these into the
//! cache store, the catalog loader and the HTTP handlers.
//!
//! # Modules
//!
//! - [`types`] - Ids, prices, catalog entities, cart and favorites
//! - [`csv`] - Spreadsheet export decoder
//! - [`image`] - Image reference to embeddable URL resolution

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod csv;
pub mod image;
pub mod types;

pub use types::*;
