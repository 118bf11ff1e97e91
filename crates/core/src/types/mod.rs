//! Core types for Fofurices.
//!
//! This module provides type-safe wrappers for the storefront's domain.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod price;

pub use cart::{Cart, CartLine, FavoriteEntry, Favorites};
pub use catalog::{Catalog, Category, Product};
pub use id::*;
pub use price::{CurrencyCode, Price, parse_price};
