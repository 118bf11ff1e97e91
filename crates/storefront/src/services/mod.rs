//! Shopper-facing services over the cache store.
//!
//! # Services
//!
//! - `cart` - Add, remove and re-quantify cart lines
//! - `favorites` - Toggle and remove favorite products
//!
//! Every operation loads the whole collection, mutates it and writes the
//! whole collection back through [`CacheStore::update`].
//!
//! [`CacheStore::update`]: crate::cache::CacheStore::update

pub mod cart;
pub mod favorites;

pub use cart::CartService;
pub use favorites::FavoritesService;
