//! Favorites persistence.

use fofurices_core::{Favorites, Product, ProductId};
use tracing::instrument;

use crate::cache::{CacheError, CacheKey, CacheStore};

/// Reads and mutates the stored favorites.
#[derive(Debug, Clone)]
pub struct FavoritesService {
    cache: CacheStore,
}

impl FavoritesService {
    #[must_use]
    pub const fn new(cache: CacheStore) -> Self {
        Self { cache }
    }

    /// The stored favorites; empty if nothing (valid) is stored.
    pub async fn favorites(&self) -> Favorites {
        self.cache.load_blocking_pool(CacheKey::Favorites).await
    }

    /// Add or remove `product`. Returns whether it is now a favorite.
    ///
    /// # Errors
    ///
    /// Returns an error if the favorites cannot be written back.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn toggle(&self, product: &Product) -> Result<bool, CacheError> {
        let product = product.clone();
        self.cache
            .update_blocking_pool(CacheKey::Favorites, move |favorites: &mut Favorites| {
                favorites.toggle(&product)
            })
            .await
    }

    /// Remove `id` from the favorites. Returns whether it was there.
    ///
    /// # Errors
    ///
    /// Returns an error if the favorites cannot be written back.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: &ProductId) -> Result<bool, CacheError> {
        let id = id.clone();
        self.cache
            .update_blocking_pool(CacheKey::Favorites, move |favorites: &mut Favorites| {
                favorites.remove(&id)
            })
            .await
    }
}
