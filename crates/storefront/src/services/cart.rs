//! Cart persistence.

use fofurices_core::{Cart, Product, ProductId};
use tracing::{debug, instrument};

use crate::cache::{CacheError, CacheKey, CacheStore};

/// Reads and mutates the stored cart.
#[derive(Debug, Clone)]
pub struct CartService {
    cache: CacheStore,
}

impl CartService {
    #[must_use]
    pub const fn new(cache: CacheStore) -> Self {
        Self { cache }
    }

    /// The stored cart; empty if nothing (valid) is stored.
    pub async fn cart(&self) -> Cart {
        self.cache.load_blocking_pool(CacheKey::Cart).await
    }

    /// Add one unit of `product`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written back.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&self, product: &Product) -> Result<Cart, CacheError> {
        let product = product.clone();
        self.mutate(move |cart| cart.add(&product)).await
    }

    /// Remove the line for `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written back.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: &ProductId) -> Result<Cart, CacheError> {
        let id = id.clone();
        self.mutate(move |cart| {
            cart.remove(&id);
        })
        .await
    }

    /// Set the quantity of the line for `id`; zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written back.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn set_quantity(&self, id: &ProductId, quantity: i64) -> Result<Cart, CacheError> {
        let id = id.clone();
        self.mutate(move |cart| cart.set_quantity(&id, quantity)).await
    }

    async fn mutate(&self, f: impl FnOnce(&mut Cart) + Send + 'static) -> Result<Cart, CacheError> {
        let cart = self
            .cache
            .update_blocking_pool(CacheKey::Cart, move |cart: &mut Cart| {
                f(cart);
                cart.clone()
            })
            .await?;
        debug!(lines = cart.lines().len(), items = cart.item_count(), "Cart saved");
        Ok(cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use fofurices_core::CategoryId;
    use rust_decimal::Decimal;

    use super::*;

    fn urso() -> Product {
        Product {
            id: ProductId::new("1"),
            category_id: CategoryId::new("pel"),
            name: "Urso".to_string(),
            description: String::new(),
            price: Decimal::new(1050, 2),
            image_url: String::new(),
            available: true,
        }
    }

    #[tokio::test]
    async fn test_add_twice_persists_one_line() {
        let service = CartService::new(CacheStore::in_memory());

        service.add(&urso()).await.unwrap();
        service.add(&urso()).await.unwrap();

        let cart = service.cart().await;
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.total(), Decimal::new(2100, 2));
    }

    #[tokio::test]
    async fn test_quantity_floor_persists_removal() {
        let service = CartService::new(CacheStore::in_memory());
        service.add(&urso()).await.unwrap();

        service.set_quantity(&urso().id, 4).await.unwrap();
        assert_eq!(service.cart().await.lines()[0].quantity, 4);

        service.set_quantity(&urso().id, -5).await.unwrap();
        assert!(service.cart().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let service = CartService::new(CacheStore::in_memory());
        service.add(&urso()).await.unwrap();

        let cart = service.remove(&ProductId::new("404")).await.unwrap();
        assert_eq!(cart.lines().len(), 1);

        let cart = service.remove(&urso().id).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_services_sharing_a_store_see_each_other() {
        let store = CacheStore::in_memory();
        let first = CartService::new(store.clone());
        let second = CartService::new(store);

        first.add(&urso()).await.unwrap();
        second.add(&urso()).await.unwrap();

        assert_eq!(first.cart().await.item_count(), 2);
    }
}
