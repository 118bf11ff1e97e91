//! Local cache store.
//!
//! Four fixed keys hold the last good catalog plus the shopper's cart and
//! favorites. Values are JSON documents in a [`StorageBackend`].
//!
//! Reads never fail: a missing, unreadable or corrupt value loads as the
//! empty collection and is logged. Writes report errors to the caller.
//!
//! There is no expiry and no eviction. Within this process, [`CacheStore::update`]
//! serializes read-modify-write cycles; across processes the last writer wins.
//!
//! The plain methods do blocking I/O. Async callers use the `*_blocking_pool`
//! variants, which run the same operation on tokio's blocking thread pool.

mod storage;

pub use storage::{FileStorage, MemoryStorage, StorageBackend};

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Cache store errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The blocking task running the operation panicked or was cancelled.
    #[error("cache task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// The four logical keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Products,
    Categories,
    Cart,
    Favorites,
}

impl CacheKey {
    pub const ALL: [Self; 4] = [Self::Products, Self::Categories, Self::Cart, Self::Favorites];

    /// Logical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Cart => "cart",
            Self::Favorites => "favorites",
        }
    }

    /// Physical key, e.g. `fofurices_cart_v1`.
    #[must_use]
    pub fn storage_key(self, prefix: &str) -> String {
        format!("{prefix}_{}_v1", self.name())
    }
}

impl std::str::FromStr for CacheKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| format!("unknown cache key '{s}'"))
    }
}

/// Typed JSON access to a storage backend.
///
/// Cheaply cloneable; clones share the backend and the write lock.
#[derive(Clone)]
pub struct CacheStore {
    inner: Arc<CacheStoreInner>,
}

struct CacheStoreInner {
    backend: Box<dyn StorageBackend>,
    prefix: String,
    write_lock: Mutex<()>,
}

impl CacheStore {
    /// Create a store over `backend`, namespacing keys with `prefix`.
    pub fn new(backend: impl StorageBackend, prefix: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(CacheStoreInner {
                backend: Box::new(backend),
                prefix: prefix.into(),
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// An in-memory store, for tests and dry runs.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new(), "fofurices")
    }

    /// Load the collection stored under `key`.
    ///
    /// Returns `C::default()` (the empty collection) when the key is absent,
    /// cannot be read, or does not deserialize.
    #[must_use]
    pub fn load<C>(&self, key: CacheKey) -> C
    where
        C: DeserializeOwned + Default,
    {
        let Some(raw) = self.load_raw(key) else {
            return C::default();
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key = key.name(), error = %e, "Discarding corrupt cache value");
            C::default()
        })
    }

    /// The raw stored document, if any.
    #[must_use]
    pub fn load_raw(&self, key: CacheKey) -> Option<String> {
        match self.inner.backend.get_item(&self.storage_key(key)) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = key.name(), error = %e, "Failed to read cache value");
                None
            }
        }
    }

    /// Serialize `collection` and store it under `key`, overwriting.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save<C>(&self, key: CacheKey, collection: &C) -> Result<(), CacheError>
    where
        C: Serialize + ?Sized,
    {
        let _guard = self.lock();
        self.write(key, collection)
    }

    /// Load, mutate and save `key` as one step.
    ///
    /// Other `save`/`update` calls on this store wait until the new value is
    /// written.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. The mutation's result is lost in
    /// that case and the stored value is unchanged.
    pub fn update<C, R>(&self, key: CacheKey, f: impl FnOnce(&mut C) -> R) -> Result<R, CacheError>
    where
        C: Serialize + DeserializeOwned + Default,
    {
        let _guard = self.lock();
        let mut collection: C = self.load(key);
        let result = f(&mut collection);
        self.write(key, &collection)?;
        Ok(result)
    }

    /// Remove `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot delete the value.
    pub fn clear(&self, key: CacheKey) -> Result<(), CacheError> {
        let _guard = self.lock();
        self.inner.backend.remove_item(&self.storage_key(key))
    }

    /// [`CacheStore::load`] on the blocking thread pool.
    pub async fn load_blocking_pool<C>(&self, key: CacheKey) -> C
    where
        C: DeserializeOwned + Default + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.load(key))
            .await
            .unwrap_or_else(|e| {
                warn!(key = key.name(), error = %e, "Cache read task failed");
                C::default()
            })
    }

    /// [`CacheStore::save`] on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save_blocking_pool<C>(&self, key: CacheKey, collection: C) -> Result<(), CacheError>
    where
        C: Serialize + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.save(key, &collection)).await?
    }

    /// [`CacheStore::update`] on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn update_blocking_pool<C, R>(
        &self,
        key: CacheKey,
        f: impl FnOnce(&mut C) -> R + Send + 'static,
    ) -> Result<R, CacheError>
    where
        C: Serialize + DeserializeOwned + Default + 'static,
        R: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.update(key, f)).await?
    }

    fn write<C>(&self, key: CacheKey, collection: &C) -> Result<(), CacheError>
    where
        C: Serialize + ?Sized,
    {
        let raw = serde_json::to_string(collection)?;
        self.inner.backend.set_item(&self.storage_key(key), &raw)?;
        debug!(key = key.name(), bytes = raw.len(), "Cache value written");
        Ok(())
    }

    fn storage_key(&self, key: CacheKey) -> String {
        key.storage_key(&self.inner.prefix)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.inner
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("prefix", &self.inner.prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fofurices_core::{Cart, CategoryId, Product, ProductId};
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            category_id: CategoryId::new("pel"),
            name: format!("Produto {id}"),
            description: "Fofo".to_string(),
            price: Decimal::new(1990, 2),
            image_url: String::new(),
            available: true,
        }
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(CacheKey::Cart.storage_key("fofurices"), "fofurices_cart_v1");
        assert_eq!("favorites".parse::<CacheKey>().unwrap(), CacheKey::Favorites);
        assert!("orders".parse::<CacheKey>().is_err());
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let store = CacheStore::in_memory();
        let products: Vec<Product> = store.load(CacheKey::Products);
        assert!(products.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let store = CacheStore::in_memory();
        let products = vec![product("1"), product("2")];

        store.save(CacheKey::Products, &products).unwrap();
        let loaded: Vec<Product> = store.load(CacheKey::Products);
        assert_eq!(loaded, products);
    }

    #[test]
    fn test_corrupt_value_loads_empty() {
        let backend = MemoryStorage::new();
        backend.set_item("t_cart_v1", "{not json").unwrap();
        let store = CacheStore::new(backend, "t");

        let cart: Cart = store.load(CacheKey::Cart);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_wrong_shape_loads_empty() {
        let backend = MemoryStorage::new();
        backend.set_item("t_products_v1", "{\"id\": 1}").unwrap();
        let store = CacheStore::new(backend, "t");

        let products: Vec<Product> = store.load(CacheKey::Products);
        assert!(products.is_empty());
    }

    #[test]
    fn test_update_writes_back() {
        let store = CacheStore::in_memory();

        let count = store
            .update(CacheKey::Cart, |cart: &mut Cart| {
                cart.add(&product("1"));
                cart.add(&product("1"));
                cart.item_count()
            })
            .unwrap();

        assert_eq!(count, 2);
        let cart: Cart = store.load(CacheKey::Cart);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_keys_are_independent_and_clearable() {
        let store = CacheStore::in_memory();
        store.save(CacheKey::Products, &vec![product("1")]).unwrap();
        store.save(CacheKey::Favorites, &Vec::<Product>::new()).unwrap();

        store.clear(CacheKey::Products).unwrap();
        assert_eq!(store.load_raw(CacheKey::Products), None);
        assert_eq!(store.load_raw(CacheKey::Favorites).as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_backed_round_trip() {
        let dir = std::env::temp_dir().join(format!("fofurices-cache-{}", uuid::Uuid::new_v4()));
        let products = vec![product("7")];

        CacheStore::new(FileStorage::open(&dir).unwrap(), "fofurices")
            .save(CacheKey::Products, &products)
            .unwrap();
        let reopened = CacheStore::new(FileStorage::open(&dir).unwrap(), "fofurices");
        let loaded: Vec<Product> = reopened.load(CacheKey::Products);

        assert_eq!(loaded, products);
        assert!(dir.join("fofurices_products_v1.json").exists());
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_blocking_pool_variants_share_the_store() {
        let store = CacheStore::in_memory();

        store
            .save_blocking_pool(CacheKey::Products, vec![product("1")])
            .await
            .unwrap();
        let count = store
            .update_blocking_pool(CacheKey::Cart, |cart: &mut Cart| {
                cart.add(&product("1"));
                cart.item_count()
            })
            .await
            .unwrap();

        assert_eq!(count, 1);
        let products: Vec<Product> = store.load_blocking_pool(CacheKey::Products).await;
        assert_eq!(products.len(), 1);
        let cart: Cart = store.load(CacheKey::Cart);
        assert_eq!(cart.item_count(), 1);
    }
}
