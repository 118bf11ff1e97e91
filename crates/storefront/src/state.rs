//! Application state shared across handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fofurices_core::{Catalog, Product, ProductId};

use crate::cache::CacheStore;
use crate::catalog::{CatalogError, CatalogHandle, CatalogLoader};
use crate::config::StorefrontConfig;
use crate::services::{CartService, FavoritesService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and holds the catalog, the
/// cache store and the services built on it. It lives from startup to
/// shutdown; [`AppState::reset`] drops the in-memory catalog for a cold
/// start.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    cache: CacheStore,
    loader: CatalogLoader,
    cart: CartService,
    favorites: FavoritesService,
    ready: AtomicBool,
}

impl AppState {
    /// Create a new application state over `cache`.
    ///
    /// The catalog starts empty; run the loader to fill it.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, cache: CacheStore) -> Result<Self, CatalogError> {
        let loader = CatalogLoader::new(&config.catalog, cache.clone(), CatalogHandle::default())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cart: CartService::new(cache.clone()),
                favorites: FavoritesService::new(cache.clone()),
                config,
                cache,
                loader,
                ready: AtomicBool::new(false),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the local cache store.
    #[must_use]
    pub fn cache(&self) -> &CacheStore {
        &self.inner.cache
    }

    /// Get a reference to the catalog loader.
    #[must_use]
    pub fn loader(&self) -> &CatalogLoader {
        &self.inner.loader
    }

    /// Snapshot of the current catalog.
    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        self.inner.loader.catalog().snapshot()
    }

    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }

    #[must_use]
    pub fn favorites(&self) -> &FavoritesService {
        &self.inner.favorites
    }

    /// Whether the startup load has finished.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::Acquire)
    }

    /// Mark the startup load as finished.
    pub fn mark_ready(&self) {
        self.inner.ready.store(true, Ordering::Release);
    }

    /// Forget the in-memory catalog and readiness. Stored data is kept.
    pub fn reset(&self) {
        self.inner.loader.catalog().replace(Catalog::default());
        self.inner.ready.store(false, Ordering::Release);
    }

    /// Find a product snapshot to act on.
    ///
    /// The live catalog wins; otherwise the copy kept in favorites or in the
    /// cart, so items can still be handled after they leave the sheet.
    pub async fn find_product(&self, id: &ProductId) -> Option<Product> {
        if let Some(product) = self.catalog().product(id) {
            return Some(product.clone());
        }
        if let Some(entry) = self.favorites().favorites().await.get(id) {
            return Some(entry.product.clone());
        }
        self.cart()
            .cart()
            .await
            .line(id)
            .map(|line| line.product.clone())
    }
}
