//! Spreadsheet catalog loader.
//!
//! Fetches the products and categories CSV exports, decodes them and
//! publishes the result. Failures never propagate: each one becomes a
//! [`RefreshOutcome`] and a log line.
//!
//! Concurrent refreshes are coalesced: a caller that arrives while a refresh
//! is running waits for it and shares its outcome instead of fetching again.
//!
//! There is no retry and no request timeout here; callers that need a bound
//! wrap the future themselves. Dropping a waiting future releases its turn.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use fofurices_core::csv::decode;
use fofurices_core::{Catalog, Category, Product};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{CatalogHandle, RefreshOutcome};
use crate::cache::{CacheKey, CacheStore};
use crate::config::CatalogConfig;

/// Errors fetching a spreadsheet export.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The export answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: Url,
        status: reqwest::StatusCode,
    },
}

/// Loads the catalog from the spreadsheet exports.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct CatalogLoader {
    inner: Arc<CatalogLoaderInner>,
}

struct CatalogLoaderInner {
    client: reqwest::Client,
    products_url: Url,
    categories_url: Url,
    cache: CacheStore,
    catalog: CatalogHandle,
    /// Held for the duration of a refresh; stores the latest outcome.
    in_flight: Mutex<Option<RefreshOutcome>>,
    /// Number of refreshes that ran to completion.
    completed: AtomicU64,
}

impl CatalogLoader {
    /// Create a loader that publishes into `catalog` and writes through to
    /// `cache`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &CatalogConfig,
        cache: CacheStore,
        catalog: CatalogHandle,
    ) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fofurices-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogLoaderInner {
                client,
                products_url: config.products_url.clone(),
                categories_url: config.categories_url.clone(),
                cache,
                catalog,
                in_flight: Mutex::new(None),
                completed: AtomicU64::new(0),
            }),
        })
    }

    /// The handle this loader publishes into.
    #[must_use]
    pub fn catalog(&self) -> &CatalogHandle {
        &self.inner.catalog
    }

    /// Both loading phases: restore from cache, then refresh.
    pub async fn load(&self) -> RefreshOutcome {
        self.restore_from_cache();
        self.refresh().await
    }

    /// Put cached products and categories in place.
    ///
    /// Each collection is restored only when the cache holds a non-empty
    /// value for it. Returns whether anything was restored.
    pub fn restore_from_cache(&self) -> bool {
        let products: Vec<Product> = self.inner.cache.load(CacheKey::Products);
        let categories: Vec<Category> = self.inner.cache.load(CacheKey::Categories);

        if products.is_empty() && categories.is_empty() {
            return false;
        }

        info!(
            products = products.len(),
            categories = categories.len(),
            "Catalog restored from cache"
        );
        self.inner.catalog.modify(|catalog| {
            let catalog = if products.is_empty() {
                catalog
            } else {
                catalog.with_products(products)
            };
            if categories.is_empty() {
                catalog
            } else {
                catalog.with_categories(categories)
            }
        });
        true
    }

    /// Fetch both exports and, if both succeed, replace the catalog.
    ///
    /// If another refresh finishes while this call waits for its turn, that
    /// refresh's outcome is returned without fetching again.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> RefreshOutcome {
        let seen = self.inner.completed.load(Ordering::Acquire);
        let mut last = self.inner.in_flight.lock().await;

        if self.inner.completed.load(Ordering::Acquire) != seen
            && let Some(outcome) = *last
        {
            debug!(%outcome, "Joined a refresh that was already running");
            return outcome;
        }

        let outcome = self.fetch_and_publish().await;
        *last = Some(outcome);
        self.inner.completed.fetch_add(1, Ordering::AcqRel);
        outcome
    }

    async fn fetch_and_publish(&self) -> RefreshOutcome {
        let (products, categories) = tokio::join!(
            self.fetch(&self.inner.products_url),
            self.fetch(&self.inner.categories_url)
        );

        let (products_csv, categories_csv) = match (products, categories) {
            (Ok(products), Ok(categories)) => (products, categories),
            (products, categories) => {
                for error in [products.err(), categories.err()].into_iter().flatten() {
                    warn!(error = %error, "Catalog refresh failed");
                }
                return self.fallback();
            }
        };

        let catalog = Catalog::from_records(&decode(&products_csv), &decode(&categories_csv));
        let outcome = RefreshOutcome::Fresh {
            products: catalog.products().len(),
            categories: catalog.categories().len(),
        };

        let products = catalog.products().to_vec();
        let categories = catalog.categories().to_vec();
        self.inner.catalog.replace(catalog);
        info!(%outcome, "Catalog refreshed");

        let cache = &self.inner.cache;
        if let Err(e) = cache.save_blocking_pool(CacheKey::Products, products).await {
            warn!(error = %e, "Failed to cache products");
        }
        if let Err(e) = cache
            .save_blocking_pool(CacheKey::Categories, categories)
            .await
        {
            warn!(error = %e, "Failed to cache categories");
        }
        outcome
    }

    fn fallback(&self) -> RefreshOutcome {
        if self.inner.catalog.snapshot().is_empty() {
            RefreshOutcome::Empty
        } else {
            RefreshOutcome::Stale
        }
    }

    async fn fetch(&self, url: &Url) -> Result<String, CatalogError> {
        let response = self.inner.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.clone(),
                status,
            });
        }

        Ok(response.text().await?)
    }
}

impl std::fmt::Debug for CatalogLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogLoader")
            .field("products_url", &self.inner.products_url.as_str())
            .field("categories_url", &self.inner.categories_url.as_str())
            .finish_non_exhaustive()
    }
}
