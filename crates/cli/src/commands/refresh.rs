//! One-shot catalog refresh.
//!
//! Restores whatever the cache holds, fetches both sheets and writes the
//! result back, exactly like the storefront's startup load.
//!
//! # Environment Variables
//!
//! - `CATALOG_PRODUCTS_URL` / `CATALOG_CATEGORIES_URL` - Sheet exports
//! - `STOREFRONT_DATA_DIR` / `STOREFRONT_CACHE_PREFIX` - Cache location

use fofurices_storefront::cache::CacheError;
use fofurices_storefront::catalog::{CatalogError, CatalogHandle, CatalogLoader, RefreshOutcome};
use fofurices_storefront::config::{CatalogConfig, ConfigError};
use thiserror::Error;

/// Errors that can occur during a refresh.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Both sources failed and nothing was cached.
    #[error("No catalog available: sources unreachable and cache empty")]
    NoCatalog,
}

/// Run the catalog loader once and print the outcome.
pub async fn run() -> Result<(), RefreshError> {
    let cache = super::open_cache()?;
    let config = CatalogConfig::from_env()?;
    let loader = CatalogLoader::new(&config, cache, CatalogHandle::default())?;

    tracing::info!(
        products_url = %config.products_url,
        categories_url = %config.categories_url,
        "Refreshing catalog"
    );
    let outcome = loader.load().await;

    #[allow(clippy::print_stdout)]
    {
        println!("{outcome}");
    }

    if outcome == RefreshOutcome::Empty {
        return Err(RefreshError::NoCatalog);
    }
    Ok(())
}
