//! CLI command implementations.

pub mod cache;
pub mod decode;
pub mod refresh;

use fofurices_storefront::cache::{CacheError, CacheStore, FileStorage};
use fofurices_storefront::config::CacheConfig;

/// Open the cache store configured for the storefront.
fn open_cache() -> Result<CacheStore, CacheError> {
    dotenvy::dotenv().ok();

    let config = CacheConfig::from_env();
    let storage = FileStorage::open(config.data_dir)?;
    tracing::debug!(dir = %storage.dir().display(), "Cache store opened");
    Ok(CacheStore::new(storage, config.key_prefix))
}
