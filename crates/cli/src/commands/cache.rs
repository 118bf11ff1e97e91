//! Cache store inspection commands.
//!
//! # Usage
//!
//! ```bash
//! fofurices cache show favorites
//! fofurices cache clear cart
//! fofurices cache clear all
//! ```

use fofurices_storefront::cache::{CacheError, CacheKey};
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheCommandError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("{0}. Valid keys: products, categories, cart, favorites, all")]
    UnknownKey(String),
}

/// Print the stored document for `key`.
pub fn show(key: CacheKey) -> Result<(), CacheCommandError> {
    let cache = super::open_cache()?;
    let raw = cache.load_raw(key);

    #[allow(clippy::print_stdout)]
    {
        match raw {
            Some(raw) => println!("{raw}"),
            None => println!("(empty)"),
        }
    }
    Ok(())
}

/// Remove one key, or all of them.
pub fn clear(target: &str) -> Result<(), CacheCommandError> {
    let keys = parse_target(target)?;
    let cache = super::open_cache()?;

    for key in keys {
        cache.clear(key)?;
        tracing::info!(key = key.name(), "Cache key cleared");
    }
    Ok(())
}

fn parse_target(target: &str) -> Result<Vec<CacheKey>, CacheCommandError> {
    if target == "all" {
        return Ok(CacheKey::ALL.to_vec());
    }
    target
        .parse::<CacheKey>()
        .map(|key| vec![key])
        .map_err(CacheCommandError::UnknownKey)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("cart").unwrap(), vec![CacheKey::Cart]);
        assert_eq!(parse_target("all").unwrap().len(), 4);
        assert!(matches!(
            parse_target("carrinho"),
            Err(CacheCommandError::UnknownKey(_))
        ));
    }
}
