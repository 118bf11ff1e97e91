//! In-memory catalog and the loader that keeps it fresh.
//!
//! # Loading
//!
//! Loading happens in two phases:
//!
//! 1. [`CatalogLoader::restore_from_cache`] puts the last good catalog from
//!    the cache store in place, so pages render immediately.
//! 2. [`CatalogLoader::refresh`] fetches both spreadsheet exports in
//!    parallel. Only when both succeed is the catalog replaced and written
//!    back to the cache. Any failure leaves the current catalog untouched.
//!
//! Readers never see a half-updated catalog: [`CatalogHandle`] swaps whole
//! `Arc<Catalog>` snapshots.

mod loader;

pub use loader::{CatalogError, CatalogLoader};

use std::sync::{Arc, PoisonError, RwLock};

use fofurices_core::Catalog;

/// Result of a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Both exports were fetched; the catalog now holds their content.
    Fresh { products: usize, categories: usize },
    /// The fetch failed; previously loaded or cached data is still served.
    Stale,
    /// The fetch failed and there is no data to fall back on.
    Empty,
}

impl RefreshOutcome {
    /// Whether the catalog content came from the network on this refresh.
    #[must_use]
    pub const fn is_fresh(self) -> bool {
        matches!(self, Self::Fresh { .. })
    }
}

impl std::fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fresh {
                products,
                categories,
            } => write!(f, "fresh ({products} products, {categories} categories)"),
            Self::Stale => f.write_str("stale (serving previous data)"),
            Self::Empty => f.write_str("empty (no data available)"),
        }
    }
}

/// Shared handle to the current catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogHandle {
    current: Arc<RwLock<Arc<Catalog>>>,
}

impl CatalogHandle {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// A snapshot of the current catalog.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the catalog.
    pub fn replace(&self, catalog: Catalog) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(catalog);
    }

    /// Replace the catalog with a function of the current one.
    pub fn modify(&self, f: impl FnOnce(Catalog) -> Catalog) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = f(Catalog::clone(&current));
        *current = Arc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use fofurices_core::csv::decode;

    use super::*;

    #[test]
    fn test_snapshot_is_isolated_from_replace() {
        let handle = CatalogHandle::default();
        let before = handle.snapshot();

        handle.replace(Catalog::from_records(&decode("id,nome\n1,Urso"), &[]));

        assert!(before.is_empty());
        assert_eq!(handle.snapshot().products().len(), 1);
    }

    #[test]
    fn test_modify_keeps_other_collection() {
        let handle = CatalogHandle::new(Catalog::from_records(
            &decode("id,nome\n1,Urso"),
            &decode("id,nome\npel,Pelúcias"),
        ));

        handle.modify(|catalog| catalog.with_products(Vec::new()));

        let catalog = handle.snapshot();
        assert!(catalog.products().is_empty());
        assert_eq!(catalog.categories().len(), 1);
    }

    #[test]
    fn test_outcome_display() {
        let outcome = RefreshOutcome::Fresh {
            products: 3,
            categories: 2,
        };
        assert!(outcome.is_fresh());
        assert_eq!(outcome.to_string(), "fresh (3 products, 2 categories)");
        assert!(!RefreshOutcome::Stale.is_fresh());
    }
}
