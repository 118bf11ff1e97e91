//! Catalog loading around the server lifecycle.
//!
//! Startup restores the cached catalog, starts a network refresh and waits
//! for it (bounded by `startup_wait`, and never shorter than
//! `min_load_delay`) before marking the state ready. After that an optional
//! interval keeps the catalog current.

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep, timeout};
use tracing::{error, info, warn};

use crate::catalog::RefreshOutcome;
use crate::state::AppState;

/// Run the startup load and mark `state` ready.
///
/// Returns the outcome of the first refresh, or `None` when it did not
/// finish within `startup_wait`. A refresh that times out keeps running in
/// the background and publishes when it completes.
pub async fn load_catalog(state: &AppState) -> Option<RefreshOutcome> {
    let config = &state.config().catalog;

    if state.loader().restore_from_cache() {
        info!("Serving cached catalog while refreshing");
    }

    let loader = state.loader().clone();
    let mut refresh = tokio::spawn(async move { loader.refresh().await });

    let (first, ()) = tokio::join!(
        timeout(config.startup_wait, &mut refresh),
        sleep(config.min_load_delay)
    );

    let outcome = match first {
        Ok(Ok(outcome)) => Some(outcome),
        Ok(Err(e)) => {
            error!(error = %e, "Startup refresh task failed");
            None
        }
        Err(_) => {
            warn!(
                wait_secs = config.startup_wait.as_secs(),
                "Startup refresh still running, serving what is loaded"
            );
            None
        }
    };

    if outcome == Some(RefreshOutcome::Empty) {
        warn!("No catalog available: sources unreachable and cache empty");
    }

    state.mark_ready();
    outcome
}

/// Spawn the periodic refresh, if one is configured.
pub fn spawn_refresh_task(state: &AppState) -> Option<JoinHandle<()>> {
    let period = state.config().catalog.refresh_interval?;
    let loader = state.loader().clone();

    Some(tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; startup already refreshed.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            loader.refresh().await;
        }
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::{Duration, Instant};

    use url::Url;

    use super::*;
    use crate::cache::CacheStore;
    use crate::config::{CatalogConfig, StorefrontConfig};

    fn unreachable_state(min_load_delay: Duration) -> AppState {
        // Port 9 (discard) on localhost refuses connections.
        let mut catalog = CatalogConfig::new(
            Url::parse("http://127.0.0.1:9/products.csv").unwrap(),
            Url::parse("http://127.0.0.1:9/categories.csv").unwrap(),
        );
        catalog.min_load_delay = min_load_delay;
        catalog.startup_wait = Duration::from_secs(5);
        AppState::new(StorefrontConfig::new(catalog), CacheStore::in_memory()).unwrap()
    }

    #[tokio::test]
    async fn test_load_catalog_marks_ready_when_sources_fail() {
        let state = unreachable_state(Duration::ZERO);
        assert!(!state.is_ready());

        let outcome = load_catalog(&state).await;

        assert_eq!(outcome, Some(RefreshOutcome::Empty));
        assert!(state.is_ready());
        assert!(state.catalog().is_empty());
    }

    #[tokio::test]
    async fn test_load_catalog_honors_min_delay() {
        let state = unreachable_state(Duration::from_millis(150));

        let started = Instant::now();
        load_catalog(&state).await;

        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_no_refresh_task_without_interval() {
        let state = unreachable_state(Duration::ZERO);
        assert!(spawn_refresh_task(&state).is_none());
    }
}
