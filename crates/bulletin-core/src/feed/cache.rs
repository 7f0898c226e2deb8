//! Process-wide feed page cache.
//!
//! Two moka caches back every key:
//!
//! - `fresh` has a time-to-live equal to the revalidation window. Its
//!   `try_get_with` coalesces concurrent loads, so all requests for one key
//!   inside the window share a single provider fetch.
//! - `stale` has no time-to-live and keeps the last good page per key. When
//!   the fresh entry has expired the stale page is served immediately and a
//!   background refresh replaces it.
//!
//! Only capacity pressure evicts from `stale`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;

use super::{FeedFetcher, FeedKey, FeedPage};
use crate::Result;

/// Default revalidation window (stale-while-revalidate / dedup window).
pub const DEFAULT_REVALIDATE_WINDOW: Duration = Duration::from_secs(600);

/// Default number of pages kept per cache.
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Feed cache tuning.
#[derive(Debug, Clone)]
pub struct FeedCacheConfig {
    /// Pages younger than this are served without refetching.
    pub revalidate_window: Duration,
    /// Maximum number of pages held.
    pub capacity: u64,
}

impl Default for FeedCacheConfig {
    fn default() -> Self {
        Self {
            revalidate_window: DEFAULT_REVALIDATE_WINDOW,
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Last successful page for a key.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub page: Arc<FeedPage>,
    pub fetched_at: DateTime<Utc>,
}

/// Shared feed page cache. Cloning shares the underlying storage.
#[derive(Clone)]
pub struct FeedCache {
    fresh: Cache<FeedKey, Arc<FeedPage>>,
    stale: Cache<FeedKey, CachedPage>,
    config: FeedCacheConfig,
}

impl FeedCache {
    pub fn new(config: FeedCacheConfig) -> Self {
        let fresh = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(config.revalidate_window)
            .build();

        let stale = Cache::builder().max_capacity(config.capacity).build();

        tracing::info!(
            capacity = config.capacity,
            revalidate_window_secs = config.revalidate_window.as_secs(),
            "feed cache initialized"
        );

        Self {
            fresh,
            stale,
            config,
        }
    }

    pub fn config(&self) -> &FeedCacheConfig {
        &self.config
    }

    /// Get a page, fetching it if needed.
    ///
    /// 1. Fresh entry: returned, no fetch.
    /// 2. Stale entry: returned, refresh started in the background.
    /// 3. Nothing cached: fetched; concurrent callers share the fetch.
    pub async fn get(
        &self,
        key: &FeedKey,
        fetcher: &Arc<dyn FeedFetcher>,
    ) -> Result<Arc<FeedPage>> {
        if let Some(page) = self.fresh.get(key).await {
            tracing::debug!(key = %key, "feed cache hit");
            return Ok(page);
        }

        if let Some(entry) = self.stale.get(key).await {
            tracing::debug!(
                key = %key,
                fetched_at = %entry.fetched_at,
                "serving stale page, revalidating"
            );
            self.spawn_refresh(key.clone(), Arc::clone(fetcher));
            return Ok(entry.page);
        }

        tracing::debug!(key = %key, "feed cache miss");
        self.load(key, fetcher).await
    }

    /// Force a refetch of `key`.
    ///
    /// On failure the previous page stays servable.
    pub async fn revalidate(
        &self,
        key: &FeedKey,
        fetcher: &Arc<dyn FeedFetcher>,
    ) -> Result<Arc<FeedPage>> {
        self.fresh.invalidate(key).await;
        self.load(key, fetcher).await
    }

    /// The cached entry for `key`, fresh or stale.
    pub async fn entry(&self, key: &FeedKey) -> Option<CachedPage> {
        self.stale.get(key).await
    }

    /// Whether `key` is inside its revalidation window.
    pub async fn is_fresh(&self, key: &FeedKey) -> bool {
        self.fresh.contains_key(key)
    }

    async fn load(&self, key: &FeedKey, fetcher: &Arc<dyn FeedFetcher>) -> Result<Arc<FeedPage>> {
        let result = self
            .fresh
            .try_get_with(key.clone(), async {
                fetcher.fetch(key).await.map(Arc::new)
            })
            .await;

        match result {
            Ok(page) => {
                // Last write wins.
                let entry = CachedPage {
                    page: Arc::clone(&page),
                    fetched_at: Utc::now(),
                };
                self.stale.insert(key.clone(), entry).await;
                Ok(page)
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "feed fetch failed");
                Err((*err).clone())
            }
        }
    }

    fn spawn_refresh(&self, key: FeedKey, fetcher: Arc<dyn FeedFetcher>) {
        let cache = self.clone();
        tokio::spawn(async move {
            // Errors are logged in `load`; the stale page stays in place.
            let _ = cache.load(&key, &fetcher).await;
        });
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new(FeedCacheConfig::default())
    }
}
