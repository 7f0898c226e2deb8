//! Application state shared across all request handlers.

use std::sync::Arc;

use bulletin_core::{
    CursorOptions, FeedCache, FeedCacheConfig, FeedCursor, FeedFetcher, FeedQuery, query_keys,
};
use moka::future::Cache;

use crate::client::{Article, FeedApiClient, Profile};
use crate::config::Config;

/// Article cache keyed by article id.
pub type ArticleCache = Cache<u64, Arc<Article>>;

/// Profile cache keyed by username.
pub type ProfileCache = Cache<String, Arc<Profile>>;

/// Detail page cache capacity (number of entries).
const DETAIL_CACHE_CAPACITY: u64 = 10_000;

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// Feed provider client.
    pub client: Arc<FeedApiClient>,

    /// Process-wide feed page cache, shared by every cursor.
    pub feed_cache: FeedCache,

    /// Articles, kept for the revalidation window.
    pub articles: ArticleCache,

    /// Profiles, kept for the revalidation window.
    pub profiles: ProfileCache,
}

impl AppState {
    /// Create a new application state from configuration.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = FeedApiClient::new(&config.feed)?;

        let feed_cache = FeedCache::new(FeedCacheConfig {
            revalidate_window: config.feed.revalidate_window,
            capacity: config.feed.cache_capacity,
        });

        let articles = Cache::builder()
            .max_capacity(DETAIL_CACHE_CAPACITY)
            .time_to_live(config.feed.revalidate_window)
            .build();

        let profiles = Cache::builder()
            .max_capacity(DETAIL_CACHE_CAPACITY)
            .time_to_live(config.feed.revalidate_window)
            .build();

        tracing::info!(
            detail_cache_capacity = DETAIL_CACHE_CAPACITY,
            detail_cache_ttl_secs = config.feed.revalidate_window.as_secs(),
            "application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            client: Arc::new(client),
            feed_cache,
            articles,
            profiles,
        })
    }

    /// A fresh cursor over `query`, backed by the shared cache.
    pub fn cursor(&self, query: FeedQuery) -> FeedCursor {
        let fetcher: Arc<dyn FeedFetcher> = self.client.clone();
        FeedCursor::new(
            self.feed_cache.clone(),
            fetcher,
            query_keys(query),
            CursorOptions {
                revalidate_on_focus: self.config.feed.revalidate_on_focus,
            },
        )
    }

    /// Fetch an article through the detail cache. Concurrent requests for
    /// the same id share one provider call; failures are not cached.
    pub async fn article(&self, id: u64) -> bulletin_core::Result<Arc<Article>> {
        let client = Arc::clone(&self.client);
        self.articles
            .try_get_with(id, async move { client.article(id).await.map(Arc::new) })
            .await
            .map_err(|err| (*err).clone())
    }

    /// Fetch a profile through the detail cache.
    pub async fn profile(&self, username: &str) -> bulletin_core::Result<Arc<Profile>> {
        let client = Arc::clone(&self.client);
        let name = username.to_string();
        self.profiles
            .try_get_with(username.to_string(), async move {
                client.profile(&name).await.map(Arc::new)
            })
            .await
            .map_err(|err| (*err).clone())
    }
}
