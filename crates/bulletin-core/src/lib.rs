//! Core types for the Bulletin web front.
//!
//! This crate provides:
//! - Path resolution for the fallback document ([`route`])
//! - A location watcher that never trusts a lagging route signal ([`location`])
//! - Paginated feed caching with fetch coalescing and
//!   stale-while-revalidate ([`feed`])
//! - Idempotent third-party embed attachment ([`embed`])
//! - Shared error types

pub mod embed;
mod error;
pub mod feed;
pub mod location;
pub mod route;

pub use embed::{EmbedGuard, EmbedRegistry};
pub use error::{FeedError, Result};
pub use feed::{
    CachedPage, CursorOptions, FeedAuthor, FeedCache, FeedCacheConfig, FeedCursor, FeedFetcher,
    FeedItem, FeedKey, FeedPage, FeedQuery, FeedStatus, KeyFn, query_keys,
};
pub use location::{LocationSource, RouteState, RouteWatcher};
pub use route::{RouteKind, RouteMatch, resolve};
