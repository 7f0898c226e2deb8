//! Paginated feed data.
//!
//! - [`FeedCache`] - process-wide page cache with fetch coalescing and
//!   stale-while-revalidate
//! - [`FeedCursor`] - one view's growing sequence of pages
//!
//! # Keys
//!
//! A cursor asks a key function for the key of page `n`, passing the
//! previous page so provider cursors can be threaded through. Returning
//! `None` ends pagination. [`query_keys`] is the key function used for the
//! provider's cursor-based feed endpoint.

mod cache;
mod cursor;

pub use cache::{CachedPage, FeedCache, FeedCacheConfig};
pub use cursor::{CursorOptions, FeedCursor, FeedStatus};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Author summary attached to a feed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedAuthor {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl FeedAuthor {
    /// Best name to show, falling back to the username.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

/// One entry of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub author: FeedAuthor,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub like_count: u64,
}

/// One page of feed results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    /// Position in the sequence, starting at 0.
    pub page_index: usize,
    /// `false` means this is the last page.
    pub has_more: bool,
    /// Provider cursor for the following page.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Caller-visible filter inputs. Changing any of them starts a new sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "q")]
    pub search: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

impl FeedQuery {
    /// Drop empty strings so `?category=` and no parameter share a key.
    pub fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            category: clean(self.category),
            search: clean(self.search),
            author: clean(self.author),
        }
    }
}

/// Cache key for one page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedKey {
    pub query: FeedQuery,
    pub page_index: usize,
    /// Provider cursor; `None` for the first page.
    pub cursor: Option<String>,
}

impl FeedKey {
    pub fn first(query: FeedQuery) -> Self {
        Self {
            query,
            page_index: 0,
            cursor: None,
        }
    }
}

impl fmt::Display for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "feed:category={}&q={}&author={}&page={}&cursor={}",
            self.query.category.as_deref().unwrap_or(""),
            self.query.search.as_deref().unwrap_or(""),
            self.query.author.as_deref().unwrap_or(""),
            self.page_index,
            self.cursor.as_deref().unwrap_or(""),
        )
    }
}

/// Maps `(page_index, previous_page)` to the key of that page, or `None`
/// when there are no further pages.
pub type KeyFn = Arc<dyn Fn(usize, Option<&FeedPage>) -> Option<FeedKey> + Send + Sync>;

/// Fetches one page from the feed provider.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, key: &FeedKey) -> Result<FeedPage>;
}

/// Key function for cursor-paginated queries.
///
/// Page 0 has no cursor; page `n` uses the previous page's `next_cursor`.
/// Stops when the previous page reports `has_more = false` or carries no
/// cursor.
pub fn query_keys(query: FeedQuery) -> KeyFn {
    Arc::new(move |page_index, previous| {
        if page_index == 0 {
            return Some(FeedKey::first(query.clone()));
        }
        let previous = previous?;
        if !previous.has_more {
            return None;
        }
        let cursor = previous.next_cursor.clone()?;
        Some(FeedKey {
            query: query.clone(),
            page_index,
            cursor: Some(cursor),
        })
    })
}
