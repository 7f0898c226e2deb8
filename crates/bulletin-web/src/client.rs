//! HTTP client for the feed provider API.
//!
//! ## Endpoints
//!
//! - `GET {api}/feed?category=&q=&author=&cursor=&limit=` - one feed page
//! - `GET {api}/articles/{id}` - a single article with its markdown body
//! - `GET {api}/users/{username}` - a public profile

use async_trait::async_trait;
use bulletin_core::{FeedAuthor, FeedError, FeedFetcher, FeedItem, FeedKey, FeedPage};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::FeedConfig;

/// Responses larger than this are treated as undecodable.
const MAX_BODY_BYTES: usize = 5_000_000;

/// A full article as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    /// Markdown source.
    #[serde(default)]
    pub body: String,
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

/// A public user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub article_count: u64,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

/// Wire shape of `GET /feed`.
#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    items: Vec<FeedItem>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

/// Feed provider client.
///
/// Cheap to share behind an `Arc`; the inner `reqwest::Client` pools
/// connections.
#[derive(Debug, Clone)]
pub struct FeedApiClient {
    http: Client,
    base: Url,
    page_size: u32,
}

impl FeedApiClient {
    pub fn new(config: &FeedConfig) -> anyhow::Result<Self> {
        let base = Url::parse(&config.api_url)?;
        if base.cannot_be_a_base() {
            anyhow::bail!("feed API URL cannot be a base: {}", config.api_url);
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bulletin-web/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base,
            page_size: config.page_size,
        })
    }

    /// Fetch a single article.
    pub async fn article(&self, id: u64) -> bulletin_core::Result<Article> {
        let url = self.endpoint(&["articles", &id.to_string()])?;
        self.get_json(url).await
    }

    /// Fetch a public profile.
    pub async fn profile(&self, username: &str) -> bulletin_core::Result<Profile> {
        let url = self.endpoint(&["users", username])?;
        self.get_json(url).await
    }

    /// Build the URL of the feed page for `key`.
    fn feed_url(&self, key: &FeedKey) -> bulletin_core::Result<Url> {
        let mut url = self.endpoint(&["feed"])?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(category) = &key.query.category {
                pairs.append_pair("category", category);
            }
            if let Some(search) = &key.query.search {
                pairs.append_pair("q", search);
            }
            if let Some(author) = &key.query.author {
                pairs.append_pair("author", author);
            }
            if let Some(cursor) = &key.cursor {
                pairs.append_pair("cursor", cursor);
            }
            pairs.append_pair("limit", &self.page_size.to_string());
        }
        Ok(url)
    }

    /// Append path segments to the base URL. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> bulletin_core::Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FeedError::Transport(format!("invalid base URL: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> bulletin_core::Result<T> {
        tracing::debug!(url = %url, "feed provider request");

        let response = self
            .http
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "feed provider error status");
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        if body.len() > MAX_BODY_BYTES {
            return Err(FeedError::Decode(format!(
                "response body too large ({} bytes)",
                body.len()
            )));
        }

        serde_json::from_slice(&body).map_err(|e| FeedError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FeedFetcher for FeedApiClient {
    async fn fetch(&self, key: &FeedKey) -> bulletin_core::Result<FeedPage> {
        let url = self.feed_url(key)?;
        let response: FeedResponse = self.get_json(url).await?;

        tracing::debug!(
            key = %key,
            items = response.items.len(),
            has_more = response.has_more,
            "feed page fetched"
        );

        Ok(FeedPage {
            items: response.items,
            page_index: key.page_index,
            has_more: response.has_more,
            next_cursor: response.next_cursor,
        })
    }
}
