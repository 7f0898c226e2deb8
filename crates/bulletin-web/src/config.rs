//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// Public base URL of this site (used in canonical URLs and OG tags).
    pub base_url: String,

    /// Site name shown in page titles and OG tags.
    pub site_name: String,

    /// Feed provider configuration.
    pub feed: FeedConfig,

    /// Deep-link redirect targets and app association identifiers.
    pub links: LinkConfig,

    /// Ad network configuration. `None` disables ad slots entirely.
    pub ads: Option<AdConfig>,
}

/// Feed provider and feed cache settings.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL of the feed provider API.
    pub api_url: String,

    /// Items requested per page.
    pub page_size: u32,

    /// Transport timeout for provider requests.
    pub timeout: Duration,

    /// Revalidation (dedup / stale-while-revalidate) window.
    pub revalidate_window: Duration,

    /// Whether cursors refetch on focus.
    pub revalidate_on_focus: bool,

    /// Maximum number of cached pages.
    pub cache_capacity: u64,
}

/// Where the deep-link shims send visitors.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub app_store_url: String,
    pub play_store_url: String,
    pub docs_url: String,
    /// `TEAMID.bundle.id` for the Apple app site association document.
    pub ios_app_id: Option<String>,
    /// Android package name for `assetlinks.json`.
    pub android_package: Option<String>,
    /// SHA-256 signing certificate fingerprints for `assetlinks.json`.
    pub android_cert_fingerprints: Vec<String>,
}

/// Ad network settings.
#[derive(Debug, Clone)]
pub struct AdConfig {
    /// Publisher/client id passed to the ad network.
    pub client_id: String,
    /// Loader script URL.
    pub script_url: String,
}

const DEFAULT_AD_SCRIPT_URL: &str = "https://ads.example.net/loader.js";

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - None (all have defaults for local development)
    ///
    /// Optional:
    /// - `BULLETIN_BIND_ADDR`: Server bind address (default: "0.0.0.0:8080")
    /// - `BULLETIN_BASE_URL`: Public base URL (default: "http://localhost:8080")
    /// - `BULLETIN_SITE_NAME`: Site name (default: "Bulletin")
    /// - `BULLETIN_FEED_API_URL`: Feed provider URL (default: "http://localhost:9000")
    /// - `BULLETIN_FEED_PAGE_SIZE`: Items per page (default: 20)
    /// - `BULLETIN_FEED_TIMEOUT_SECS`: Provider timeout (default: 10)
    /// - `BULLETIN_FEED_REVALIDATE_SECS`: Revalidation window (default: 600)
    /// - `BULLETIN_FEED_REVALIDATE_ON_FOCUS`: Refetch on focus (default: false)
    /// - `BULLETIN_FEED_CACHE_CAPACITY`: Cached pages (default: 10000)
    /// - `BULLETIN_APP_STORE_URL`, `BULLETIN_PLAY_STORE_URL`, `BULLETIN_DOCS_URL`
    /// - `BULLETIN_IOS_APP_ID`, `BULLETIN_ANDROID_PACKAGE`,
    ///   `BULLETIN_ANDROID_CERT_FINGERPRINTS` (comma-separated)
    /// - `BULLETIN_AD_CLIENT_ID`, `BULLETIN_AD_SCRIPT_URL`
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env_or("BULLETIN_BIND_ADDR", "0.0.0.0:8080");

        let base_url = env_or("BULLETIN_BASE_URL", "http://localhost:8080")
            .trim_end_matches('/')
            .to_string();

        let site_name = env_or("BULLETIN_SITE_NAME", "Bulletin");

        let feed = FeedConfig {
            api_url: env_or("BULLETIN_FEED_API_URL", "http://localhost:9000")
                .trim_end_matches('/')
                .to_string(),
            page_size: env_parse("BULLETIN_FEED_PAGE_SIZE", 20),
            timeout: Duration::from_secs(env_parse("BULLETIN_FEED_TIMEOUT_SECS", 10)),
            revalidate_window: Duration::from_secs(env_parse(
                "BULLETIN_FEED_REVALIDATE_SECS",
                600,
            )),
            revalidate_on_focus: env_parse("BULLETIN_FEED_REVALIDATE_ON_FOCUS", false),
            cache_capacity: env_parse("BULLETIN_FEED_CACHE_CAPACITY", 10_000),
        };

        if feed.page_size == 0 {
            anyhow::bail!("BULLETIN_FEED_PAGE_SIZE must be at least 1");
        }

        let links = LinkConfig {
            app_store_url: env_or(
                "BULLETIN_APP_STORE_URL",
                "https://apps.apple.com/app/bulletin",
            ),
            play_store_url: env_or(
                "BULLETIN_PLAY_STORE_URL",
                "https://play.google.com/store/apps/details?id=app.bulletin",
            ),
            docs_url: env_or("BULLETIN_DOCS_URL", "https://docs.example.com"),
            ios_app_id: env_opt("BULLETIN_IOS_APP_ID"),
            android_package: env_opt("BULLETIN_ANDROID_PACKAGE"),
            android_cert_fingerprints: std::env::var("BULLETIN_ANDROID_CERT_FINGERPRINTS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
        };

        let ads = env_opt("BULLETIN_AD_CLIENT_ID").map(|client_id| AdConfig {
            client_id,
            script_url: env_or("BULLETIN_AD_SCRIPT_URL", DEFAULT_AD_SCRIPT_URL),
        });

        tracing::info!(
            bind_addr = %bind_addr,
            base_url = %base_url,
            site_name = %site_name,
            feed_api_url = %feed.api_url,
            revalidate_secs = feed.revalidate_window.as_secs(),
            revalidate_on_focus = feed.revalidate_on_focus,
            ads_enabled = ads.is_some(),
            "web configuration loaded"
        );

        Ok(Self {
            bind_addr,
            base_url,
            site_name,
            feed,
            links,
            ads,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Non-empty value of `key`, trimmed.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `key`, falling back to `default` (with a warning) on bad input.
fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    default = %default,
                    "invalid value, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}
