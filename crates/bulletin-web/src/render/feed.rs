//! Feed listing shared by the home and profile pages.

use std::sync::Arc;

use bulletin_core::{FeedCursor, FeedPage, FeedQuery, FeedStatus};
use maud::{Markup, html};
use url::form_urlencoded;

use super::ads::AdEmbeds;
use super::components::feed_card;

/// Most pages a single request may ask for.
pub const MAX_PAGES: usize = 10;

/// Pages loaded for one render, plus where the cursor stopped.
#[derive(Debug, Clone)]
pub struct FeedView {
    pub pages: Vec<Arc<FeedPage>>,
    pub status: FeedStatus,
    /// Number of pages the request asked for.
    pub requested: usize,
}

impl FeedView {
    /// Load up to `pages` pages through `cursor`.
    ///
    /// Stops early when the feed ends or a page fails; pages loaded before
    /// a failure are kept.
    pub async fn load(cursor: &FeedCursor, pages: usize) -> Self {
        let requested = pages.clamp(1, MAX_PAGES);
        for _ in 0..requested {
            match cursor.load_next().await {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(err) => {
                    tracing::debug!(error = %err, "feed stopped at failed page");
                    break;
                }
            }
        }

        Self {
            pages: cursor.pages(),
            status: cursor.status(),
            requested,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, FeedStatus::Failed { .. })
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|p| p.items.len()).sum()
    }
}

/// Builds "load more" and "retry" links that keep the current filters.
#[derive(Debug, Clone)]
pub struct FeedLinks<'a> {
    /// Path of the page being rendered.
    pub path: &'a str,
    pub query: &'a FeedQuery,
}

impl FeedLinks<'_> {
    /// Link to this page showing `pages` pages.
    pub fn with_pages(&self, pages: usize) -> String {
        let mut qs = form_urlencoded::Serializer::new(String::new());
        if let Some(category) = &self.query.category {
            qs.append_pair("category", category);
        }
        if let Some(search) = &self.query.search {
            qs.append_pair("q", search);
        }
        if pages > 1 {
            qs.append_pair("pages", &pages.min(MAX_PAGES).to_string());
        }
        let qs = qs.finish();
        if qs.is_empty() {
            self.path.to_string()
        } else {
            format!("{}?{qs}", self.path)
        }
    }
}

/// The feed cards with an ad slot after each page, followed by the
/// pagination footer.
pub fn feed_list(view: &FeedView, links: &FeedLinks<'_>, ads: &mut AdEmbeds<'_>) -> Markup {
    html! {
        section class="feed" {
            @for page in &view.pages {
                @for item in &page.items {
                    (feed_card(item))
                }
                (ads.slot(&format!("feed-{}", page.page_index)))
            }
        }
        (feed_footer(view, links))
    }
}

fn feed_footer(view: &FeedView, links: &FeedLinks<'_>) -> Markup {
    let loaded = view.pages.len();
    html! {
        div class="feed-footer" {
            @match &view.status {
                FeedStatus::Failed { page_index, .. } => {
                    p class="feed-error" {
                        @if *page_index == 0 {
                            "We couldn't load the feed."
                        } @else {
                            "We couldn't load more stories."
                        }
                    }
                    // Reloading with the same page count retries the failed page.
                    a class="button" href=(links.with_pages(view.requested.max(page_index + 1))) rel="nofollow" {
                        "Try again"
                    }
                }
                FeedStatus::Exhausted if view.item_count() == 0 => {
                    p { "No stories yet." }
                }
                FeedStatus::Exhausted => {
                    p { "You're all caught up." }
                }
                FeedStatus::Loaded if loaded < MAX_PAGES => {
                    a class="button" href=(links.with_pages(loaded + 1)) rel="nofollow" {
                        "Load more"
                    }
                }
                FeedStatus::Loaded | FeedStatus::Idle | FeedStatus::Loading { .. } => {}
            }
        }
    }
}
