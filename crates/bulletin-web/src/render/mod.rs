//! HTML rendering for the fallback document.
//!
//! [`render_page`] takes the resolved route and dispatches to the page
//! renderer for its kind. Every dynamic value is escaped by
//! [maud](https://maud.lambda.xyz/).

pub mod ads;
pub mod article;
pub mod components;
pub mod feed;
pub mod home;
pub mod profile;

use bulletin_core::route::{PARAM_ID, PARAM_USERNAME};
use bulletin_core::{FeedQuery, RouteKind, RouteState};
use maud::{Markup, html};

use self::ads::AdEmbeds;
use self::components::{OpenGraphData, page_shell, profile_path};
use self::feed::{FeedLinks, FeedView};
use crate::error::PageError;
use crate::state::AppState;

/// A rendered page plus what the response layer needs to pick headers.
pub struct RenderedPage {
    pub markup: Markup,
    /// `None` for the placeholder.
    pub kind: Option<RouteKind>,
    /// A feed page failed; the response must not be cached.
    pub feed_failed: bool,
}

/// Render the page for `route`.
///
/// `query` and `pages` come from the request's query string and only
/// affect feed pages.
pub async fn render_page(
    state: &AppState,
    route: &RouteState,
    query: FeedQuery,
    pages: usize,
) -> Result<RenderedPage, PageError> {
    let config = &state.config;
    let base_url = &config.base_url;
    let site_name = &config.site_name;

    let Some(route) = route.route() else {
        return Ok(RenderedPage {
            markup: placeholder(base_url, site_name),
            kind: None,
            feed_failed: false,
        });
    };

    // Embeds are released when this render returns.
    let mut ads = AdEmbeds::new(config.ads.as_ref());

    let (markup, feed_failed) = match route.kind() {
        RouteKind::Home => {
            let query = FeedQuery {
                author: None,
                ..query
            };
            let view = FeedView::load(&state.cursor(query.clone()), pages).await;
            let links = FeedLinks {
                path: "/",
                query: &query,
            };
            (
                home::render(&view, &links, base_url, site_name, &mut ads),
                view.is_failed(),
            )
        }

        RouteKind::Article => {
            let raw = route.param(PARAM_ID).unwrap_or_default();
            // Digit runs too long for u64 cannot name an article.
            let id: u64 = raw
                .parse()
                .map_err(|_| PageError::NotFound(format!("article {raw}")))?;
            let article = state.article(id).await?;
            (article::render(&article, base_url, site_name, &mut ads), false)
        }

        RouteKind::Profile => {
            let username = route.param(PARAM_USERNAME).unwrap_or_default();
            let query = FeedQuery {
                author: Some(username.to_string()),
                ..FeedQuery::default()
            };
            let cursor = state.cursor(query.clone());
            let (profile, view) =
                tokio::join!(state.profile(username), FeedView::load(&cursor, pages));
            let profile = profile?;
            let path = profile_path(username);
            let links = FeedLinks {
                path: &path,
                query: &query,
            };
            (
                profile::render(&profile, &view, &links, base_url, site_name, &mut ads),
                view.is_failed(),
            )
        }
    };

    tracing::debug!(
        kind = route.kind().as_str(),
        path = %route.raw_path(),
        embeds = ads.attached(),
        feed_failed,
        "page rendered"
    );

    Ok(RenderedPage {
        markup,
        kind: Some(route.kind()),
        feed_failed,
    })
}

/// Neutral page shown before the real location is known.
fn placeholder(base_url: &str, site_name: &str) -> Markup {
    let description = format!("{site_name} is loading.");
    let og = OpenGraphData {
        title: site_name,
        description: &description,
        og_type: "website",
        image: None,
        twitter_card_type: "summary",
    };
    let body = html! {
        div class="placeholder" aria-busy="true" { "Loading..." }
    };
    page_shell(site_name, &description, &format!("{base_url}/"), og, body, site_name)
}
