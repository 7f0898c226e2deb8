//! Fallback page handler.
//!
//! Every path without a dedicated route lands here. The page is chosen from
//! the path the client actually requested ([`OriginalUri`]), never from the
//! URI the router hands to this handler, which is rewritten under `nest`.

use axum::extract::rejection::QueryRejection;
use axum::extract::{OriginalUri, Query, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use bulletin_core::{FeedQuery, LocationSource, RouteKind, RouteWatcher};
use serde::Deserialize;

use crate::error::PageError;
use crate::render::{self, components};
use crate::state::AppState;

/// Query string accepted by feed pages.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub category: Option<String>,
    pub q: Option<String>,
    /// Parsed leniently; anything unusable means one page.
    pub pages: Option<String>,
}

/// Query parameters, or their defaults when the query string is unusable
/// (a repeated key, for instance).
pub(crate) fn params_or_default<T: Default>(query: Result<Query<T>, QueryRejection>) -> T {
    match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "ignoring unusable query string");
            T::default()
        }
    }
}

impl PageParams {
    pub fn feed_query(&self) -> FeedQuery {
        FeedQuery {
            category: self.category.clone(),
            search: self.q.clone(),
            author: None,
        }
        .normalized()
    }

    pub fn pages(&self) -> usize {
        self.pages
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, render::feed::MAX_PAGES)
    }
}

/// The request's original path as a location source.
struct RequestLocation(Uri);

impl LocationSource for RequestLocation {
    fn pathname(&self) -> Option<String> {
        let path = self.0.path();
        path.starts_with('/').then(|| path.to_string())
    }
}

/// Render the page for the requested path.
pub async fn page_handler(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(original): OriginalUri,
    uri: Uri,
    request_headers: HeaderMap,
    query: Result<Query<PageParams>, QueryRejection>,
) -> Result<Response, PageError> {
    let params = params_or_default(query);

    if method != Method::GET && method != Method::HEAD {
        return Ok((
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET, HEAD")],
        )
            .into_response());
    }

    let watcher = RouteWatcher::new(RequestLocation(original));
    let route = watcher.notify(uri.path());

    let page = render::render_page(&state, &route, params.feed_query(), params.pages()).await?;

    let csp = components::csp_header(state.config.ads.as_ref());
    Ok(build_response(
        &page.markup.into_string(),
        &csp,
        cache_headers(page.kind, page.feed_failed),
        &request_headers,
    ))
}

/// Build an HTTP response with HTML content and security/cache headers.
///
/// Answers `304 Not Modified` when the request's `If-None-Match` carries
/// the page's ETag.
pub(crate) fn build_response(
    html: &str,
    csp: &str,
    cache_headers: HeaderMap,
    request_headers: &HeaderMap,
) -> Response {
    let mut headers = HeaderMap::new();

    // Content type
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );

    // Security headers
    if let Ok(val) = HeaderValue::from_str(csp) {
        headers.insert(header::CONTENT_SECURITY_POLICY, val);
    }
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

    // ETag (xxHash of content)
    let hash = xxhash_rust::xxh3::xxh3_64(html.as_bytes());
    let etag = format!("\"{}\"", hex_fmt::HexFmt(&hash.to_be_bytes()));
    if let Ok(val) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, val);
    }

    // Merge cache headers
    for (key, value) in cache_headers.iter() {
        headers.insert(key.clone(), value.clone());
    }

    let not_modified = request_headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|tag| tag.trim() == etag));

    if not_modified {
        return (StatusCode::NOT_MODIFIED, headers).into_response();
    }

    (StatusCode::OK, headers, html.to_string()).into_response()
}

/// Compute Cache-Control headers for a page.
///
/// TTL tiers:
/// - Home feed: 5min s-maxage
/// - Profiles: 30min s-maxage
/// - Articles: 1h s-maxage
///
/// Placeholders and pages with a failed feed page are never cached.
fn cache_headers(kind: Option<RouteKind>, feed_failed: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let cache_value = match determine_ttl(kind, feed_failed) {
        Some((max_age, s_maxage, swr)) => format!(
            "public, max-age={max_age}, s-maxage={s_maxage}, stale-while-revalidate={swr}"
        ),
        None => "no-store".to_string(),
    };

    if let Ok(val) = HeaderValue::from_str(&cache_value) {
        headers.insert(header::CACHE_CONTROL, val);
    }

    headers
}

/// Returns (browser_ttl, cdn_ttl, stale_while_revalidate) in seconds.
fn determine_ttl(kind: Option<RouteKind>, feed_failed: bool) -> Option<(u32, u32, u32)> {
    if feed_failed {
        return None;
    }
    match kind? {
        RouteKind::Home => Some((60, 300, 600)),     // 1min browser, 5min CDN, 10min SWR
        RouteKind::Profile => Some((60, 1800, 300)), // 1min browser, 30min CDN, 5min SWR
        RouteKind::Article => Some((60, 3600, 600)), // 1min browser, 1h CDN, 10min SWR
    }
}
