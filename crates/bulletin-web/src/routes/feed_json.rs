//! JSON feed endpoint.
//!
//! Serves loaded feed pages at `GET /feed.json?category=&q=&pages=&focus=`.
//! Designed for the client script and programmatic consumers.
//!
//! Format:
//! ```json
//! {
//!   "status": "loaded" | "exhausted" | "failed",
//!   "has_more": true,
//!   "error": null,
//!   "pages": [ { "items": [...], "page_index": 0, "has_more": true, "next_cursor": "..." } ]
//! }
//! ```
//!
//! `focus=1` reports that the client regained focus; loaded pages are
//! revalidated only when revalidate-on-focus is enabled.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bulletin_core::{FeedPage, FeedStatus};
use serde::{Deserialize, Serialize};

use crate::render::feed::FeedView;
use crate::state::AppState;

use super::page::{PageParams, params_or_default};

#[derive(Debug, Default, Deserialize)]
pub struct FeedJsonParams {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(default)]
    pub focus: Option<String>,
}

impl FeedJsonParams {
    fn focused(&self) -> bool {
        matches!(self.focus.as_deref(), Some("1" | "true"))
    }
}

#[derive(Debug, Serialize)]
pub struct FeedJson {
    pub status: &'static str,
    pub has_more: bool,
    pub error: Option<String>,
    pub pages: Vec<FeedPage>,
}

/// Serve feed pages as JSON.
pub async fn feed_json(
    State(state): State<AppState>,
    query: Result<Query<FeedJsonParams>, QueryRejection>,
) -> Response {
    let params = params_or_default(query);
    let cursor = state.cursor(params.page.feed_query());
    let mut view = FeedView::load(&cursor, params.page.pages()).await;

    if params.focused() && !view.is_failed() {
        match cursor.on_focus().await {
            Ok(()) => {
                view.pages = cursor.pages();
                view.status = cursor.status();
            }
            Err(err) => tracing::debug!(error = %err, "focus revalidation failed"),
        }
    }

    let (status, error) = match &view.status {
        FeedStatus::Failed { error, .. } => ("failed", Some(error.to_string())),
        FeedStatus::Exhausted => ("exhausted", None),
        _ => ("loaded", None),
    };

    let code = match &view.status {
        FeedStatus::Failed { page_index: 0, .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };

    let cache_control = if view.is_failed() {
        HeaderValue::from_static("no-store")
    } else {
        HeaderValue::from_static("public, max-age=60, s-maxage=300, stale-while-revalidate=600")
    };

    let body = FeedJson {
        status,
        has_more: cursor.has_more(),
        error,
        pages: view.pages.iter().map(|p| FeedPage::clone(p)).collect(),
    };

    (
        code,
        [(header::CACHE_CONTROL, cache_control)],
        Json(body),
    )
        .into_response()
}
