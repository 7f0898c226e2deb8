//! Error types for the web front.
//!
//! Errors are rendered as simple HTML error pages rather than JSON,
//! since this is a user-facing HTML service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bulletin_core::FeedError;
use maud::{DOCTYPE, html};

/// Page rendering error type.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// The requested article or profile does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The feed provider failed or returned something unusable.
    #[error("upstream error: {0}")]
    Upstream(#[from] FeedError),
}

impl PageError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (title, message) = match &self {
            Self::NotFound(what) => (
                "Not Found",
                format!("We couldn't find {what}. It may have been removed."),
            ),
            Self::Upstream(err) if err.is_not_found() => (
                "Not Found",
                "We couldn't find that page. It may have been removed.".to_string(),
            ),
            Self::Upstream(err) => {
                tracing::error!(error = %err, "feed provider error");
                (
                    "Temporarily Unavailable",
                    "The feed is temporarily unavailable. Please try again in a moment."
                        .to_string(),
                )
            }
        };

        let markup = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (title) " | Bulletin" }
                    meta name="robots" content="noindex";
                    style { (maud::PreEscaped(crate::render::components::ERROR_CSS)) }
                }
                body {
                    main class="error-page" {
                        h1 { (title) }
                        p { (message) }
                        a href="/" { "Back to the feed" }
                    }
                }
            }
        };

        let mut response = (status, markup).into_response();
        response.headers_mut().insert(
            axum::http::header::CACHE_CONTROL,
            axum::http::HeaderValue::from_static("no-store"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_not_found() {
        let err = PageError::NotFound("article 42".to_string());
        assert_eq!(err.to_string(), "not found: article 42");
    }

    #[test]
    fn error_display_upstream() {
        let err = PageError::Upstream(FeedError::Status(503));
        assert_eq!(
            err.to_string(),
            format!("upstream error: {}", FeedError::Status(503))
        );
    }

    #[test]
    fn error_into_response_not_found() {
        let response = PageError::NotFound("article 1".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["cache-control"], "no-store");
    }

    #[test]
    fn error_into_response_upstream_404_is_not_found() {
        let response = PageError::Upstream(FeedError::Status(404)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn error_into_response_upstream_failure_is_bad_gateway() {
        let err = PageError::Upstream(FeedError::Transport("connection refused".into()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);

        let err = PageError::Upstream(FeedError::Decode("missing field".into()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
