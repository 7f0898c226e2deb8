//! Route definitions for the web front.
//!
//! ## Routes
//!
//! - `GET /health` - Health check (JSON)
//! - `GET /robots.txt` - Crawler instructions
//! - `GET /feed.json` - Feed pages as JSON
//! - `GET /download`, `/download/ios`, `/download/android`, `/docs` - Deep-link redirects
//! - `GET /.well-known/apple-app-site-association`, `/.well-known/assetlinks.json`
//! - anything else - the fallback document, resolved from the request path

mod feed_json;
mod health;
mod links;
mod page;

use axum::Router;
use axum::response::IntoResponse;
use axum::routing::get;

use crate::state::AppState;

/// Build the complete router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/robots.txt", get(robots_txt))
        .route("/feed.json", get(feed_json::feed_json))
        .route("/download", get(links::download))
        .route("/download/ios", get(links::download_ios))
        .route("/download/android", get(links::download_android))
        .route("/docs", get(links::docs))
        .route(
            "/.well-known/apple-app-site-association",
            get(links::apple_app_site_association),
        )
        .route("/.well-known/assetlinks.json", get(links::assetlinks))
        .fallback(page::page_handler)
        .with_state(state)
}

/// Serve robots.txt allowing all crawlers.
///
/// We want crawlers to fetch pages for link previews.
async fn robots_txt() -> impl IntoResponse {
    (
        [("content-type", "text/plain; charset=utf-8")],
        "User-agent: *\nAllow: /\nDisallow: /feed.json\n",
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::tests::{article_json, item_json, profile_json};
    use crate::config::AdConfig;
    use crate::config::tests::test_config;

    async fn get_path(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    fn app_for(server: &MockServer) -> Router {
        router(AppState::new(test_config(&server.uri())).unwrap())
    }

    /// Mount a three-page feed: c1 -> c2 -> end.
    async fn mount_feed(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param_is_missing("cursor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item_json(1, "First story"), item_json(2, "Second story")],
                "has_more": true,
                "next_cursor": "c1"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param("cursor", "c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item_json(3, "Third story")],
                "has_more": true,
                "next_cursor": "c2"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param("cursor", "c2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item_json(4, "Last story")],
                "has_more": false
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let server = MockServer::start().await;
        let (status, _, body) = get_path(app_for(&server), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "bulletin-web");
    }

    #[tokio::test]
    async fn robots_allows_crawlers() {
        let server = MockServer::start().await;
        let (status, _, body) = get_path(app_for(&server), "/robots.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Allow: /"));
    }

    #[tokio::test]
    async fn home_renders_first_page_with_headers() {
        let server = MockServer::start().await;
        mount_feed(&server).await;

        let (status, headers, body) = get_path(app_for(&server), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("First story"));
        assert!(body.contains("Second story"));
        assert!(!body.contains("Third story"));
        assert!(body.contains("href=\"/?pages=2\""));
        assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert!(headers.contains_key(header::ETAG));
        assert!(
            headers[header::CACHE_CONTROL]
                .to_str()
                .unwrap()
                .contains("stale-while-revalidate=600")
        );
    }

    #[tokio::test]
    async fn unknown_path_renders_home() {
        let server = MockServer::start().await;
        mount_feed(&server).await;

        let (status, _, body) = get_path(app_for(&server), "/settings/privacy").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("First story"));
    }

    #[tokio::test]
    async fn home_pages_walk_cursor_until_end() {
        let server = MockServer::start().await;
        mount_feed(&server).await;

        let (status, _, body) = get_path(app_for(&server), "/?pages=5").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Third story"));
        assert!(body.contains("Last story"));
        assert!(body.contains("all caught up"));
        assert!(!body.contains("Load more"));
    }

    #[tokio::test]
    async fn failed_page_keeps_earlier_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param_is_missing("cursor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item_json(1, "First story")],
                "has_more": true,
                "next_cursor": "c1"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param("cursor", "c1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (status, headers, body) = get_path(app_for(&server), "/?pages=3").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("First story"));
        assert!(body.contains("Try again"));
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn feed_pages_are_cached_across_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item_json(1, "Only story")],
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = app_for(&server);
        for _ in 0..3 {
            let (status, _, body) = get_path(app.clone(), "/").await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains("Only story"));
        }
    }

    #[tokio::test]
    async fn category_filter_reaches_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param("category", "tech"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item_json(9, "Tech story")],
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, _, body) = get_path(app_for(&server), "/?category=tech").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Tech story"));
    }

    #[tokio::test]
    async fn article_page_renders_markdown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/articles/482"))
            .respond_with(ResponseTemplate::new(200).set_body_json(article_json(482)))
            .mount(&server)
            .await;

        let (status, headers, body) = get_path(app_for(&server), "/article/482/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Rust at the edge"));
        assert!(body.contains("<strong>world</strong>"));
        assert!(
            headers[header::CACHE_CONTROL]
                .to_str()
                .unwrap()
                .contains("s-maxage=3600")
        );
    }

    #[tokio::test]
    async fn article_missing_is_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/articles/7"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (status, _, body) = get_path(app_for(&server), "/article/7").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Not Found"));
    }

    #[tokio::test]
    async fn article_provider_failure_is_502() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/articles/8"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (status, _, _) = get_path(app_for(&server), "/article/8").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn non_numeric_article_path_is_home() {
        let server = MockServer::start().await;
        mount_feed(&server).await;

        let (status, _, body) = get_path(app_for(&server), "/article/abc").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("First story"));
    }

    #[tokio::test]
    async fn profile_page_decodes_username() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/j%20doe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("j doe")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param("author", "j doe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item_json(5, "Jane story")],
                "has_more": false
            })))
            .mount(&server)
            .await;

        let (status, _, body) = get_path(app_for(&server), "/u/j%20doe").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Ada Lovelace"));
        assert!(body.contains("@j doe"));
        assert!(body.contains("Jane story"));
    }

    #[tokio::test]
    async fn profile_missing_is_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [],
                "has_more": false
            })))
            .mount(&server)
            .await;

        let (status, _, _) = get_path(app_for(&server), "/u/ghost").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn repeated_query_key_renders_with_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/jane"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("jane")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param("author", "jane"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item_json(5, "Jane story")],
                "has_more": false
            })))
            .mount(&server)
            .await;

        let (status, _, body) = get_path(app_for(&server), "/u/jane?pages=1&pages=2").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("@jane"));
        assert!(body.contains("Jane story"));
    }

    #[tokio::test]
    async fn feed_json_repeated_query_key_uses_defaults() {
        let server = MockServer::start().await;
        mount_feed(&server).await;

        let (status, _, body) =
            get_path(app_for(&server), "/feed.json?category=a&category=b").await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["pages"].as_array().unwrap().len(), 1);
        assert_eq!(json["pages"][0]["items"][0]["title"], "First story");
    }

    #[tokio::test]
    async fn post_to_fallback_is_rejected() {
        let server = MockServer::start().await;
        let response = app_for(&server)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn etag_round_trip_returns_not_modified() {
        let server = MockServer::start().await;
        mount_feed(&server).await;
        let app = app_for(&server);

        let (_, headers, _) = get_path(app.clone(), "/").await;
        let etag = headers[header::ETAG].clone();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::IF_NONE_MATCH, etag)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn ads_render_once_with_csp() {
        let server = MockServer::start().await;
        mount_feed(&server).await;
        let mut config = test_config(&server.uri());
        config.ads = Some(AdConfig {
            client_id: "pub-1".to_string(),
            script_url: "https://ads.example.net/loader.js".to_string(),
        });
        let app = router(AppState::new(config).unwrap());

        let (status, headers, body) = get_path(app, "/?pages=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches("<script").count(), 1);
        assert!(body.contains("data-ad-slot=\"home-top\""));
        assert!(body.contains("data-ad-slot=\"feed-0\""));
        assert!(body.contains("data-ad-slot=\"feed-1\""));
        assert!(
            headers[header::CONTENT_SECURITY_POLICY]
                .to_str()
                .unwrap()
                .contains("script-src https://ads.example.net")
        );
    }

    #[tokio::test]
    async fn feed_json_lists_pages() {
        let server = MockServer::start().await;
        mount_feed(&server).await;

        let (status, _, body) = get_path(app_for(&server), "/feed.json?pages=2").await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "loaded");
        assert_eq!(json["has_more"], true);
        assert_eq!(json["pages"].as_array().unwrap().len(), 2);
        assert_eq!(json["pages"][1]["items"][0]["title"], "Third story");
    }

    #[tokio::test]
    async fn feed_json_first_page_failure_is_502() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (status, headers, body) = get_path(app_for(&server), "/feed.json").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json["error"].as_str().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn feed_json_focus_respects_setting() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item_json(1, "Only story")],
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        // Disabled by default: focus does not refetch.
        let app = app_for(&server);
        let (status, _, _) = get_path(app.clone(), "/feed.json?focus=1").await;
        assert_eq!(status, StatusCode::OK);
        server.verify().await;

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item_json(1, "Only story")],
                "has_more": false
            })))
            .expect(2)
            .mount(&server)
            .await;

        let mut config = test_config(&server.uri());
        config.feed.revalidate_on_focus = true;
        let app = router(AppState::new(config).unwrap());
        let (status, _, _) = get_path(app, "/feed.json?focus=1").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn download_redirects_by_user_agent() {
        let server = MockServer::start().await;
        let app = app_for(&server);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/download")
                    .header(header::USER_AGENT, "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://apps.apple.com/app/id1"
        );

        let (status, headers, _) = get_path(app.clone(), "/download/android").await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert!(
            headers[header::LOCATION]
                .to_str()
                .unwrap()
                .starts_with("https://play.google.com/")
        );

        let (status, headers, _) = get_path(app, "/docs").await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(headers[header::LOCATION], "https://docs.bulletin.test");
    }

    #[tokio::test]
    async fn well_known_documents() {
        let server = MockServer::start().await;
        let app = app_for(&server);

        let (status, _, body) =
            get_path(app.clone(), "/.well-known/apple-app-site-association").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["applinks"]["details"][0]["appID"], "TEAM123.app.bulletin");

        let (status, _, body) = get_path(app, "/.well-known/assetlinks.json").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json[0]["target"]["package_name"], "app.bulletin");
        assert_eq!(json[0]["target"]["sha256_cert_fingerprints"][0], "AA:BB");

        let mut config = test_config(&server.uri());
        config.links.ios_app_id = None;
        config.links.android_package = None;
        let app = router(AppState::new(config).unwrap());
        let (status, _, _) = get_path(app.clone(), "/.well-known/apple-app-site-association").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = get_path(app, "/.well-known/assetlinks.json").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn slow_provider_times_out_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "items": [], "has_more": false }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let mut config = test_config(&server.uri());
        config.feed.timeout = Duration::from_millis(50);
        let app = router(AppState::new(config).unwrap());

        let (status, _, body) = get_path(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("load the feed"));
    }
}
