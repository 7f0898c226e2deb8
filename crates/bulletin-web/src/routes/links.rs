//! Deep-link shims.
//!
//! When the app is installed the OS intercepts these paths (universal
//! links / app links) before the request is made. Otherwise they redirect
//! to a store or the docs and never fail.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;

use crate::state::AppState;

/// Paths the app claims as universal links.
const APP_PATHS: &[&str] = &["/article/*", "/u/*"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Platform {
    Ios,
    Android,
    Other,
}

fn platform(headers: &HeaderMap) -> Platform {
    let ua = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iPod") {
        Platform::Ios
    } else if ua.contains("Android") {
        Platform::Android
    } else {
        Platform::Other
    }
}

/// `GET /download` - store for the visitor's platform, docs otherwise.
pub async fn download(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    let links = &state.config.links;
    let target = match platform(&headers) {
        Platform::Ios => &links.app_store_url,
        Platform::Android => &links.play_store_url,
        Platform::Other => &links.docs_url,
    };
    Redirect::temporary(target)
}

/// `GET /download/ios`
pub async fn download_ios(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.config.links.app_store_url)
}

/// `GET /download/android`
pub async fn download_android(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.config.links.play_store_url)
}

/// `GET /docs`
pub async fn docs(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.config.links.docs_url)
}

/// `GET /.well-known/apple-app-site-association`
pub async fn apple_app_site_association(State(state): State<AppState>) -> Response {
    let Some(app_id) = state.config.links.ios_app_id.as_deref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    Json(json!({
        "applinks": {
            "apps": [],
            "details": [{ "appID": app_id, "paths": APP_PATHS }]
        }
    }))
    .into_response()
}

/// `GET /.well-known/assetlinks.json`
pub async fn assetlinks(State(state): State<AppState>) -> Response {
    let links = &state.config.links;
    let Some(package) = links.android_package.as_deref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    Json(json!([{
        "relation": ["delegate_permission/common.handle_all_urls"],
        "target": {
            "namespace": "android_app",
            "package_name": package,
            "sha256_cert_fingerprints": links.android_cert_fingerprints,
        }
    }]))
    .into_response()
}
