//! Bulletin Web - server-rendered guest pages for Bulletin.
//!
//! This crate provides a lightweight HTTP server that stands in for a
//! static host's fallback document: every path without a dedicated route
//! is rendered by one handler that decides, from the request path alone,
//! which page to show. It is designed to be placed behind a CDN.
//!
//! # Architecture
//!
//! - **Resolve**: `bulletin_core::resolve` picks the page from the original
//!   request path
//! - **Fetch**: [`client::FeedApiClient`] talks to the feed provider; feed
//!   pages go through the shared `bulletin_core::FeedCache`
//! - **Render**: HTML with Open Graph tags using maud (compile-time templates)
//!
//! # URL Patterns
//!
//! ```text
//! GET /article/{id}     article page
//! GET /u/{username}     profile page with the author's feed
//! GET /anything-else    home feed (?category=&q=&pages=)
//! ```
//!
//! # Security
//!
//! - All dynamic content is HTML-escaped by maud; raw HTML in article
//!   markdown is escaped
//! - URLs are validated (HTTPS/HTTP only) before use in attributes
//! - Strict Content-Security-Policy; scripts only from the ad network when
//!   ads are configured
//! - X-Frame-Options: DENY prevents clickjacking

pub mod client;
pub mod config;
pub mod error;
pub mod render;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
