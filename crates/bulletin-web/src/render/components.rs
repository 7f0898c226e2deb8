//! Shared HTML components used across all pages.
//!
//! These are maud functions that return `Markup` fragments for composition
//! into full pages.

use bulletin_core::{FeedAuthor, FeedItem};
use chrono::{DateTime, Utc};
use maud::{Markup, PreEscaped, html};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::config::AdConfig;

/// Inline CSS for all pages.
pub const PAGE_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
:root{--bg:#f7f7f5;--fg:#111;--fg2:#555;--fg3:#999;--accent:#d9480f;--accent-hover:#b03a0b;--surface:#fff;--border:rgba(0,0,0,.08);--mono:"SF Mono",SFMono-Regular,ui-monospace,Menlo,monospace}
body{font-family:Inter,-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;line-height:1.6;color:var(--fg);background:var(--bg);min-height:100vh;display:flex;flex-direction:column;align-items:center;padding:1.5rem 1rem}
main{max-width:720px;width:100%;flex:1}
a{color:var(--accent);text-decoration:none}
a:hover{text-decoration:underline}
img{max-width:100%;height:auto}
svg.icon{width:18px;height:18px;fill:currentColor;stroke:none;vertical-align:-3px;flex-shrink:0}

.site-header{display:flex;align-items:center;justify-content:space-between;margin-bottom:1.5rem}
.site-name{font-size:1.5rem;font-weight:800;letter-spacing:-.03em;color:var(--fg)}
.site-name:hover{text-decoration:none}
.site-nav{display:flex;gap:1rem;font-size:.9rem}

.filters{display:flex;gap:.5rem;flex-wrap:wrap;margin-bottom:1.25rem}
.filter{padding:.25rem .75rem;border-radius:100px;border:1px solid var(--border);font-size:.85rem;color:var(--fg2)}
.filter.active{background:var(--accent);border-color:var(--accent);color:#fff}

.feed{display:flex;flex-direction:column;gap:1rem}
.feed-card{display:flex;gap:1rem;padding:1rem;background:var(--surface);border:1px solid var(--border);border-radius:10px}
.feed-card-body{min-width:0;flex:1}
.feed-card-title{font-size:1.1rem;font-weight:700;line-height:1.35;color:var(--fg)}
.feed-card-summary{color:var(--fg2);font-size:.95rem;margin-top:.35rem;display:-webkit-box;-webkit-line-clamp:3;-webkit-box-orient:vertical;overflow:hidden}
.feed-card-image{width:120px;height:90px;object-fit:cover;border-radius:6px;flex-shrink:0}
.feed-card-meta{display:flex;gap:1rem;align-items:center;margin-top:.6rem;font-size:.8rem;color:var(--fg3)}
.feed-card-meta span{display:flex;align-items:center;gap:.3rem}
.category{text-transform:uppercase;letter-spacing:.05em;font-weight:600;font-size:.7rem;color:var(--accent)}

.author-chip{display:inline-flex;align-items:center;gap:.4rem;color:var(--fg2);font-weight:500}
.avatar{width:22px;height:22px;border-radius:50%;background:var(--accent);color:#fff;display:inline-flex;align-items:center;justify-content:center;font-size:.65rem;font-weight:700;text-transform:uppercase;overflow:hidden;position:relative}
.avatar img{position:absolute;inset:0;width:100%;height:100%;object-fit:cover}

.feed-footer{text-align:center;margin:1.5rem 0;color:var(--fg3);font-size:.9rem}
.feed-error{color:var(--fg2)}
.button{display:inline-block;padding:.55rem 1.1rem;background:var(--accent);color:#fff;border-radius:6px;font-size:.9rem;font-weight:500}
.button:hover{background:var(--accent-hover);text-decoration:none}

.ad-slot{display:block;min-height:90px;margin:.5rem 0}

.placeholder{display:flex;align-items:center;justify-content:center;min-height:50vh;color:var(--fg3)}

.profile-header{display:flex;gap:1rem;align-items:center;margin-bottom:1.5rem}
.profile-pic{width:80px;height:80px;border-radius:50%;background:var(--accent);color:#fff;display:flex;align-items:center;justify-content:center;font-size:2rem;font-weight:700;text-transform:uppercase;overflow:hidden;position:relative;flex-shrink:0}
.profile-pic img{position:absolute;inset:0;width:100%;height:100%;object-fit:cover}
.profile-name{font-size:1.6rem;font-weight:700;letter-spacing:-.02em}
.profile-username{color:var(--fg3);font-size:.9rem}
.profile-bio{color:var(--fg2);margin:.5rem 0;white-space:pre-wrap;word-break:break-word}
.profile-meta{display:flex;gap:1.25rem;flex-wrap:wrap;font-size:.85rem;color:var(--fg3)}

.article-title{font-size:2rem;font-weight:800;line-height:1.2;letter-spacing:-.02em;margin:.5rem 0 1rem}
.article-summary{color:var(--fg2);font-size:1.1rem;margin-bottom:1rem}
.article-image{width:100%;max-height:360px;object-fit:cover;border-radius:8px;margin-bottom:1rem}
.article-content{font-size:1.05rem;line-height:1.75;color:var(--fg);margin:1.5rem 0}
.article-content h1,.article-content h2,.article-content h3,.article-content h4{font-weight:700;margin:1.5rem 0 .75rem;letter-spacing:-.01em}
.article-content p{margin:.75rem 0}
.article-content ul,.article-content ol{margin:.75rem 0;padding-left:1.5rem}
.article-content blockquote{border-left:3px solid var(--accent);padding:.25rem 0 .25rem 1rem;margin:.75rem 0;color:var(--fg2)}
.article-content pre{background:var(--surface);border:1px solid var(--border);border-radius:6px;padding:.75rem 1rem;overflow-x:auto;margin:.75rem 0;font-size:.85rem}
.article-content code{font-family:var(--mono);font-size:.88em}
.article-content table{border-collapse:collapse;width:100%;margin:.75rem 0;font-size:.9rem}
.article-content th,.article-content td{border:1px solid var(--border);padding:.4rem .75rem;text-align:left}
.article-content img{border-radius:6px}

.footer{text-align:center;margin-top:2rem;padding-top:.75rem;font-size:.8rem;color:var(--fg3);width:100%;max-width:720px;display:flex;justify-content:center;gap:1rem}

@media(prefers-color-scheme:dark){
:root{--bg:#0e0e10;--fg:#ececec;--fg2:#a8a8a8;--fg3:#6b6b6b;--accent:#ff6b35;--accent-hover:#ff8a5c;--surface:#17171a;--border:rgba(255,255,255,.08)}
}
"#;

/// Inline CSS for error pages.
pub const ERROR_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;display:flex;justify-content:center;align-items:center;min-height:100vh;background:#f7f7f5;color:#111;padding:1rem}
.error-page{text-align:center;max-width:400px}
.error-page h1{font-size:1.5rem;margin-bottom:.75rem}
.error-page p{color:#666;margin-bottom:1rem;line-height:1.5}
.error-page a{color:#d9480f}
@media(prefers-color-scheme:dark){
body{background:#0e0e10;color:#ececec}
.error-page p{color:#aaa}
.error-page a{color:#ff6b35}
}
"#;

/// Content-Security-Policy without third-party embeds.
///
/// Inline styles only. No scripts, no frames, only HTTPS images.
pub const CSP_HEADER: &str = "default-src 'none'; style-src 'unsafe-inline'; script-src 'none'; img-src https: data:; connect-src 'self'; form-action 'self'; frame-ancestors 'none'";

/// Content-Security-Policy for the current ad configuration.
///
/// With ads enabled the ad network's origin may load scripts and frames.
pub fn csp_header(ads: Option<&AdConfig>) -> String {
    let Some(origin) = ads.and_then(|a| url::Url::parse(&a.script_url).ok()).map(|u| {
        u.origin().ascii_serialization()
    }) else {
        return CSP_HEADER.to_string();
    };

    format!(
        "default-src 'none'; style-src 'unsafe-inline'; script-src {origin}; img-src https: data:; connect-src 'self' {origin}; frame-src {origin}; form-action 'self'; frame-ancestors 'none'"
    )
}

/// Characters escaped when building a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Path of a profile page.
pub fn profile_path(username: &str) -> String {
    format!("/u/{}", utf8_percent_encode(username, SEGMENT))
}

/// Path of an article page.
pub fn article_path(id: u64) -> String {
    format!("/article/{id}")
}

/// Render the full HTML page shell with `<head>`, OG tags, and body content.
pub fn page_shell(
    title: &str,
    description: &str,
    canonical_url: &str,
    og: OpenGraphData<'_>,
    body_content: Markup,
    site_name: &str,
) -> Markup {
    html! {
        (maud::DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                meta name="description" content=(description);
                link rel="canonical" href=(canonical_url);

                // Open Graph
                meta property="og:title" content=(og.title);
                meta property="og:description" content=(og.description);
                meta property="og:url" content=(canonical_url);
                meta property="og:site_name" content=(site_name);
                meta property="og:type" content=(og.og_type);
                @if let Some(image) = og.image {
                    meta property="og:image" content=(image);
                }

                // Twitter Card
                meta name="twitter:card" content=(og.twitter_card_type);
                meta name="twitter:title" content=(og.title);
                meta name="twitter:description" content=(og.description);
                @if let Some(image) = og.image {
                    meta name="twitter:image" content=(image);
                }

                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                main {
                    (site_header(site_name))
                    (body_content)
                }
                footer class="footer" {
                    a href="/download" { "Get the app" }
                    a href="/docs" { "Docs" }
                }
            }
        }
    }
}

/// Open Graph metadata for a page.
pub struct OpenGraphData<'a> {
    /// OG title.
    pub title: &'a str,
    /// OG description.
    pub description: &'a str,
    /// OG type (e.g., "profile", "article", "website").
    pub og_type: &'a str,
    /// OG image URL (must be HTTPS).
    pub image: Option<&'a str>,
    /// Twitter card type ("summary", "summary_large_image").
    pub twitter_card_type: &'a str,
}

fn site_header(site_name: &str) -> Markup {
    html! {
        header class="site-header" {
            a class="site-name" href="/" { (site_name) }
            nav class="site-nav" {
                a href="/" { "Feed" }
                a href="/download" { "App" }
            }
        }
    }
}

/// First letter of `name`, uppercased, for avatar fallbacks.
pub fn initial(name: &str) -> String {
    name.chars()
        .next()
        .unwrap_or('?')
        .to_uppercase()
        .to_string()
}

/// Small author avatar + name linking to the profile.
pub fn author_chip(author: &FeedAuthor) -> Markup {
    let name = author.name();
    html! {
        a class="author-chip" href=(profile_path(&author.username)) {
            span class="avatar" {
                (initial(name))
                @if let Some(url) = author.avatar_url.as_deref().filter(|u| is_safe_url(u)) {
                    img src=(url) alt="" loading="lazy";
                }
            }
            (name)
        }
    }
}

/// One feed entry.
pub fn feed_card(item: &FeedItem) -> Markup {
    let href = article_path(item.id);
    html! {
        article class="feed-card" {
            div class="feed-card-body" {
                @if let Some(category) = item.category.as_deref() {
                    div class="category" { (category) }
                }
                a class="feed-card-title" href=(href) { (item.title) }
                @if let Some(summary) = item.summary.as_deref().filter(|s| !s.is_empty()) {
                    p class="feed-card-summary" { (truncate(summary, 280)) }
                }
                div class="feed-card-meta" {
                    (author_chip(&item.author))
                    (stats(item.comment_count, item.like_count))
                    time datetime=(item.published_at.to_rfc3339()) { (format_date(item.published_at)) }
                }
            }
            @if let Some(url) = item.image_url.as_deref().filter(|u| is_safe_url(u)) {
                a href=(href) {
                    img class="feed-card-image" src=(url) alt="" loading="lazy";
                }
            }
        }
    }
}

// -- Phosphor icon SVGs (fill variants) --

/// Heart icon (Phosphor fill)
const ICON_HEART: &str = r#"<svg class="icon" viewBox="0 0 256 256"><path d="M240,94c0,70-103.79,126.66-108.21,129a8,8,0,0,1-7.58,0C119.79,220.66,16,164,16,94A62.07,62.07,0,0,1,78,32c20.65,0,38.73,8.88,50,23.89C139.27,40.88,157.35,32,178,32A62.07,62.07,0,0,1,240,94Z"/></svg>"#;

/// Chat bubble icon (Phosphor chat-centered, fill)
const ICON_CHAT: &str = r#"<svg class="icon" viewBox="0 0 256 256"><path d="M232,56V184a16,16,0,0,1-16,16H155.57l-13.68,23.94a16,16,0,0,1-27.78,0L100.43,200H40a16,16,0,0,1-16-16V56A16,16,0,0,1,40,40H216A16,16,0,0,1,232,56Z"/></svg>"#;

/// Comment and like counts.
pub fn stats(comments: u64, likes: u64) -> Markup {
    html! {
        span title="Comments" { (PreEscaped(ICON_CHAT)) (format_count(comments)) }
        span title="Likes" { (PreEscaped(ICON_HEART)) (format_count(likes)) }
    }
}

/// Format a timestamp as "Mon DD, YYYY".
pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%b %d, %Y").to_string()
}

/// Check if a URL is safe to use in `src` or `href` attributes.
pub fn is_safe_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// Format a large number with K/M suffixes for display.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Truncate a string to a maximum length, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) && end > 0 {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
