//! Article page renderer.
//!
//! Renders the title, author, and full markdown body. Markdown is converted
//! to HTML using pulldown-cmark.

use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{Event, Options, Parser, html as md_html};

use super::ads::AdEmbeds;
use super::components::{
    OpenGraphData, article_path, author_chip, format_date, is_safe_url, page_shell, stats,
    truncate,
};
use crate::client::Article;

/// Render an article page.
pub fn render(
    article: &Article,
    base_url: &str,
    site_name: &str,
    ads: &mut AdEmbeds<'_>,
) -> Markup {
    let title = format!("{} | {site_name}", article.title);
    let description = match article.summary.as_deref().filter(|s| !s.is_empty()) {
        Some(summary) => truncate(summary, 200),
        None => truncate(&article.body, 200),
    };
    let canonical = format!("{base_url}{}", article_path(article.id));
    let image = article.image_url.as_deref().filter(|u| is_safe_url(u));

    let og = OpenGraphData {
        title: &article.title,
        description: &description,
        og_type: "article",
        image,
        twitter_card_type: if image.is_some() {
            "summary_large_image"
        } else {
            "summary"
        },
    };

    let rendered_markdown = render_markdown(&article.body);

    let body = html! {
        article {
            @if let Some(category) = article.category.as_deref() {
                div class="category" { (category) }
            }
            h1 class="article-title" { (article.title) }
            @if let Some(summary) = article.summary.as_deref().filter(|s| !s.is_empty()) {
                p class="article-summary" { (summary) }
            }
            div class="feed-card-meta" {
                (author_chip(&article.author))
                time datetime=(article.published_at.to_rfc3339()) { (format_date(article.published_at)) }
                (stats(article.comment_count, article.like_count))
            }
            @if let Some(url) = image {
                img class="article-image" src=(url) alt=(article.title) loading="lazy";
            }
            div class="article-content" {
                (PreEscaped(&rendered_markdown))
            }
            (ads.slot("article-end"))
        }
    };

    page_shell(&title, &description, &canonical, og, body, site_name)
}

/// Render markdown text to HTML.
///
/// Uses pulldown-cmark with common extensions (tables, footnotes,
/// strikethrough, task lists). Raw HTML in the source is emitted as
/// escaped text.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut html_output = String::with_capacity(markdown.len() * 2);
    md_html::push_html(&mut html_output, parser);
    html_output
}
