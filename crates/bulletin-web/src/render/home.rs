//! Home feed renderer.

use maud::{Markup, html};

use super::ads::AdEmbeds;
use super::components::{OpenGraphData, page_shell};
use super::feed::{FeedLinks, FeedView, feed_list};

/// Categories offered as filter chips.
pub const CATEGORIES: &[&str] = &["news", "tech", "sports", "culture", "science"];

/// Render the home feed.
pub fn render(
    view: &FeedView,
    links: &FeedLinks<'_>,
    base_url: &str,
    site_name: &str,
    ads: &mut AdEmbeds<'_>,
) -> Markup {
    let query = links.query;
    let title = match (&query.search, &query.category) {
        (Some(q), _) => format!("Search: {q} | {site_name}"),
        (None, Some(category)) => format!("{category} | {site_name}"),
        (None, None) => format!("{site_name}: today's stories"),
    };
    let description = format!("The latest stories on {site_name}.");
    let canonical = format!("{base_url}/");

    let og = OpenGraphData {
        title: &title,
        description: &description,
        og_type: "website",
        image: None,
        twitter_card_type: "summary",
    };

    let body = html! {
        nav class="filters" {
            a class=(chip_class(query.category.is_none())) href="/" { "All" }
            @for category in CATEGORIES {
                a class=(chip_class(query.category.as_deref() == Some(*category)))
                    href=(format!("/?category={category}")) { (category) }
            }
        }
        (ads.slot("home-top"))
        (feed_list(view, links, ads))
    };

    page_shell(&title, &description, &canonical, og, body, site_name)
}

fn chip_class(active: bool) -> &'static str {
    if active { "filter active" } else { "filter" }
}
