//! Profile page renderer.
//!
//! Renders a user's header (avatar, name, bio, counts) followed by their
//! articles.

use maud::{Markup, html};

use super::ads::AdEmbeds;
use super::components::{
    OpenGraphData, format_count, format_date, initial, is_safe_url, page_shell, profile_path,
    truncate,
};
use super::feed::{FeedLinks, FeedView, feed_list};
use crate::client::Profile;

/// Render a profile page.
pub fn render(
    profile: &Profile,
    view: &FeedView,
    links: &FeedLinks<'_>,
    base_url: &str,
    site_name: &str,
    ads: &mut AdEmbeds<'_>,
) -> Markup {
    let name = profile.name();
    let bio = profile.bio.as_deref().unwrap_or("");
    let title = format!("{name} (@{}) | {site_name}", profile.username);
    let description = if bio.is_empty() {
        format!("Stories by {name} on {site_name}")
    } else {
        truncate(bio, 200)
    };
    let canonical = format!("{base_url}{}", profile_path(&profile.username));
    let avatar = profile.avatar_url.as_deref().filter(|u| is_safe_url(u));

    let og = OpenGraphData {
        title: &title,
        description: &description,
        og_type: "profile",
        image: avatar,
        twitter_card_type: "summary",
    };

    let body = html! {
        div class="profile-header" {
            div class="profile-pic" {
                (initial(name))
                @if let Some(url) = avatar {
                    img src=(url) alt=(name) loading="lazy";
                }
            }
            div {
                div class="profile-name" { (name) }
                div class="profile-username" { "@" (profile.username) }
                @if !bio.is_empty() {
                    p class="profile-bio" { (bio) }
                }
                div class="profile-meta" {
                    span { (format_count(profile.follower_count)) " followers" }
                    span { (format_count(profile.article_count)) " stories" }
                    @if let Some(joined) = profile.joined_at {
                        span { "Joined " (format_date(joined)) }
                    }
                    @if let Some(website) = profile.website.as_deref().filter(|u| is_safe_url(u)) {
                        a href=(website) rel="nofollow noopener" target="_blank" {
                            (truncate(website.strip_prefix("https://").or_else(|| website.strip_prefix("http://")).unwrap_or(website), 40))
                        }
                    }
                }
            }
        }
        (feed_list(view, links, ads))
    };

    page_shell(&title, &description, &canonical, og, body, site_name)
}
