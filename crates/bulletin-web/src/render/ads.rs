//! Ad network embeds.
//!
//! One [`AdEmbeds`] lives for one page render. The loader script and each
//! slot container are emitted at most once within it; the guards are
//! released when the render finishes.

use bulletin_core::{EmbedGuard, EmbedRegistry};
use maud::{Markup, html};

use crate::config::AdConfig;

const LOADER_ID: &str = "loader";

/// Ad slots for a single page.
pub struct AdEmbeds<'a> {
    config: Option<&'a AdConfig>,
    registry: EmbedRegistry,
    guards: Vec<EmbedGuard>,
}

impl<'a> AdEmbeds<'a> {
    /// `None` disables every slot on the page.
    pub fn new(config: Option<&'a AdConfig>) -> Self {
        Self {
            config,
            registry: EmbedRegistry::new(),
            guards: Vec::new(),
        }
    }

    /// The loader script, the first time it is requested.
    pub fn loader(&mut self) -> Markup {
        let Some(config) = self.config else {
            return html! {};
        };
        let Some(guard) = self.registry.acquire(LOADER_ID) else {
            return html! {};
        };
        self.guards.push(guard);

        html! {
            script async src=(config.script_url) data-ad-client=(config.client_id) {}
        }
    }

    /// The container for `slot`, the first time it is requested.
    /// Emits the loader ahead of the first slot.
    pub fn slot(&mut self, slot: &str) -> Markup {
        let Some(config) = self.config else {
            return html! {};
        };
        let Some(guard) = self.registry.acquire(&format!("slot:{slot}")) else {
            tracing::debug!(slot, "ad slot already attached");
            return html! {};
        };
        self.guards.push(guard);

        let loader = self.loader();
        html! {
            (loader)
            ins class="ad-slot" data-ad-client=(config.client_id) data-ad-slot=(slot) {}
        }
    }

    /// Number of embeds attached so far.
    pub fn attached(&self) -> usize {
        self.registry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AdConfig {
        AdConfig {
            client_id: "pub-123".to_string(),
            script_url: "https://ads.example.net/loader.js".to_string(),
        }
    }

    #[test]
    fn disabled_renders_nothing() {
        let mut ads = AdEmbeds::new(None);
        assert!(ads.loader().into_string().is_empty());
        assert!(ads.slot("top").into_string().is_empty());
        assert_eq!(ads.attached(), 0);
    }

    #[test]
    fn slot_attached_twice_renders_once() {
        let config = config();
        let mut ads = AdEmbeds::new(Some(&config));

        let first = ads.slot("top").into_string();
        let second = ads.slot("top").into_string();

        assert!(first.contains("data-ad-slot=\"top\""));
        assert!(first.contains("<script async src=\"https://ads.example.net/loader.js\""));
        assert!(second.is_empty());
        assert_eq!(ads.attached(), 2);
    }

    #[test]
    fn loader_emitted_only_before_first_slot() {
        let config = config();
        let mut ads = AdEmbeds::new(Some(&config));

        let a = ads.slot("feed-0").into_string();
        let b = ads.slot("feed-1").into_string();

        assert!(a.contains("<script"));
        assert!(!b.contains("<script"));
        assert!(b.contains("data-ad-slot=\"feed-1\""));
        assert_eq!(ads.attached(), 3);
    }

    #[test]
    fn new_page_scope_attaches_again() {
        let config = config();
        {
            let mut ads = AdEmbeds::new(Some(&config));
            assert!(!ads.slot("top").into_string().is_empty());
        }
        let mut ads = AdEmbeds::new(Some(&config));
        assert!(!ads.slot("top").into_string().is_empty());
    }
}
