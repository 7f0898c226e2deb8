//! Path resolution for the fallback document.
//!
//! The hosting layer serves one document for every path it does not know,
//! so the page to render is recovered from the observed path alone.
//!
//! # Patterns
//!
//! Evaluated top to bottom, first match wins:
//!
//! | Pattern | Kind | Params |
//! |---------|------|--------|
//! | `^/article/([0-9]+)` | [`RouteKind::Article`] | `id` |
//! | `^/u/([^/]+)` | [`RouteKind::Profile`] | `username` (percent-decoded) |
//! | anything else | [`RouteKind::Home`] | none |

use std::collections::BTreeMap;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

/// `\d` in the regex crate matches any Unicode digit; ids are ASCII only.
static ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/article/([0-9]+)").expect("valid article pattern"));

static PROFILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/u/([^/]+)").expect("valid profile pattern"));

/// Parameter name for the article id.
pub const PARAM_ID: &str = "id";

/// Parameter name for the profile username.
pub const PARAM_USERNAME: &str = "username";

/// The page variant selected for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// A single article page.
    Article,
    /// A public profile page.
    Profile,
    /// The home feed (also the fallback for unknown paths).
    Home,
}

impl RouteKind {
    /// Short lowercase label, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Profile => "profile",
            Self::Home => "home",
        }
    }
}

/// The outcome of resolving one path. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    raw_path: String,
    kind: RouteKind,
    params: BTreeMap<String, String>,
}

impl RouteMatch {
    /// The path this match was computed from.
    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    /// All captured parameters.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Look up one captured parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    fn home(raw_path: &str) -> Self {
        Self {
            raw_path: raw_path.to_string(),
            kind: RouteKind::Home,
            params: BTreeMap::new(),
        }
    }

    fn with_param(raw_path: &str, kind: RouteKind, name: &str, value: String) -> Self {
        Self {
            raw_path: raw_path.to_string(),
            kind,
            params: BTreeMap::from([(name.to_string(), value)]),
        }
    }
}

/// Resolve a path into exactly one [`RouteMatch`].
///
/// Never fails: anything that is not an article or profile path is `Home`.
pub fn resolve(path: &str) -> RouteMatch {
    if let Some(caps) = ARTICLE_RE.captures(path) {
        return RouteMatch::with_param(path, RouteKind::Article, PARAM_ID, caps[1].to_string());
    }

    if let Some(caps) = PROFILE_RE.captures(path) {
        let username = decode_segment(&caps[1]);
        return RouteMatch::with_param(path, RouteKind::Profile, PARAM_USERNAME, username);
    }

    RouteMatch::home(path)
}

/// Percent-decode a path segment, returning the raw segment when the
/// encoding is malformed or the bytes are not UTF-8.
pub fn decode_segment(raw: &str) -> String {
    if !is_well_formed(raw) {
        return raw.to_string();
    }

    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Every `%` must introduce exactly two hex digits.
fn is_well_formed(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
