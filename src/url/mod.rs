//! URL handling module for Site-Inspector
//!
//! This module provides the canonical URL type used as the crawl's identity
//! key, normalization, link resolution and same-origin checks.

mod domain;
mod normalize;

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

pub use domain::{extract_domain, is_same_host};
pub use normalize::{normalize_url, resolve_link};

/// Canonical form of a URL
///
/// Two addresses that differ only in host case, fragment, dot segments,
/// duplicate slashes or a trailing slash compare equal. Values can only be
/// produced by [`normalize_url`] or [`resolve_link`] and are immutable.
///
/// The address as it was written (minus its fragment) travels along with the
/// canonical key. Equality, hashing and ordering use the key only; requests,
/// relative-link resolution and robots checks use the written form too, since
/// `/docs/` and `/docs` are different resources to a server.
#[derive(Debug, Clone)]
pub struct NormalizedUrl {
    key: Url,
    written: Url,
}

impl NormalizedUrl {
    pub(crate) fn from_parts(key: Url, written: Url) -> Self {
        Self { key, written }
    }

    /// Parses and normalizes a URL string
    pub fn parse(url_str: &str) -> crate::UrlResult<Self> {
        normalize_url(url_str)
    }

    pub fn as_str(&self) -> &str {
        self.key.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.key
    }

    /// The address to request, as it appeared in the page
    pub fn request_url(&self) -> &Url {
        &self.written
    }

    /// Lowercase host of this URL
    pub fn domain(&self) -> Option<String> {
        extract_domain(&self.key)
    }

    /// Path plus query, the form robots.txt rules are matched against
    pub fn path_and_query(&self) -> String {
        path_and_query(&self.key)
    }

    /// Path plus query of the written form
    pub fn written_path_and_query(&self) -> String {
        path_and_query(&self.written)
    }

    /// Root of the site this URL belongs to (`scheme://host[:port]/`)
    pub fn site_root(&self) -> Url {
        let mut root = self.key.clone();
        root.set_path("/");
        root.set_query(None);
        root
    }

    pub fn is_same_host(&self, other: &NormalizedUrl) -> bool {
        is_same_host(&self.key, &other.key)
    }
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

impl PartialEq for NormalizedUrl {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for NormalizedUrl {}

impl Hash for NormalizedUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for NormalizedUrl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NormalizedUrl {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key.as_str())
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for NormalizedUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
