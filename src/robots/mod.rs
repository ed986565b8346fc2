//! Robots.txt handling module
//!
//! This module fetches a site's robots.txt once per crawl and answers whether
//! a path may be fetched. A missing or unreadable robots file never halts the
//! crawl: it degrades to a policy that allows everything.

mod parser;

pub use parser::RobotsRules;

use crate::crawler::{PageFetcher, TransportError};
use crate::url::NormalizedUrl;
use std::time::Duration;
use thiserror::Error;

/// Why a site's robots.txt could not be used
///
/// Logged and otherwise ignored; never turned into a finding.
#[derive(Debug, Error)]
pub enum RobotsUnavailable {
    #[error("could not build robots.txt URL: {0}")]
    InvalidUrl(String),

    #[error("robots.txt returned HTTP {0}")]
    Status(u16),

    #[error("robots.txt fetch failed: {0}")]
    Transport(#[from] TransportError),
}

/// Access rules for one site
#[derive(Debug, Clone, Default)]
pub struct RobotsPolicy {
    rules: RobotsRules,
}

impl RobotsPolicy {
    /// Fetches `/robots.txt` for the site `origin` belongs to
    ///
    /// Any failure, including a non-2xx answer, yields [`RobotsPolicy::allow_all`].
    pub async fn load(fetcher: &PageFetcher, origin: &NormalizedUrl) -> Self {
        match Self::try_load(fetcher, origin).await {
            Ok(policy) => policy,
            Err(RobotsUnavailable::Status(404)) => {
                tracing::debug!("No robots.txt for {}, allowing all", origin);
                Self::allow_all()
            }
            Err(e) => {
                tracing::warn!("Robots unavailable for {} ({}), allowing all", origin, e);
                Self::allow_all()
            }
        }
    }

    async fn try_load(
        fetcher: &PageFetcher,
        origin: &NormalizedUrl,
    ) -> Result<Self, RobotsUnavailable> {
        let robots_url = origin
            .site_root()
            .join("robots.txt")
            .map_err(|e| RobotsUnavailable::InvalidUrl(e.to_string()))
            .and_then(|url| {
                NormalizedUrl::parse(url.as_str())
                    .map_err(|e| RobotsUnavailable::InvalidUrl(e.to_string()))
            })?;

        tracing::debug!("Fetching {}", robots_url);
        let response = fetcher.fetch_document(&robots_url).await?;
        if !response.is_success() {
            return Err(RobotsUnavailable::Status(response.status));
        }

        Ok(Self::from_content(&response.text()))
    }

    /// Builds a policy from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            rules: RobotsRules::from_content(content),
        }
    }

    /// The permissive default policy
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks if `path` may be fetched by `agent`
    pub fn is_allowed(&self, path: &str, agent: &str) -> bool {
        self.rules.is_allowed(path, agent)
    }

    /// Checks a full URL (its path and query) for `agent`
    ///
    /// Both the canonical and the written path must be allowed: a rule for
    /// `/private/` has to catch a link written as `/private/` even though its
    /// canonical form is `/private`.
    pub fn allows_url(&self, url: &NormalizedUrl, agent: &str) -> bool {
        self.is_allowed(&url.path_and_query(), agent)
            && self.is_allowed(&url.written_path_and_query(), agent)
    }

    /// Crawl-delay published for `agent`, falling back to the `*` group
    pub fn crawl_delay(&self, agent: &str) -> Option<Duration> {
        self.rules.crawl_delay(agent)
    }
}
