//! Shared state of one crawl run
//!
//! Everything workers share lives in a [`CrawlSession`] that is passed to
//! them explicitly. Separate sessions never see each other's state.

use crate::crawler::{EnqueueOutcome, Frontier, ProbeCache, Throttle};
use crate::output::{Aggregator, CrawlReport, ReportMeta};
use crate::robots::RobotsPolicy;
use crate::url::NormalizedUrl;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Which URLs a run may crawl
#[derive(Debug, Clone)]
pub struct CrawlScope {
    origin: NormalizedUrl,
    robots: RobotsPolicy,
    agent_token: String,
}

impl CrawlScope {
    pub fn new(origin: NormalizedUrl, robots: RobotsPolicy, agent_token: impl Into<String>) -> Self {
        Self {
            origin,
            robots,
            agent_token: agent_token.into(),
        }
    }

    pub fn origin(&self) -> &NormalizedUrl {
        &self.origin
    }

    pub fn robots(&self) -> &RobotsPolicy {
        &self.robots
    }

    pub fn agent_token(&self) -> &str {
        &self.agent_token
    }

    /// Same host and port as the seed
    pub fn is_in_scope(&self, url: &NormalizedUrl) -> bool {
        self.origin.is_same_host(url)
    }

    /// Robots verdict for `url` under the run's product token
    pub fn is_allowed(&self, url: &NormalizedUrl) -> bool {
        self.robots.allows_url(url, &self.agent_token)
    }
}

/// Limits applied to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    pub max_pages: usize,
    pub max_depth: u32,
}

/// The single object holding a run's shared mutable state
#[derive(Debug)]
pub struct CrawlSession {
    frontier: Frontier,
    aggregator: Aggregator,
    scope: CrawlScope,
    throttle: Throttle,
    probes: ProbeCache,
    user_agent: String,
    started_at: DateTime<Utc>,
    started: Instant,
    aborted: AtomicBool,
}

impl CrawlSession {
    pub fn new(
        scope: CrawlScope,
        limits: CrawlLimits,
        fetch_interval: Duration,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            frontier: Frontier::new(limits.max_pages, limits.max_depth),
            aggregator: Aggregator::new(),
            scope,
            throttle: Throttle::new(fetch_interval),
            probes: ProbeCache::new(),
            user_agent: user_agent.into(),
            started_at: Utc::now(),
            started: Instant::now(),
            aborted: AtomicBool::new(false),
        }
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn scope(&self) -> &CrawlScope {
        &self.scope
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    pub fn probes(&self) -> &ProbeCache {
        &self.probes
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Offers a URL to the frontier after the scope and robots checks
    ///
    /// Out-of-scope URLs are not counted as discovered; robots-disallowed
    /// ones are, since they belong to the site.
    pub fn admit(&self, url: NormalizedUrl, depth: u32) -> EnqueueOutcome {
        let outcome = if !self.scope.is_in_scope(&url) {
            EnqueueOutcome::OutOfScope
        } else if !self.scope.is_allowed(&url) {
            self.frontier.mark_discovered(&url);
            EnqueueOutcome::DisallowedByRobots
        } else {
            self.frontier.enqueue(url.clone(), depth)
        };

        tracing::debug!("Admit {} at depth {}: {:?}", url, depth, outcome);
        outcome
    }

    /// Raises the stop signal: no further dequeues are serviced
    pub fn abort(&self) {
        if !self.aborted.swap(true, Ordering::SeqCst) {
            tracing::warn!("Crawl aborted; finishing in-flight pages");
        }
        self.frontier.stop();
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Freezes the aggregator and returns the report
    pub fn finalize(&self) -> CrawlReport {
        self.aggregator.finalize(ReportMeta {
            seed: self.scope.origin.clone(),
            user_agent: self.user_agent.clone(),
            started_at: self.started_at,
            elapsed: self.elapsed(),
            pages_discovered: self.frontier.discovered_count(),
            aborted: self.is_aborted(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> NormalizedUrl {
        NormalizedUrl::parse(s).unwrap()
    }

    fn session(robots: &str) -> CrawlSession {
        let scope = CrawlScope::new(
            url("http://127.0.0.1:8080/"),
            RobotsPolicy::from_content(robots),
            "SiteInspector",
        );
        CrawlSession::new(
            scope,
            CrawlLimits {
                max_pages: 10,
                max_depth: 2,
            },
            Duration::ZERO,
            "SiteInspector/0.1.0",
        )
    }

    #[test]
    fn test_scope_requires_same_host_and_port() {
        let session = session("");
        let scope = session.scope();
        assert!(scope.is_in_scope(&url("http://127.0.0.1:8080/page")));
        assert!(!scope.is_in_scope(&url("http://127.0.0.1:9090/page")));
        assert!(!scope.is_in_scope(&url("http://example.com/page")));
    }

    #[test]
    fn test_admit_out_of_scope() {
        let session = session("");
        let outcome = session.admit(url("https://other.example/"), 1);
        assert_eq!(outcome, EnqueueOutcome::OutOfScope);
        assert_eq!(session.frontier().discovered_count(), 0);
    }

    #[test]
    fn test_admit_disallowed_by_robots() {
        let session = session("User-agent: *\nDisallow: /private/");
        let outcome = session.admit(url("http://127.0.0.1:8080/private/page"), 1);
        assert_eq!(outcome, EnqueueOutcome::DisallowedByRobots);
        assert_eq!(session.frontier().discovered_count(), 1);
        assert_eq!(session.frontier().accepted_count(), 0);
    }

    #[test]
    fn test_admit_rejects_disallowed_directory_link() {
        let session = session("User-agent: *\nDisallow: /private/");
        let outcome = session.admit(url("http://127.0.0.1:8080/private/"), 1);
        assert_eq!(outcome, EnqueueOutcome::DisallowedByRobots);
        assert_eq!(session.frontier().accepted_count(), 0);
    }

    #[test]
    fn test_admit_accepts_in_scope() {
        let session = session("");
        assert!(session.admit(url("http://127.0.0.1:8080/"), 0).is_accepted());
        assert_eq!(
            session.admit(url("http://127.0.0.1:8080/"), 1),
            EnqueueOutcome::AlreadyVisited
        );
    }

    #[test]
    fn test_abort_marks_report() {
        let session = session("");
        session.admit(url("http://127.0.0.1:8080/"), 0);
        session.abort();
        assert!(session.frontier().is_stopped());

        let report = session.finalize();
        assert!(report.aborted);
        assert_eq!(report.pages_visited, 0);
        assert_eq!(report.pages_discovered, 1);
    }
}
