//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and existence probes
//! - HTML parsing and link extraction
//! - The frontier and request pacing
//! - Page analysis and the worker pool

mod analyzer;
mod dispatcher;
#[cfg(test)]
pub(crate) mod fake;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;

pub use analyzer::{Analysis, PageAnalyzer, PageResult};
pub use dispatcher::{Dispatcher, StopSignal, WorkerSettings};
pub use fetcher::{
    build_http_client, FetchedPage, Method, PageFetcher, ProbeCache, ProbeOutcome, RawResponse,
    ReqwestTransport, Transport, TransportError, TransportErrorKind,
};
pub use frontier::{Claim, EnqueueOutcome, Frontier, FrontierEntry};
pub use parser::{parse_html, HtmlParser, ParseError, ParsedPage, ScraperParser};
pub use scheduler::{effective_delay, Throttle};

use crate::config::{validate, validate_seed_url, Config, UserAgentConfig};
use crate::output::CrawlReport;
use crate::robots::RobotsPolicy;
use crate::spelling::{load_spell_checker, SpellChecker, Tokenizer};
use crate::state::{CrawlLimits, CrawlScope, CrawlSession};
use crate::InspectorError;
use std::sync::Arc;

/// Entry point for running crawls with one configuration
///
/// The transport, HTML parser and spell checker default to the built-in
/// implementations and can each be replaced.
pub struct Inspector {
    config: Config,
    transport: Arc<dyn Transport>,
    parser: Arc<dyn HtmlParser>,
    spell_checker: Arc<dyn SpellChecker>,
}

impl Inspector {
    /// Validates `config` and builds the default collaborators
    ///
    /// # Returns
    ///
    /// * `Ok(Inspector)` - Ready to crawl
    /// * `Err(InspectorError)` - Invalid configuration, unreadable dictionary
    ///   or HTTP client construction failure
    pub fn new(config: Config) -> Result<Self, InspectorError> {
        validate(&config)?;
        let transport = Arc::new(ReqwestTransport::new(&config.user_agent)?);
        let spell_checker = load_spell_checker(&config.spelling)?;

        Ok(Self {
            config,
            transport,
            parser: Arc::new(ScraperParser),
            spell_checker,
        })
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn HtmlParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_spell_checker(mut self, spell_checker: Arc<dyn SpellChecker>) -> Self {
        self.spell_checker = spell_checker;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sets up a crawl of `seed` without starting it
    ///
    /// Loads robots.txt, builds the session and admits the seed. A seed that
    /// robots.txt disallows leaves the frontier empty, so the crawl produces
    /// an empty report.
    pub async fn prepare(&self, seed: &str) -> Result<Dispatcher, InspectorError> {
        let seed = validate_seed_url(seed)?;
        let crawler = &self.config.crawler;
        let agent = &self.config.user_agent;

        let bootstrap = PageFetcher::new(
            self.transport.clone(),
            crawler.request_timeout(),
            crawler.probe_timeout(),
            ProbeCache::new(),
        );
        let robots = RobotsPolicy::load(&bootstrap, &seed).await;

        let interval = effective_delay(
            crawler.politeness_delay(),
            robots.crawl_delay(agent.robots_token()),
        );
        if !interval.is_zero() {
            tracing::info!("Spacing page fetches by {:?}", interval);
        }

        let scope = CrawlScope::new(seed.clone(), robots, agent.robots_token());
        let session = Arc::new(CrawlSession::new(
            scope,
            CrawlLimits {
                max_pages: crawler.max_pages,
                max_depth: crawler.max_depth,
            },
            interval,
            agent.header_value(),
        ));

        match session.admit(seed.clone(), 0) {
            EnqueueOutcome::Accepted => {}
            EnqueueOutcome::DisallowedByRobots => {
                tracing::warn!("Seed {} is disallowed by robots.txt; nothing to crawl", seed)
            }
            other => tracing::warn!("Seed {} was not queued: {:?}", seed, other),
        }

        let analyzer = PageAnalyzer::new(
            self.spell_checker.clone(),
            Tokenizer::from_config(&self.config.spelling),
            crawler.probe_concurrency,
        );

        Ok(Dispatcher::new(
            session,
            self.transport.clone(),
            self.parser.clone(),
            Arc::new(analyzer),
            WorkerSettings {
                worker_count: crawler.worker_count,
                page_timeout: crawler.request_timeout(),
                probe_timeout: crawler.probe_timeout(),
            },
        ))
    }

    /// Crawls `seed` to completion
    pub async fn run(&self, seed: &str) -> Result<CrawlReport, InspectorError> {
        Ok(self.prepare(seed).await?.run().await)
    }
}

/// Runs a complete crawl with default settings for everything not given
///
/// # Arguments
///
/// * `seed` - The URL to start from; only its host is crawled
/// * `max_pages` - Upper bound on pages visited
/// * `max_depth` - Upper bound on link hops from the seed
/// * `worker_count` - Number of concurrent workers
/// * `user_agent` - `User-Agent` header; its product name is the robots token
///
/// # Example
///
/// ```no_run
/// use site_inspector::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl("https://example.com/", 50, 3, 5, "SiteInspector/0.1").await?;
/// println!("{} pages, {} findings", report.pages_visited, report.findings.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    seed: &str,
    max_pages: usize,
    max_depth: u32,
    worker_count: usize,
    user_agent: &str,
) -> Result<CrawlReport, InspectorError> {
    let mut config = Config::default();
    config.crawler.max_pages = max_pages;
    config.crawler.max_depth = max_depth;
    config.crawler.worker_count = worker_count;
    config.user_agent = UserAgentConfig::from_header(user_agent);

    Inspector::new(config)?.run(seed).await
}
