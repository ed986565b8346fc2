//! Crawl dispatcher - the worker pool
//!
//! This module runs a fixed number of workers over one [`CrawlSession`]:
//! - Each worker dequeues an entry, fetches the page and analyzes it
//! - Discovered links are offered back to the frontier before the worker
//!   releases its claim, so exhaustion is never declared early
//! - Every dequeued page is recorded with the aggregator exactly once

use crate::crawler::analyzer::{PageAnalyzer, PageResult};
use crate::crawler::fetcher::{PageFetcher, Transport};
use crate::crawler::frontier::FrontierEntry;
use crate::crawler::parser::HtmlParser;
use crate::output::{CrawlReport, Finding};
use crate::state::{CrawlSession, FailureReason, PageStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Progress is logged every this many recorded pages
const PROGRESS_INTERVAL: usize = 10;

/// Per-run worker settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    pub worker_count: usize,
    pub page_timeout: Duration,
    pub probe_timeout: Duration,
}

/// Handle used to stop a running crawl from outside
///
/// Once raised, no new dequeues are serviced. Pages already being processed
/// finish and are still recorded.
#[derive(Debug, Clone)]
pub struct StopSignal {
    session: Arc<CrawlSession>,
}

impl StopSignal {
    pub fn stop(&self) {
        self.session.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.session.is_aborted()
    }
}

/// Owns the worker pool for one crawl
pub struct Dispatcher {
    session: Arc<CrawlSession>,
    transport: Arc<dyn Transport>,
    parser: Arc<dyn HtmlParser>,
    analyzer: Arc<PageAnalyzer>,
    settings: WorkerSettings,
}

impl Dispatcher {
    pub fn new(
        session: Arc<CrawlSession>,
        transport: Arc<dyn Transport>,
        parser: Arc<dyn HtmlParser>,
        analyzer: Arc<PageAnalyzer>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            session,
            transport,
            parser,
            analyzer,
            settings,
        }
    }

    pub fn session(&self) -> &CrawlSession {
        &self.session
    }

    pub fn stop_signal(&self) -> StopSignal {
        StopSignal {
            session: self.session.clone(),
        }
    }

    /// Runs the workers until the frontier is exhausted or stopped
    ///
    /// Always produces a report; per-page failures are findings.
    pub async fn run(self) -> CrawlReport {
        let worker_count = self.settings.worker_count.max(1);
        tracing::info!(
            "Starting crawl of {} with {} workers",
            self.session.scope().origin(),
            worker_count
        );

        let mut workers = JoinSet::new();
        for id in 0..worker_count {
            let worker = Worker {
                id,
                session: self.session.clone(),
                fetcher: PageFetcher::new(
                    self.transport.clone(),
                    self.settings.page_timeout,
                    self.settings.probe_timeout,
                    self.session.probes().clone(),
                ),
                parser: self.parser.clone(),
                analyzer: self.analyzer.clone(),
            };
            workers.spawn(worker.run());
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(pages) => tracing::debug!("Worker finished after {} pages", pages),
                Err(e) => tracing::error!("Worker task failed: {}", e),
            }
        }

        let report = self.session.finalize();
        tracing::info!(
            "Crawl completed: {} pages visited, {} findings in {:?}{}",
            report.pages_visited,
            report.findings.len(),
            report.elapsed,
            if report.aborted { " (aborted)" } else { "" }
        );
        report
    }
}

struct Worker {
    id: usize,
    session: Arc<CrawlSession>,
    fetcher: PageFetcher,
    parser: Arc<dyn HtmlParser>,
    analyzer: Arc<PageAnalyzer>,
}

impl Worker {
    async fn run(self) -> usize {
        let mut processed = 0;

        while let Some(claim) = self.session.frontier().dequeue().await {
            let entry = claim.entry().clone();
            tracing::debug!("Worker {} processing {} (depth {})", self.id, entry.url, entry.depth);

            let (status, findings) = self.process(&entry).await;
            let recorded = self.session.aggregator().record_page(&entry, status, findings);

            // Only now may this worker count as idle
            drop(claim);
            processed += 1;

            if let Some(recorded) = recorded.filter(|n| n % PROGRESS_INTERVAL == 0) {
                let elapsed = self.session.elapsed();
                tracing::info!(
                    "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                    recorded,
                    self.session.frontier().pending_count(),
                    recorded as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
                );
            }
        }

        processed
    }

    /// Fetches, parses and analyzes one page, admitting its links
    async fn process(&self, entry: &FrontierEntry) -> (PageStatus, Vec<Finding>) {
        self.session.throttle().acquire().await;
        let fetched = self.fetcher.fetch(&entry.url, self.session.scope()).await;

        if let PageStatus::Redirected(target) = &fetched.status {
            tracing::debug!("Page {} redirects to {}; not followed", entry.url, target);
            return (fetched.status, Vec::new());
        }

        if let Some(reason) = fetched.status.failure_reason() {
            tracing::debug!("Page {} failed: {}", entry.url, reason);
            return (fetched.status, vec![page_error(entry, reason)]);
        }

        if !fetched.is_html() {
            let content_type = fetched.content_type.clone().unwrap_or_default();
            tracing::debug!("Page {} is not HTML ({})", entry.url, content_type);
            return (
                fetched.status,
                vec![page_error(entry, FailureReason::NotHtml(content_type))],
            );
        }

        let body = fetched.body.unwrap_or_default();
        let parsed = match self.parser.parse(&body, &fetched.url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Failed to parse HTML for {}: {}", entry.url, e);
                return (
                    fetched.status,
                    vec![page_error(entry, FailureReason::Parse(e.to_string()))],
                );
            }
        };

        let page = PageResult {
            url: entry.url.clone(),
            status: fetched.status,
            text: parsed.text,
            links: parsed.links,
            images: parsed.images,
        };

        let analysis = self
            .analyzer
            .analyze(&page, &self.fetcher, self.session.scope())
            .await;

        let mut accepted = 0;
        for link in analysis.discovered {
            if self.session.admit(link, entry.depth + 1).is_accepted() {
                accepted += 1;
            }
        }
        tracing::debug!(
            "Page {}: {} findings, {} new links queued",
            entry.url,
            analysis.findings.len(),
            accepted
        );

        (page.status, analysis.findings)
    }
}

fn page_error(entry: &FrontierEntry, reason: FailureReason) -> Finding {
    Finding::PageError {
        page: entry.url.clone(),
        reason,
    }
}
