//! Collects per-page results from concurrent workers
//!
//! Records are keyed by the frontier sequence number, so the finished report
//! lists pages in discovery order no matter which worker finished first.

use crate::crawler::FrontierEntry;
use crate::output::finding::Finding;
use crate::output::report::{CrawlReport, PageSummary, ReportMeta};
use crate::state::PageStatus;
use crate::url::NormalizedUrl;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct PageRecord {
    url: NormalizedUrl,
    depth: u32,
    status: PageStatus,
    findings: Vec<Finding>,
}

#[derive(Debug, Default)]
struct AggregatorState {
    pages: BTreeMap<u64, PageRecord>,
    frozen: bool,
}

/// Thread-safe sink for page results
#[derive(Debug, Default)]
pub struct Aggregator {
    state: Mutex<AggregatorState>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AggregatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the outcome of one dequeued page with all of its findings
    ///
    /// Returns the number of pages recorded so far, including this one.
    /// Returns None (and drops the record) once the report has been
    /// finalized, or if the page was already recorded.
    pub fn record_page(
        &self,
        entry: &FrontierEntry,
        status: PageStatus,
        mut findings: Vec<Finding>,
    ) -> Option<usize> {
        // Stable: findings of one kind keep their on-page order
        findings.sort_by_key(Finding::kind);

        let mut state = self.lock();
        if state.frozen {
            tracing::warn!("Dropping result for {} recorded after finalize", entry.url);
            return None;
        }
        if state.pages.contains_key(&entry.seq) {
            tracing::warn!("Duplicate result for {} ignored", entry.url);
            return None;
        }

        state.pages.insert(
            entry.seq,
            PageRecord {
                url: entry.url.clone(),
                depth: entry.depth,
                status,
                findings,
            },
        );
        Some(state.pages.len())
    }

    pub fn pages_recorded(&self) -> usize {
        self.lock().pages.len()
    }

    /// Freezes the aggregator and builds the report
    ///
    /// Later calls return a report built from the same frozen records.
    pub fn finalize(&self, meta: ReportMeta) -> CrawlReport {
        let mut state = self.lock();
        state.frozen = true;

        let mut report = CrawlReport::empty(meta);
        for record in state.pages.values() {
            report.pages.push(PageSummary {
                url: record.url.clone(),
                depth: record.depth,
                status: record.status.clone(),
                findings: record.findings.len(),
            });
            report.findings.extend(record.findings.iter().cloned());
        }
        report.pages_visited = report.pages.len();
        report
    }
}
