//! The crawl report model
//!
//! A [`CrawlReport`] is produced once by the aggregator at the end of a run
//! and is read-only from then on.

use crate::output::finding::{Finding, FindingKind};
use crate::state::PageStatus;
use crate::url::NormalizedUrl;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::time::Duration;

/// One visited page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub url: NormalizedUrl,
    pub depth: u32,
    pub status: PageStatus,

    /// Number of findings recorded against this page
    pub findings: usize,
}

/// Run-level facts the aggregator does not track itself
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub seed: NormalizedUrl,
    pub user_agent: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub pages_discovered: usize,
    pub aborted: bool,
}

/// Final result of a crawl
///
/// `pages` is in discovery order; `findings` is grouped by page in that same
/// order, then by kind.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: NormalizedUrl,
    pub user_agent: String,
    pub started_at: DateTime<Utc>,

    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,

    pub pages_visited: usize,
    pub pages_discovered: usize,
    pub aborted: bool,
    pub pages: Vec<PageSummary>,
    pub findings: Vec<Finding>,
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

impl CrawlReport {
    /// An empty report for a run that visited nothing
    pub fn empty(meta: ReportMeta) -> Self {
        Self {
            seed: meta.seed,
            user_agent: meta.user_agent,
            started_at: meta.started_at,
            elapsed: meta.elapsed,
            pages_visited: 0,
            pages_discovered: meta.pages_discovered,
            aborted: meta.aborted,
            pages: Vec::new(),
            findings: Vec::new(),
        }
    }

    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind() == kind).count()
    }

    pub fn misspelling_count(&self) -> usize {
        self.count(FindingKind::MisspelledWord)
    }

    /// Broken links plus broken images
    pub fn broken_count(&self) -> usize {
        self.count(FindingKind::BrokenLink) + self.count(FindingKind::BrokenImage)
    }

    pub fn findings_for<'a>(&'a self, page: &'a NormalizedUrl) -> impl Iterator<Item = &'a Finding> {
        self.findings.iter().filter(move |f| f.page() == page)
    }

    /// Pages carrying at least one finding of any of `kinds`, in report order
    pub fn pages_with(&self, kinds: &[FindingKind]) -> Vec<&NormalizedUrl> {
        let mut pages: Vec<&NormalizedUrl> = Vec::new();
        for finding in self.findings.iter().filter(|f| kinds.contains(&f.kind())) {
            if pages.last() != Some(&finding.page()) {
                pages.push(finding.page());
            }
        }
        pages
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FailureReason;

    fn url(s: &str) -> NormalizedUrl {
        NormalizedUrl::parse(s).unwrap()
    }

    fn report() -> CrawlReport {
        let home = url("https://example.com/");
        let about = url("https://example.com/about");
        CrawlReport {
            seed: home.clone(),
            user_agent: "SiteInspector/0.1.0".to_string(),
            started_at: Utc::now(),
            elapsed: Duration::from_millis(1500),
            pages_visited: 2,
            pages_discovered: 3,
            aborted: false,
            pages: vec![
                PageSummary {
                    url: home.clone(),
                    depth: 0,
                    status: PageStatus::Ok,
                    findings: 2,
                },
                PageSummary {
                    url: about.clone(),
                    depth: 1,
                    status: PageStatus::Ok,
                    findings: 1,
                },
            ],
            findings: vec![
                Finding::MisspelledWord {
                    page: home.clone(),
                    word: "tset".to_string(),
                    context: "a tset".to_string(),
                    suggestion: Some("test".to_string()),
                },
                Finding::BrokenLink {
                    page: home,
                    target: url("https://example.com/missing"),
                    reason: FailureReason::HttpStatus(404),
                },
                Finding::BrokenImage {
                    page: about,
                    target: url("https://example.com/logo.png"),
                    reason: FailureReason::HttpStatus(500),
                },
            ],
        }
    }

    #[test]
    fn test_counts() {
        let report = report();
        assert_eq!(report.misspelling_count(), 1);
        assert_eq!(report.broken_count(), 2);
        assert_eq!(report.count(FindingKind::PageError), 0);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_pages_with() {
        let report = report();
        let broken = report.pages_with(&[FindingKind::BrokenLink, FindingKind::BrokenImage]);
        let broken: Vec<&str> = broken.iter().map(|u| u.as_str()).collect();
        assert_eq!(broken, vec!["https://example.com/", "https://example.com/about"]);

        let spelling = report.pages_with(&[FindingKind::MisspelledWord]);
        assert_eq!(spelling.len(), 1);
    }

    #[test]
    fn test_findings_for() {
        let report = report();
        let about = url("https://example.com/about");
        assert_eq!(report.findings_for(&about).count(), 1);
    }

    #[test]
    fn test_elapsed_serialized_as_millis() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["elapsed_ms"], 1500);
        assert_eq!(json["pages_visited"], 2);
        assert_eq!(json["pages"][1]["depth"], 1);
        assert!(json.get("elapsed").is_none());
    }
}
