//! Page analysis: spelling checks and link/image probes
//!
//! Given the extracted contents of one page, the analyzer produces the page's
//! findings and the in-scope links that should be offered to the frontier.

use crate::crawler::fetcher::{PageFetcher, ProbeOutcome};
use crate::output::Finding;
use crate::spelling::{SpellChecker, Tokenizer};
use crate::state::{CrawlScope, PageStatus};
use crate::url::NormalizedUrl;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// A fetched and parsed page, ready for analysis
#[derive(Debug, Clone)]
pub struct PageResult {
    pub url: NormalizedUrl,
    pub status: PageStatus,
    pub text: String,
    pub links: Vec<NormalizedUrl>,
    pub images: Vec<NormalizedUrl>,
}

/// Findings for one page plus the links worth crawling next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub findings: Vec<Finding>,

    /// In-scope links whose probe succeeded, in page order
    pub discovered: Vec<NormalizedUrl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKind {
    Link,
    Image,
}

/// Stateless page analyzer shared by all workers
pub struct PageAnalyzer {
    checker: Arc<dyn SpellChecker>,
    tokenizer: Tokenizer,
    probe_concurrency: usize,
}

impl PageAnalyzer {
    pub fn new(checker: Arc<dyn SpellChecker>, tokenizer: Tokenizer, probe_concurrency: usize) -> Self {
        Self {
            checker,
            tokenizer,
            probe_concurrency: probe_concurrency.max(1),
        }
    }

    /// Runs every check on `page`
    ///
    /// Links are probed before images; probes run concurrently but findings
    /// keep page order. Same-site targets that robots.txt disallows are
    /// skipped without a finding.
    pub async fn analyze(
        &self,
        page: &PageResult,
        fetcher: &PageFetcher,
        scope: &CrawlScope,
    ) -> Analysis {
        let mut findings = self.check_spelling(page);

        let targets: Vec<(TargetKind, NormalizedUrl)> = page
            .links
            .iter()
            .map(|t| (TargetKind::Link, t.clone()))
            .chain(page.images.iter().map(|t| (TargetKind::Image, t.clone())))
            .filter(|(_, target)| {
                let skip = scope.is_in_scope(target) && !scope.is_allowed(target);
                if skip {
                    tracing::trace!("Not probing {}: disallowed by robots.txt", target);
                }
                !skip
            })
            .collect();

        let outcomes: Vec<(TargetKind, NormalizedUrl, ProbeOutcome)> = stream::iter(targets)
            .map(|(kind, target)| async move {
                let outcome = fetcher.probe(&target, scope).await;
                (kind, target, outcome)
            })
            .buffered(self.probe_concurrency)
            .collect()
            .await;

        let mut discovered = Vec::new();
        for (kind, target, outcome) in outcomes {
            match (kind, outcome) {
                (TargetKind::Link, Ok(())) => {
                    if scope.is_in_scope(&target) {
                        discovered.push(target);
                    }
                }
                (TargetKind::Image, Ok(())) => {}
                (TargetKind::Link, Err(reason)) => {
                    tracing::debug!("Broken link on {}: {} ({})", page.url, target, reason);
                    findings.push(Finding::BrokenLink {
                        page: page.url.clone(),
                        target,
                        reason,
                    });
                }
                (TargetKind::Image, Err(reason)) => {
                    tracing::debug!("Broken image on {}: {} ({})", page.url, target, reason);
                    findings.push(Finding::BrokenImage {
                        page: page.url.clone(),
                        target,
                        reason,
                    });
                }
            }
        }

        Analysis {
            findings,
            discovered,
        }
    }

    /// One finding per token that fails the spelling check
    pub fn check_spelling(&self, page: &PageResult) -> Vec<Finding> {
        self.tokenizer
            .tokenize(&page.text)
            .into_iter()
            .filter(|token| self.checker.is_misspelled(&token.word))
            .map(|token| Finding::MisspelledWord {
                page: page.url.clone(),
                suggestion: self.checker.suggest(&token.word),
                word: token.word,
                context: token.context,
            })
            .collect()
    }
}
