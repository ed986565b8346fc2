//! Human-readable text summary
//!
//! Lists pages with spelling issues, the misspelled words with suggestions,
//! pages with broken links or images, page errors, and run totals.

use crate::output::finding::{Finding, FindingKind};
use crate::output::report::CrawlReport;
use crate::output::traits::{OutputResult, Renderer};
use std::fmt::Write;

/// Renders the report as plain text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn render(&self, report: &CrawlReport) -> OutputResult<Vec<u8>> {
        Ok(format_text_summary(report).into_bytes())
    }
}

/// Formats a crawl report as a plain-text summary
pub fn format_text_summary(report: &CrawlReport) -> String {
    let mut out = String::new();

    // Infallible: writing to a String
    let _ = write_summary(&mut out, report);
    out
}

fn write_summary(out: &mut String, report: &CrawlReport) -> std::fmt::Result {
    writeln!(out, "=== Summary Report ===")?;
    writeln!(out)?;
    writeln!(out, "Seed: {}", report.seed)?;
    writeln!(out, "User agent: {}", report.user_agent)?;
    writeln!(out, "Started: {}", report.started_at.to_rfc3339())?;

    // Spelling
    writeln!(out)?;
    writeln!(out, "Page URLs with spelling issues:")?;
    let pages = report.pages_with(&[FindingKind::MisspelledWord]);
    if pages.is_empty() {
        writeln!(out, " None")?;
    }
    for page in pages {
        writeln!(out, " - {}", page)?;
    }

    writeln!(out)?;
    writeln!(out, "Misspelled words (with suggestions):")?;
    let mut any = false;
    for finding in &report.findings {
        if let Finding::MisspelledWord {
            page,
            word,
            context,
            suggestion,
        } = finding
        {
            any = true;
            match suggestion {
                Some(s) => writeln!(out, " - {} (suggestion: {})", word, s)?,
                None => writeln!(out, " - {} (no suggestion)", word)?,
            }
            writeln!(out, "     on {}: \"{}\"", page, context)?;
        }
    }
    if !any {
        writeln!(out, " None")?;
    }

    // Broken links and images
    writeln!(out)?;
    writeln!(out, "Page URLs with broken links/images:")?;
    let pages = report.pages_with(&[FindingKind::BrokenLink, FindingKind::BrokenImage]);
    if pages.is_empty() {
        writeln!(out, " None")?;
    }
    for page in pages {
        writeln!(out, " - {}", page)?;
        for finding in report.findings_for(page) {
            let label = match finding.kind() {
                FindingKind::BrokenLink => "link",
                FindingKind::BrokenImage => "image",
                _ => continue,
            };
            if let (Some(target), Some(reason)) = (finding.target(), finding.reason()) {
                writeln!(out, "    * [{}] {} ({})", label, target, reason)?;
            }
        }
    }

    // Pages that could not be checked
    let errors: Vec<&Finding> = report
        .findings
        .iter()
        .filter(|f| f.kind() == FindingKind::PageError)
        .collect();
    if !errors.is_empty() {
        writeln!(out)?;
        writeln!(out, "Pages that could not be checked:")?;
        for finding in errors {
            if let Some(reason) = finding.reason() {
                writeln!(out, " - {}: {}", finding.page(), reason)?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "=== Crawl Summary ===")?;
    writeln!(out, "Total Pages Crawled: {}", report.pages_visited)?;
    writeln!(out, "Total Pages Discovered: {}", report.pages_discovered)?;
    writeln!(out, "Total Spelling Mistakes: {}", report.misspelling_count())?;
    writeln!(out, "Total Broken Links/Images: {}", report.broken_count())?;
    writeln!(out, "Total Page Errors: {}", report.count(FindingKind::PageError))?;
    writeln!(out, "Elapsed: {:.2}s", report.elapsed.as_secs_f64())?;
    if report.aborted {
        writeln!(out, "Crawl was aborted before the frontier was exhausted.")?;
    }

    Ok(())
}
