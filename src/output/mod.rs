//! Output module for crawl findings and reports
//!
//! This module handles:
//! - The finding and report model
//! - Collecting per-page results from concurrent workers
//! - Rendering the final report as JSON or as a text summary

mod aggregator;
mod finding;
mod json;
mod report;
mod text;
mod traits;

pub use aggregator::Aggregator;
pub use finding::{Finding, FindingKind};
pub use json::JsonRenderer;
pub use report::{CrawlReport, PageSummary, ReportMeta};
pub use text::{format_text_summary, TextRenderer};
pub use traits::{write_report, OutputError, OutputResult, Renderer};
