//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageStatus`/`FailureReason`: how a fetched page or probed target ended up
//! - `CrawlSession`: the shared state of one run (frontier, aggregator, scope)
//! - `CrawlScope`: same-origin and robots checks for candidate URLs

mod page_status;
mod session;

// Re-export main types
pub use page_status::{FailureReason, PageStatus};
pub use session::{CrawlLimits, CrawlScope, CrawlSession};
