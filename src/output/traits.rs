//! Renderer trait and output errors
//!
//! Renderers turn a finished [`CrawlReport`] into bytes. They only ever see
//! the report by shared reference.

use crate::output::report::CrawlReport;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A report output format
pub trait Renderer {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Renders the report
    fn render(&self, report: &CrawlReport) -> OutputResult<Vec<u8>>;
}

/// Renders `report` and writes it to `path`, creating parent directories
///
/// # Arguments
///
/// * `renderer` - The output format
/// * `report` - The finished crawl report
/// * `path` - Destination file
pub fn write_report(renderer: &dyn Renderer, report: &CrawlReport, path: &Path) -> OutputResult<()> {
    let bytes = renderer.render(report)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;

    tracing::info!("Wrote {} report to {}", renderer.name(), path.display());
    Ok(())
}
