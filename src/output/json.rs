//! Structured JSON rendering

use crate::output::report::CrawlReport;
use crate::output::traits::{OutputResult, Renderer};

/// Renders the report as JSON
#[derive(Debug, Clone, Copy)]
pub struct JsonRenderer {
    pretty: bool,
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Single-line output
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for JsonRenderer {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn render(&self, report: &CrawlReport) -> OutputResult<Vec<u8>> {
        let mut bytes = if self.pretty {
            serde_json::to_vec_pretty(report)?
        } else {
            serde_json::to_vec(report)?
        };
        bytes.push(b'\n');
        Ok(bytes)
    }
}
