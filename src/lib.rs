//! Site-Inspector: a website health crawler
//!
//! This crate crawls a website from a seed URL within a page/depth budget,
//! respecting robots.txt, and produces a report of broken links, broken images
//! and spelling issues found in the visible text of every visited page.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod spelling;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Inspector operations
///
/// Per-page failures never surface here; they are absorbed into findings.
/// Only pre-flight configuration problems and report-writing failures do.
#[derive(Debug, Error)]
pub enum InspectorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Failed to load dictionary {path}: {source}")]
    Dictionary {
        path: String,
        source: std::io::Error,
    },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Site-Inspector operations
pub type Result<T> = std::result::Result<T, InspectorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Dispatcher, Inspector, StopSignal};
pub use output::{CrawlReport, Finding, JsonRenderer, Renderer, TextRenderer};
pub use state::{FailureReason, PageStatus};
pub use url::{normalize_url, NormalizedUrl};
