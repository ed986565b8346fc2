use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Site-Inspector
///
/// Every section and key is optional; missing values take the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub spelling: SpellingConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Seed URL; the command line may supply or override it
    pub seed_url: Option<String>,

    /// Maximum number of pages accepted into the frontier
    pub max_pages: usize,

    /// Maximum link depth from the seed (the seed is depth 0)
    pub max_depth: u32,

    /// Number of concurrent workers
    pub worker_count: usize,

    /// Timeout for fetching a crawled page (milliseconds)
    pub request_timeout_ms: u64,

    /// Timeout for a link/image existence probe (milliseconds)
    pub probe_timeout_ms: u64,

    /// Probes in flight at once for a single page
    pub probe_concurrency: usize,

    /// Minimum spacing between page fetches (milliseconds)
    pub politeness_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: None,
            max_pages: 50,
            max_depth: 3,
            worker_count: 5,
            request_timeout_ms: 10_000,
            probe_timeout_ms: 5_000,
            probe_concurrency: 8,
            politeness_delay_ms: 0,
        }
    }
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler, also the robots.txt product token
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SiteInspector".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Builds a configuration from a free-form user agent string
    ///
    /// `"MyBot/2.1 (+https://example.com/bot)"` yields name `MyBot`, version
    /// `2.1` and contact `https://example.com/bot`.
    pub fn from_header(header: &str) -> Self {
        let header = header.trim();
        let (product, comment) = match header.split_once(char::is_whitespace) {
            Some((product, rest)) => (product, Some(rest.trim())),
            None => (header, None),
        };
        let (name, version) = match product.split_once('/') {
            Some((name, version)) => (name.to_string(), version.to_string()),
            None => (product.to_string(), String::new()),
        };
        let contact_url = comment
            .map(|c| c.trim_start_matches('(').trim_end_matches(')').trim())
            .map(|c| c.trim_start_matches('+').to_string())
            .filter(|c| url::Url::parse(c).is_ok());

        Self {
            crawler_name: name,
            crawler_version: version,
            contact_url,
        }
    }

    /// Full `User-Agent` header value: `Name/Version (+contact)`
    pub fn header_value(&self) -> String {
        let mut value = if self.crawler_version.is_empty() {
            self.crawler_name.clone()
        } else {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        };
        if let Some(contact) = &self.contact_url {
            value.push_str(&format!(" (+{})", contact));
        }
        value
    }

    /// Token matched against robots.txt `User-agent` lines
    pub fn robots_token(&self) -> &str {
        &self.crawler_name
    }
}

/// Spell checking configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SpellingConfig {
    pub enabled: bool,

    /// Newline-separated word list; falls back to the system dictionary
    pub dictionary_path: Option<PathBuf>,

    /// Tokens shorter than this are never checked
    pub min_word_length: usize,

    /// Words of surrounding text kept on each side of a misspelling
    pub context_words: usize,

    /// Words accepted in addition to the dictionary
    pub ignore_words: Vec<String>,
}

impl Default for SpellingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dictionary_path: None,
            min_word_length: 3,
            context_words: 4,
            ignore_words: Vec::new(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the JSON report
    pub json_path: PathBuf,

    /// Path of the human-readable summary
    pub text_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: PathBuf::from("crawl_report.json"),
            text_path: PathBuf::from("crawl_summary.txt"),
        }
    }
}
