use crate::config::types::{Config, CrawlerConfig, SpellingConfig, UserAgentConfig};
use crate::url::{normalize_url, NormalizedUrl};
use crate::ConfigError;
use url::Url;

/// Upper bound on the worker pool
pub const MAX_WORKERS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_spelling_config(&config.spelling)?;
    if let Some(seed) = &config.crawler.seed_url {
        validate_seed_url(seed)?;
    }
    Ok(())
}

/// Parses and normalizes a seed URL, mapping failures to a configuration error
pub fn validate_seed_url(seed: &str) -> Result<NormalizedUrl, ConfigError> {
    normalize_url(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.worker_count < 1 || config.worker_count > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "worker_count must be between 1 and {}, got {}",
            MAX_WORKERS, config.worker_count
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.probe_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "probe_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.probe_concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "probe_concurrency must be >= 1, got {}",
            config.probe_concurrency
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    // The name doubles as the robots.txt product token
    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only letters, digits, '-' and '_', got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

fn validate_spelling_config(config: &SpellingConfig) -> Result<(), ConfigError> {
    if config.min_word_length < 1 {
        return Err(ConfigError::Validation(
            "min_word_length must be >= 1".to_string(),
        ));
    }
    Ok(())
}
