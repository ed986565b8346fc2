//! Robots.txt rule evaluation
//!
//! Allow/Disallow matching is delegated to the robotstxt crate, which applies
//! the standard precedence: the longest matching rule wins and a tie between
//! Allow and Disallow goes to Allow. Crawl-delay is not covered by that crate
//! and is parsed here.

use robotstxt::DefaultMatcher;
use std::time::Duration;

/// Longest Crawl-delay honored; larger values are clamped to this
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(60);

/// Parsed robots.txt data
///
/// An empty body means allow all.
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    content: String,
}

impl RobotsRules {
    /// Creates rules from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Rules that allow everything
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a path is allowed for the given product token
    ///
    /// # Arguments
    ///
    /// * `path` - The path (and query) to check, e.g. `/page.html?x=1`
    /// * `agent` - The robots product token, e.g. `SiteInspector`
    pub fn is_allowed(&self, path: &str, agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        // The matcher expects a full URL; only the path part is consulted
        let url = format!("http://robots.invalid{}", path);
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, agent, &url)
    }

    /// Gets the crawl delay that applies to the given product token
    ///
    /// A group naming the agent takes priority over the `*` group. Consecutive
    /// `User-agent` lines form one group; the first rule line after them
    /// closes the list of agents.
    pub fn crawl_delay(&self, agent: &str) -> Option<Duration> {
        let agent = agent.to_lowercase();

        let mut group_agents: Vec<String> = Vec::new();
        let mut in_agent_lines = false;
        let mut for_agent: Option<f64> = None;
        let mut for_wildcard: Option<f64> = None;

        for line in self.content.lines() {
            let line = match line.split_once('#') {
                Some((before, _)) => before,
                None => line,
            }
            .trim();

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            if key == "user-agent" {
                if !in_agent_lines {
                    group_agents.clear();
                    in_agent_lines = true;
                }
                group_agents.push(value.to_lowercase());
                continue;
            }
            in_agent_lines = false;

            if key != "crawl-delay" {
                continue;
            }

            let Ok(delay) = value.parse::<f64>() else {
                continue;
            };
            if !delay.is_finite() || delay < 0.0 {
                continue;
            }

            if group_agents.iter().any(|ua| *ua == agent) {
                for_agent.get_or_insert(delay);
            } else if group_agents.iter().any(|ua| ua == "*") {
                for_wildcard.get_or_insert(delay);
            }
        }

        for_agent
            .or(for_wildcard)
            .map(|delay| {
                Duration::try_from_secs_f64(delay)
                    .unwrap_or(MAX_CRAWL_DELAY)
                    .min(MAX_CRAWL_DELAY)
            })
    }
}
