//! Robots.txt rules
//!
//! Allow/disallow questions are answered by the `robotstxt` matcher against
//! the raw file content; the `Crawl-delay` directive is not part of that
//! crate's surface, so it is parsed here by walking user-agent groups.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt content for one domain.
#[derive(Debug, Clone)]
pub struct RobotsRules {
    /// Raw robots.txt content; empty means allow everything.
    content: String,
}

impl RobotsRules {
    /// Wraps raw robots.txt content.
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// A permissive rule set used when robots.txt cannot be fetched or read.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
        }
    }

    /// Checks whether the crawler may fetch the given URL.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Extracts the `Crawl-delay` (seconds) applying to the given agent.
    ///
    /// A delay declared for the agent's own group wins over one declared
    /// for `*`; directives with unparseable or negative values are ignored.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        if self.content.is_empty() {
            return None;
        }

        let target = user_agent.to_lowercase();
        let mut group_agents: Vec<String> = Vec::new();
        let mut last_was_agent = false;
        let mut wildcard_delay: Option<f64> = None;
        let mut agent_delay: Option<f64> = None;

        for line in self.content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    // Consecutive User-agent lines form one group; a new
                    // User-agent after any other directive starts a new one.
                    if !last_was_agent {
                        group_agents.clear();
                    }
                    group_agents.push(value.to_lowercase());
                    last_was_agent = true;
                }
                "crawl-delay" => {
                    last_was_agent = false;
                    if let Ok(delay) = value.parse::<f64>() {
                        if delay >= 0.0 {
                            if group_agents.iter().any(|a| a == "*") {
                                wildcard_delay = Some(delay);
                            }
                            if group_agents
                                .iter()
                                .any(|a| a != "*" && target.contains(a.as_str()))
                            {
                                agent_delay = Some(delay);
                            }
                        }
                    }
                }
                _ => {
                    last_was_agent = false;
                }
            }
        }

        agent_delay.or(wildcard_delay)
    }
}
