//! Per-domain robots state
//!
//! One `RobotsEntry` exists per crawled domain: the parsed rules, the capped
//! crawl-delay, and the access clock the gate advances on every passage.

use crate::politeness::parser::RobotsRules;
use std::time::{Duration, Instant};

/// Crawl delays above this are clamped, bounding the worst-case stall a
/// hostile or misconfigured robots.txt can impose on a worker.
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(5);

/// Cached robots data is refreshed after this long.
const ROBOTS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Robots rules and access clock for one domain.
pub struct RobotsEntry {
    rules: RobotsRules,
    crawl_delay: Duration,
    last_access: Option<Instant>,
    fetched_at: Option<Instant>,
}

impl RobotsEntry {
    /// A fresh entry that has never fetched robots.txt.
    pub fn new() -> Self {
        Self {
            rules: RobotsRules::allow_all(),
            crawl_delay: Duration::ZERO,
            last_access: None,
            fetched_at: None,
        }
    }

    /// Whether robots.txt has never been fetched or has gone stale.
    pub fn needs_refresh(&self) -> bool {
        match self.fetched_at {
            Some(at) => at.elapsed() > ROBOTS_TTL,
            None => true,
        }
    }

    /// Installs freshly fetched robots content (or allow-all on `None`).
    pub fn refresh(&mut self, content: Option<String>, user_agent: &str) {
        match content {
            Some(content) => {
                let rules = RobotsRules::from_content(&content);
                let delay = rules
                    .crawl_delay(user_agent)
                    .map(Duration::from_secs_f64)
                    .unwrap_or(Duration::ZERO);
                self.crawl_delay = delay.min(MAX_CRAWL_DELAY);
                self.rules = rules;
            }
            None => {
                self.rules = RobotsRules::allow_all();
                self.crawl_delay = Duration::ZERO;
            }
        }
        self.fetched_at = Some(Instant::now());
    }

    /// Whether the rules permit fetching the URL.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        self.rules.is_allowed(url, user_agent)
    }

    /// The effective (capped) crawl delay.
    pub fn crawl_delay(&self) -> Duration {
        self.crawl_delay.min(MAX_CRAWL_DELAY)
    }

    /// Claims the next access slot and returns how long the caller must
    /// sleep before proceeding.
    ///
    /// The caller holds this entry's lock across the sleep, so advancing
    /// `last_access` before sleeping is equivalent to advancing after: no
    /// other gate passage for the domain can interleave.
    pub fn reserve_access(&mut self, now: Instant) -> Duration {
        let delay = self.crawl_delay();
        match self.last_access {
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                let mut wait = delay.saturating_sub(elapsed);
                if wait > delay {
                    // Clock anomaly; never stall longer than one full delay.
                    wait = delay;
                }
                if wait > Duration::ZERO {
                    self.last_access = Some(last + delay);
                    wait
                } else {
                    self.last_access = Some(now);
                    Duration::ZERO
                }
            }
            None => {
                self.last_access = Some(now);
                Duration::ZERO
            }
        }
    }
}

impl Default for RobotsEntry {
    fn default() -> Self {
        Self::new()
    }
}
