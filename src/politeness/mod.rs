//! Per-domain politeness: robots.txt enforcement and crawl-delay pacing
//!
//! The gate is the single choke point every fetch passes through. For each
//! domain it caches a [`RobotsEntry`] behind its own async mutex; that lock
//! is deliberately held across the crawl-delay sleep, which serialises
//! concurrent fetchers targeting the same host and is exactly what enforces
//! the minimum spacing. Gate calls for different domains never contend.

mod entry;
mod parser;

pub use entry::{RobotsEntry, MAX_CRAWL_DELAY};
pub use parser::RobotsRules;

use crate::fetch::Transport;
use crate::url::{domain_of, parse_with_scheme};
use crate::CrawlError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;

/// Outcome of a gate passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// The fetch may proceed now; any required delay has already elapsed.
    Granted,
    /// robots.txt forbids this URL for our crawler.
    Disallowed,
}

/// Per-domain robots.txt cache and crawl-delay scheduler.
pub struct PolitenessGate {
    entries: StdMutex<HashMap<String, Arc<AsyncMutex<RobotsEntry>>>>,
    transport: Arc<Transport>,
    crawler_name: String,
    shutdown: CancellationToken,
}

impl PolitenessGate {
    pub fn new(
        transport: Arc<Transport>,
        crawler_name: String,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            entries: StdMutex::new(HashMap::new()),
            transport,
            crawler_name,
            shutdown,
        }
    }

    /// Blocks until the URL may be fetched politely, or reports why not.
    ///
    /// The sequence per call: resolve the domain, fetch-or-reuse its robots
    /// entry (refreshing after 24 h), test the URL against the rules, then
    /// wait out the crawl delay while holding the entry lock.
    ///
    /// # Returns
    ///
    /// * `Ok(Permission::Granted)` - proceed with the fetch
    /// * `Ok(Permission::Disallowed)` - drop the URL
    /// * `Err(CrawlError::Cancelled)` - shutdown interrupted the wait
    pub async fn wait_for_permission(&self, raw_url: &str) -> Result<Permission, CrawlError> {
        let parsed = parse_with_scheme(raw_url)?;
        let domain = domain_of(&parsed)?;
        let entry = self.entry_for(&domain);

        let mut entry = entry.lock().await;

        if entry.needs_refresh() {
            let robots_url = parsed
                .join("/robots.txt")
                .map_err(|e| crate::UrlError::Parse(e.to_string()))?;

            let content = tokio::select! {
                _ = self.shutdown.cancelled() => return Err(CrawlError::Cancelled),
                content = self.transport.fetch_robots(robots_url.as_str()) => content,
            };
            entry.refresh(content, &self.crawler_name);
            tracing::debug!(
                "Refreshed robots.txt for {} (crawl-delay {:?})",
                domain,
                entry.crawl_delay()
            );
        }

        if !entry.is_allowed(parsed.as_str(), &self.crawler_name) {
            return Ok(Permission::Disallowed);
        }

        let wait = entry.reserve_access(Instant::now());
        if !wait.is_zero() {
            tracing::trace!("Crawl-delay wait of {:?} for {}", wait, domain);
            tokio::select! {
                _ = self.shutdown.cancelled() => return Err(CrawlError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }

        Ok(Permission::Granted)
    }

    /// Number of domains with a cached robots entry.
    pub fn cached_domains(&self) -> usize {
        self.entries.lock().expect("robots map poisoned").len()
    }

    // Short critical section: the map lock is only held to clone the Arc.
    fn entry_for(&self, domain: &str) -> Arc<AsyncMutex<RobotsEntry>> {
        let mut entries = self.entries.lock().expect("robots map poisoned");
        entries
            .entry(domain.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(RobotsEntry::new())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::UserAgentPool;

    fn test_gate() -> PolitenessGate {
        let agents = UserAgentPool::from_agents(vec!["StriderTest/1.0".to_string()]).unwrap();
        let transport = Arc::new(Transport::new(agents).unwrap());
        PolitenessGate::new(transport, "strider".to_string(), CancellationToken::new())
    }

    #[test]
    fn test_entries_shared_per_domain() {
        let gate = test_gate();
        let a = gate.entry_for("example.com");
        let b = gate.entry_for("example.com");
        let c = gate.entry_for("other.com");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(gate.cached_domains(), 2);
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let gate = test_gate();
        assert!(gate.wait_for_permission("http://[::invalid").await.is_err());
    }

    // Gate behaviour over the network (disallow, crawl-delay spacing,
    // allow-all on fetch failure) is covered in tests/crawl_tests.rs
    // against a mock server.
}
