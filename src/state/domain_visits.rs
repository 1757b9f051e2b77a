//! Per-domain enqueue accounting
//!
//! Counts how many URLs rooted at each domain have been accepted into the
//! frontier this run. The cap keeps one high-fanout site from monopolising
//! the crawl; callers may pass a doubled cap for well-behaved TLDs.

use std::collections::HashMap;
use std::sync::Mutex;

/// Map of normalised domain to enqueue count for the current run.
pub struct DomainVisits {
    counts: Mutex<HashMap<String, u32>>,
}

impl DomainVisits {
    pub fn new() -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Records one enqueued URL for the domain.
    pub fn record(&self, domain: &str) {
        let mut counts = self.counts.lock().expect("visits mutex poisoned");
        *counts.entry(domain.to_string()).or_insert(0) += 1;
    }

    /// Number of URLs enqueued for the domain so far.
    pub fn count(&self, domain: &str) -> u32 {
        self.counts
            .lock()
            .expect("visits mutex poisoned")
            .get(domain)
            .copied()
            .unwrap_or(0)
    }

    /// Whether the domain still has room under the given cap.
    pub fn under_cap(&self, domain: &str, cap: u32) -> bool {
        self.count(domain) < cap
    }

    /// Number of distinct domains seen this run.
    pub fn domains_seen(&self) -> usize {
        self.counts.lock().expect("visits mutex poisoned").len()
    }
}

impl Default for DomainVisits {
    fn default() -> Self {
        Self::new()
    }
}
