//! Run statistics
//!
//! Lock-free counters bumped from every worker, summarised once at
//! shutdown.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters aggregated over one crawler run.
#[derive(Debug, Default)]
pub struct CrawlStats {
    seeds_ingested: AtomicU64,
    pages_crawled: AtomicU64,
    fetch_errors: AtomicU64,
    disallowed: AtomicU64,
    filtered_out: AtomicU64,
    links_enqueued: AtomicU64,
    duplicates_skipped: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_seed(&self) {
        self.seeds_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page(&self) {
        self.pages_crawled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_error(&self) {
        self.fetch_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_disallowed(&self) {
        self.disallowed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filtered(&self) {
        self.filtered_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_links_enqueued(&self, count: u64) {
        self.links_enqueued.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pages_crawled(&self) -> u64 {
        self.pages_crawled.load(Ordering::Relaxed)
    }

    pub fn links_enqueued(&self) -> u64 {
        self.links_enqueued.load(Ordering::Relaxed)
    }

    /// Logs the end-of-run summary.
    pub fn log_summary(&self) {
        tracing::info!(
            seeds = self.seeds_ingested.load(Ordering::Relaxed),
            pages = self.pages_crawled.load(Ordering::Relaxed),
            fetch_errors = self.fetch_errors.load(Ordering::Relaxed),
            disallowed = self.disallowed.load(Ordering::Relaxed),
            filtered = self.filtered_out.load(Ordering::Relaxed),
            links_enqueued = self.links_enqueued.load(Ordering::Relaxed),
            duplicates = self.duplicates_skipped.load(Ordering::Relaxed),
            "Crawl run finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = CrawlStats::new();
        stats.record_page();
        stats.record_page();
        stats.record_links_enqueued(5);
        stats.record_links_enqueued(3);

        assert_eq!(stats.pages_crawled(), 2);
        assert_eq!(stats.links_enqueued(), 8);
    }
}
