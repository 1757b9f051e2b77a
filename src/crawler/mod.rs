//! The crawl coordination engine
//!
//! Three layers interlock here: the bounded frontier with backpressure,
//! the dedup filter sized for the whole crawl, and the per-domain
//! politeness gate — driven by two worker fleets (readers and consumers)
//! under one shutdown root. The [`Coordinator`] wires them together and
//! runs the seed loop.

mod consumer;
mod coordinator;
mod reader;

pub use coordinator::Coordinator;

use crate::fetch::Transport;
use crate::filter::VisitedFilter;
use crate::frontier::Frontier;
use crate::output::{CrawlStats, PageSink};
use crate::politeness::PolitenessGate;
use crate::state::{DomainVisits, ProgressTracker};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared handles every worker operates on.
///
/// One instance per run; workers hold it behind an `Arc`. Gathering the
/// process-wide pieces (HTTP transport, robots cache, filter, counters)
/// into one explicitly constructed value keeps the worker stack free of
/// globals.
pub(crate) struct CrawlContext {
    pub frontier: Arc<Frontier>,
    pub filter: Arc<VisitedFilter>,
    pub visits: Arc<DomainVisits>,
    pub gate: Arc<PolitenessGate>,
    pub transport: Arc<Transport>,
    pub progress: Arc<ProgressTracker>,
    pub stats: Arc<CrawlStats>,
    pub sink: Option<Arc<PageSink>>,
    pub domain_visit_cap: u32,
    pub shutdown: CancellationToken,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fetch::UserAgentPool;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TEST_ID: AtomicUsize = AtomicUsize::new(0);

    // Builds a context backed by throwaway state paths. The filter and
    // progress files are unique per call and never flushed, so nothing
    // touches disk unless a test asks for it.
    pub(crate) fn test_context(frontier_capacity: usize, domain_visit_cap: u32) -> Arc<CrawlContext> {
        let id = TEST_ID.fetch_add(1, Ordering::Relaxed);
        let scratch = std::env::temp_dir().join(format!(
            "strider-ctx-{}-{}",
            std::process::id(),
            id
        ));

        let filter = VisitedFilter::open(&scratch.join("visited.bloom"), 10_000, 0.01, u32::MAX)
            .expect("test filter opens");
        let agents =
            UserAgentPool::from_agents(vec!["StriderTest/1.0".to_string()]).expect("agents");
        let transport = Arc::new(Transport::new(agents).expect("transport builds"));
        let shutdown = CancellationToken::new();
        let gate = Arc::new(PolitenessGate::new(
            Arc::clone(&transport),
            "strider".to_string(),
            shutdown.clone(),
        ));

        Arc::new(CrawlContext {
            frontier: Arc::new(Frontier::new(frontier_capacity)),
            filter: Arc::new(filter),
            visits: Arc::new(DomainVisits::new()),
            gate,
            transport,
            progress: Arc::new(ProgressTracker::load(&scratch.join("progress.txt"))),
            stats: Arc::new(CrawlStats::new()),
            sink: None,
            domain_visit_cap,
            shutdown,
        })
    }
}
