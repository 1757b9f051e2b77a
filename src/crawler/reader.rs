//! Reader workers: seed ingress into the frontier
//!
//! Readers drain the shared ingress channel the coordinator fills from the
//! seed file. Each URL is counted against the resume line number, passed
//! through the dedup filter (seeds repeat across runs, so most of the
//! filtering happens right here), then pushed into the frontier, waiting
//! out a full queue with a squared backoff.

use crate::crawler::CrawlContext;
use crate::frontier::FrontierError;
use crate::url::domain_of_str;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

const INITIAL_BACKOFF: Duration = Duration::from_millis(1300);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Runs one reader worker until shutdown or channel close.
pub(crate) async fn run_reader(
    id: usize,
    ctx: Arc<CrawlContext>,
    ingress: Arc<Mutex<mpsc::Receiver<String>>>,
) {
    tracing::debug!("Reader {} started", id);

    loop {
        // The receiver lock is held only for the recv itself; whichever
        // reader gets the lock takes the next URL.
        let url = {
            let mut rx = ingress.lock().await;
            tokio::select! {
                _ = ctx.shutdown.cancelled() => break,
                received = rx.recv() => match received {
                    Some(url) => url,
                    None => break,
                },
            }
        };

        ctx.progress.increment();
        ctx.stats.record_seed();

        if ctx.filter.check_and_mark(&url) {
            ctx.stats.record_duplicate();
            tracing::trace!("Reader {}: {} already scheduled, skipping", id, url);
            continue;
        }

        if !insert_with_backoff(&ctx, url).await {
            break;
        }
    }

    tracing::debug!("Reader {} stopped", id);
}

// Pushes one URL into the frontier, sleeping out a full queue. Returns
// false when shutdown interrupted the retry loop.
async fn insert_with_backoff(ctx: &CrawlContext, url: String) -> bool {
    let mut backoff = INITIAL_BACKOFF;
    let mut pending = url;

    loop {
        let domain = domain_of_str(&pending).ok();
        match ctx.frontier.insert(pending) {
            Ok(()) => {
                if let Some(domain) = domain {
                    ctx.visits.record(&domain);
                }
                return true;
            }
            Err(FrontierError::Full(returned)) => {
                pending = returned;
                tracing::trace!("Frontier full, reader backing off {:?}", backoff);
                tokio::select! {
                    _ = ctx.shutdown.cancelled() => return false,
                    _ = tokio::time::sleep(backoff) => {}
                }
                backoff = next_backoff(backoff);
            }
        }
    }
}

// Squares the wait on every failed attempt, capped at MAX_BACKOFF.
fn next_backoff(current: Duration) -> Duration {
    let squared = current.as_secs_f64().powi(2);
    Duration::from_secs_f64(squared.min(MAX_BACKOFF.as_secs_f64()))
}
