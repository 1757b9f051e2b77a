//! Consumer workers: frontier to fetched page and back
//!
//! Each consumer pops a URL, clears it through the politeness gate, fetches
//! and extracts it, then feeds a bounded, interleaved slice of the page's
//! links back into the frontier. Every failure past the pop is local to the
//! URL: log, count, move on.

use crate::crawler::CrawlContext;
use crate::extract::{extract_with_timeout, PageData};
use crate::frontier::FrontierError;
use crate::politeness::Permission;
use crate::url::{domain_of_str, ensure_scheme, has_generous_tld};
use crate::CrawlError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

const EMPTY_FRONTIER_PAUSE: Duration = Duration::from_millis(500);

/// Absolute ceiling on links fed back from a single page.
const MAX_ENQUEUE_PER_PAGE: usize = 20;

/// Floor so that even a nearly full frontier accepts a couple of links.
const MIN_ENQUEUE_PER_PAGE: usize = 2;

/// Runs one consumer worker until shutdown.
pub(crate) async fn run_consumer(id: usize, ctx: Arc<CrawlContext>) {
    tracing::debug!("Consumer {} started", id);

    loop {
        if ctx.shutdown.is_cancelled() {
            break;
        }

        let Some(url) = ctx.frontier.remove() else {
            tokio::select! {
                _ = ctx.shutdown.cancelled() => break,
                _ = tokio::time::sleep(EMPTY_FRONTIER_PAUSE) => {}
            }
            continue;
        };

        process_url(&ctx, &url).await;
    }

    tracing::debug!("Consumer {} stopped", id);
}

async fn process_url(ctx: &CrawlContext, url: &str) {
    match ctx.gate.wait_for_permission(url).await {
        Ok(Permission::Granted) => {}
        Ok(Permission::Disallowed) => {
            ctx.stats.record_disallowed();
            tracing::debug!("Crawling disallowed by robots.txt for {}", url);
            return;
        }
        Err(CrawlError::Cancelled) => return,
        Err(e) => {
            tracing::debug!("Politeness gate failed for {}: {}", url, e);
            return;
        }
    }

    let full_url = ensure_scheme(url);
    let started = Instant::now();
    let fetched = tokio::select! {
        _ = ctx.shutdown.cancelled() => return,
        result = ctx.transport.fetch(&full_url) => result,
    };
    let load_time = started.elapsed();

    let fetched = match fetched {
        Ok(fetched) => fetched,
        Err(e) => {
            ctx.stats.record_fetch_error();
            tracing::debug!("Fetch failed for {}: {}", full_url, e);
            return;
        }
    };

    let base = match Url::parse(&full_url) {
        Ok(base) => base,
        Err(e) => {
            tracing::debug!("Unparseable URL {}: {}", full_url, e);
            return;
        }
    };

    let page = match extract_with_timeout(fetched.body, base).await {
        Ok(mut page) => {
            page.url = full_url.clone();
            page.load_time = load_time;
            page
        }
        Err(CrawlError::NonEnglish) | Err(CrawlError::TitleFiltered { .. }) => {
            ctx.stats.record_filtered();
            ctx.filter.mark(url);
            return;
        }
        Err(e) => {
            tracing::debug!("Extraction failed for {}: {}", full_url, e);
            ctx.filter.mark(url);
            return;
        }
    };

    let enqueued = feed_back_links(ctx, &page);
    ctx.stats.record_links_enqueued(enqueued);

    ctx.filter.mark(url);
    if let Some(sink) = &ctx.sink {
        sink.write(&page);
    }
    ctx.stats.record_page();

    tracing::debug!(
        "Crawled {} in {:?} ({} internal, {} external, {} fed back)",
        full_url,
        load_time,
        page.internal_links.len(),
        page.external_links.len(),
        enqueued
    );
}

/// Per-page link budget, shrinking as the frontier fills.
pub(crate) fn enqueue_limit(usage: f64) -> usize {
    let remaining = 100i64 - (usage * 100.0).floor() as i64;
    remaining.clamp(MIN_ENQUEUE_PER_PAGE as i64, MAX_ENQUEUE_PER_PAGE as i64) as usize
}

// Feeds newly discovered links back into the frontier, alternating between
// internal and external cursors so one high-fanout page cannot flood the
// queue with a single host. Pages on .org/.edu/.ac.uk domains get a doubled
// budget and a doubled per-domain cap.
fn feed_back_links(ctx: &CrawlContext, page: &PageData) -> u64 {
    let source_domain = match domain_of_str(&page.url) {
        Ok(domain) => domain,
        Err(_) => return 0,
    };

    let mut limit = enqueue_limit(ctx.frontier.usage());
    let mut cap = ctx.domain_visit_cap;
    if has_generous_tld(&source_domain) {
        limit *= 2;
        cap = cap.saturating_mul(2);
    }

    let internals = &page.internal_links;
    let externals = &page.external_links;
    let mut internal_cursor = 0;
    let mut external_cursor = 0;
    let mut enqueued: u64 = 0;

    'feedback: while (enqueued as usize) < limit
        && (internal_cursor < internals.len() || external_cursor < externals.len())
    {
        // Internal side: every internal link counts against the source domain.
        while internal_cursor < internals.len() {
            if !ctx.visits.under_cap(&source_domain, cap) {
                internal_cursor = internals.len();
                break;
            }
            let candidate = &internals[internal_cursor];
            internal_cursor += 1;

            if ctx.filter.check_and_mark(candidate) {
                continue;
            }
            match ctx.frontier.insert(candidate.clone()) {
                Ok(()) => {
                    ctx.visits.record(&source_domain);
                    enqueued += 1;
                    break;
                }
                Err(FrontierError::Full(_)) => break 'feedback,
            }
        }

        if (enqueued as usize) >= limit {
            break;
        }

        // External side: each link counts against its own domain.
        while external_cursor < externals.len() {
            let candidate = &externals[external_cursor];
            external_cursor += 1;

            let Ok(domain) = domain_of_str(candidate) else {
                continue;
            };
            if !ctx.visits.under_cap(&domain, cap) {
                continue;
            }
            if ctx.filter.check_and_mark(candidate) {
                continue;
            }
            match ctx.frontier.insert(candidate.clone()) {
                Ok(()) => {
                    ctx.visits.record(&domain);
                    enqueued += 1;
                    break;
                }
                Err(FrontierError::Full(_)) => break 'feedback,
            }
        }
    }

    enqueued
}
