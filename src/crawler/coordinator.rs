//! Crawl coordinator: lifecycle root for the whole engine
//!
//! The coordinator owns startup and shutdown. It builds the shared pieces
//! (filter, frontier, politeness gate, transport, sink), spawns the reader
//! and consumer fleets, then runs the seed loop itself: stream the seed
//! file into the ingress channel, pass after pass, throttled by how full
//! the frontier is. Cancelling the root token unwinds everything — the
//! seed loop stops, the ingress sender drops, workers drain out, the
//! filter is flushed, and final statistics are logged.

use crate::config::Config;
use crate::crawler::consumer::run_consumer;
use crate::crawler::reader::run_reader;
use crate::crawler::CrawlContext;
use crate::fetch::{Transport, UserAgentPool};
use crate::filter::VisitedFilter;
use crate::frontier::Frontier;
use crate::output::{CrawlStats, PageSink};
use crate::politeness::PolitenessGate;
use crate::state::{DomainVisits, ProgressTracker};
use crate::CrawlError;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Drives a complete crawler run.
pub struct Coordinator {
    config: Config,
}

impl Coordinator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the crawl until the shutdown token is cancelled.
    ///
    /// # Errors
    ///
    /// Fails fast on startup faults only: a missing seed file, a missing or
    /// empty user-agent table, or an unreadable dedup filter snapshot.
    /// Everything after startup is best-effort.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), CrawlError> {
        let config = self.config;

        if !config.paths.seed_file.exists() {
            return Err(CrawlError::MissingSeedFile {
                path: config.paths.seed_file.display().to_string(),
            });
        }

        let agents = UserAgentPool::load(&config.paths.user_agents)?;
        let transport = Arc::new(Transport::new(agents)?);
        let filter = Arc::new(VisitedFilter::open(
            &config.filter.snapshot_path,
            config.filter.capacity,
            config.filter.false_positive_rate,
            config.filter.save_every,
        )?);
        let frontier = Arc::new(Frontier::new(config.crawl.frontier_capacity));
        let gate = Arc::new(PolitenessGate::new(
            Arc::clone(&transport),
            config.crawl.crawler_name.clone(),
            shutdown.clone(),
        ));
        let sink = match &config.paths.page_log {
            Some(path) => Some(Arc::new(PageSink::open(path)?)),
            None => None,
        };

        let ctx = Arc::new(CrawlContext {
            frontier,
            filter,
            visits: Arc::new(DomainVisits::new()),
            gate,
            transport,
            progress: Arc::new(ProgressTracker::load(&config.paths.progress_file)),
            stats: Arc::new(CrawlStats::new()),
            sink,
            domain_visit_cap: config.crawl.domain_visit_cap,
            shutdown: shutdown.clone(),
        });

        let (ingress_tx, ingress_rx) = mpsc::channel::<String>(config.crawl.ingress_capacity);
        let ingress_rx = Arc::new(Mutex::new(ingress_rx));

        let mut workers = JoinSet::new();
        for id in 0..config.crawl.reader_workers {
            workers.spawn(run_reader(id, Arc::clone(&ctx), Arc::clone(&ingress_rx)));
        }
        for id in 0..config.crawl.consumer_workers {
            workers.spawn(run_consumer(id, Arc::clone(&ctx)));
        }
        tracing::info!(
            "Crawl started: {} readers, {} consumers, frontier capacity {}",
            config.crawl.reader_workers,
            config.crawl.consumer_workers,
            ctx.frontier.capacity()
        );

        seed_loop(&config, &ctx, ingress_tx).await;

        // The seeder only returns once shutdown is under way; cancelling
        // again is a no-op that also covers its abnormal exit paths.
        shutdown.cancel();

        tracing::info!("Seeding stopped, waiting for workers");
        while workers.join_next().await.is_some() {}

        if let Err(e) = ctx.filter.flush() {
            tracing::warn!("Failed to flush dedup filter: {}", e);
        }
        ctx.progress.save();
        ctx.stats.log_summary();
        tracing::info!("Robots cache held {} domains", ctx.gate.cached_domains());

        Ok(())
    }
}

// Streams the seed file into the ingress channel, pass after pass, until
// shutdown. The file is opened fresh each pass and the persisted line
// count is skipped first, so a restarted crawler resumes mid-list. The
// sender is consumed here: when this returns it drops, closing the channel
// and releasing the readers.
async fn seed_loop(config: &Config, ctx: &CrawlContext, ingress: mpsc::Sender<String>) {
    let max_throttle = Duration::from_secs(config.crawl.max_seed_throttle_secs);

    'pass: while !ctx.shutdown.is_cancelled() {
        let file = match tokio::fs::File::open(&config.paths.seed_file).await {
            Ok(file) => file,
            Err(e) => {
                tracing::error!(
                    "Failed to open seed file {}: {}",
                    config.paths.seed_file.display(),
                    e
                );
                tokio::select! {
                    _ = ctx.shutdown.cancelled() => break 'pass,
                    _ = tokio::time::sleep(Duration::from_secs(1)) => continue 'pass,
                }
            }
        };
        let mut lines = BufReader::new(file).lines();

        // Skip lines already consumed in a previous run.
        let skip = ctx.progress.current();
        let mut skipped = 0u64;
        while skipped < skip {
            match lines.next_line().await {
                Ok(Some(_)) => skipped += 1,
                Ok(None) => {
                    // The counter outlived the file; start the list over.
                    tracing::warn!(
                        "Seed file ended after {} lines while skipping to {}",
                        skipped,
                        skip
                    );
                    ctx.progress.reset();
                    continue 'pass;
                }
                Err(e) => {
                    tracing::error!("Error skipping seed lines: {}", e);
                    ctx.progress.reset();
                    continue 'pass;
                }
            }
        }
        if skip > 0 {
            tracing::info!("Skipped {} previously consumed seed lines", skip);
        }

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Error reading seed file: {}", e);
                    break;
                }
            };
            let host = line.trim();
            if host.is_empty() {
                continue;
            }

            // Adaptive throttle: the fuller the frontier, the longer the
            // pause before the next seed, so seeding never outruns the
            // consumers by more than the queue bound.
            let pause = max_throttle.mul_f64(ctx.frontier.usage());
            if !pause.is_zero() {
                tokio::select! {
                    _ = ctx.shutdown.cancelled() => break 'pass,
                    _ = tokio::time::sleep(pause) => {}
                }
            }

            tokio::select! {
                _ = ctx.shutdown.cancelled() => break 'pass,
                sent = ingress.send(host.to_string()) => {
                    if sent.is_err() {
                        tracing::warn!("Ingress channel closed, stopping seeder");
                        break 'pass;
                    }
                }
            }
        }

        ctx.progress.reset();
        tracing::info!("Seed pass complete, restarting from the top of the list");
    }
}
