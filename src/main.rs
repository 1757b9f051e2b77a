//! Strider main entry point
//!
//! Loads the configuration, installs signal handlers, and hands control to
//! the crawl coordinator. `SIGINT` and `SIGTERM` both trigger a graceful
//! shutdown; only startup faults produce a non-zero exit.

use clap::Parser;
use std::path::PathBuf;
use strider::config::load_config_or_default;
use strider::Coordinator;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Strider: a polite, continuous, breadth-first web crawler
///
/// Strider walks outward from a seed list of popular hosts, respecting
/// robots.txt and crawl-delay on every fetch, and feeds the links it
/// discovers back into its own work queue.
#[derive(Parser, Debug)]
#[command(name = "strider")]
#[command(version)]
#[command(about = "A polite, continuous, breadth-first web crawler", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (defaults apply when absent)
    #[arg(short, long, value_name = "CONFIG", default_value = "strider.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load_config_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    match Coordinator::new(config).run(shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawler failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("strider=info,warn"),
            1 => EnvFilter::new("strider=debug,info"),
            2 => EnvFilter::new("strider=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Cancels the root token on the first SIGINT or SIGTERM.
fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        wait_for_stop_signal().await;
        tracing::info!("Received stop signal, shutting down gracefully");
        shutdown.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_stop_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_stop_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
