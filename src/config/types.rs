use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Strider
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Name used for robots.txt group matching and log identification
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Number of reader workers draining the seed ingress channel
    #[serde(rename = "reader-workers", default = "default_reader_workers")]
    pub reader_workers: usize,

    /// Number of consumer workers draining the frontier
    #[serde(rename = "consumer-workers", default = "default_consumer_workers")]
    pub consumer_workers: usize,

    /// Capacity of the bounded frontier queue
    #[serde(rename = "frontier-capacity", default = "default_frontier_capacity")]
    pub frontier_capacity: usize,

    /// Capacity of the seed ingress channel
    #[serde(rename = "ingress-capacity", default = "default_ingress_capacity")]
    pub ingress_capacity: usize,

    /// Maximum URLs enqueued per domain within one run
    #[serde(rename = "domain-visit-cap", default = "default_domain_visit_cap")]
    pub domain_visit_cap: u32,

    /// Upper bound for the adaptive sleep before each seed push (seconds)
    #[serde(rename = "max-seed-throttle-secs", default = "default_max_seed_throttle")]
    pub max_seed_throttle_secs: u64,
}

/// Dedup filter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Target number of URLs the filter is sized for
    #[serde(default = "default_filter_capacity")]
    pub capacity: usize,

    /// Acceptable false-positive rate at the target capacity
    #[serde(rename = "false-positive-rate", default = "default_fp_rate")]
    pub false_positive_rate: f64,

    /// Snapshot the filter to disk after this many marks
    #[serde(rename = "save-every", default = "default_save_every")]
    pub save_every: u32,

    /// Where the filter snapshot lives
    #[serde(rename = "snapshot-path", default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

/// File locations
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Seed list: one host per line, most popular first
    #[serde(rename = "seed-file", default = "default_seed_file")]
    pub seed_file: PathBuf,

    /// Resume counter: the seed-file line to continue from
    #[serde(rename = "progress-file", default = "default_progress_file")]
    pub progress_file: PathBuf,

    /// JSON table of user-agent strings rotated across requests
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: PathBuf,

    /// Optional JSON-lines output of crawled pages; absent disables the sink
    #[serde(rename = "page-log", default)]
    pub page_log: Option<PathBuf>,
}

fn default_crawler_name() -> String {
    "strider".to_string()
}

fn default_reader_workers() -> usize {
    3
}

fn default_consumer_workers() -> usize {
    12
}

fn default_frontier_capacity() -> usize {
    2048
}

fn default_ingress_capacity() -> usize {
    100
}

fn default_domain_visit_cap() -> u32 {
    40
}

fn default_max_seed_throttle() -> u64 {
    30
}

fn default_filter_capacity() -> usize {
    10_000_000
}

fn default_fp_rate() -> f64 {
    0.01
}

fn default_save_every() -> u32 {
    1000
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/visited.bloom")
}

fn default_seed_file() -> PathBuf {
    PathBuf::from("data/seeds.txt")
}

fn default_progress_file() -> PathBuf {
    PathBuf::from("data/progress.txt")
}

fn default_user_agents() -> PathBuf {
    PathBuf::from("data/user_agents.json")
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            reader_workers: default_reader_workers(),
            consumer_workers: default_consumer_workers(),
            frontier_capacity: default_frontier_capacity(),
            ingress_capacity: default_ingress_capacity(),
            domain_visit_cap: default_domain_visit_cap(),
            max_seed_throttle_secs: default_max_seed_throttle(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            capacity: default_filter_capacity(),
            false_positive_rate: default_fp_rate(),
            save_every: default_save_every(),
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            seed_file: default_seed_file(),
            progress_file: default_progress_file(),
            user_agents: default_user_agents(),
            page_log: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawl: CrawlConfig::default(),
            filter: FilterConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}
