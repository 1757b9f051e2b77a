//! Strider: a polite, continuous, breadth-first web crawler
//!
//! This crate crawls outward from a seed list of popular hosts, feeding the
//! links it discovers back into its own bounded frontier. Per-domain
//! politeness (robots.txt rules and crawl-delay) is enforced on every fetch,
//! and a persistent Bloom filter keeps the crawler from revisiting pages
//! across restarts.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod frontier;
pub mod output;
pub mod politeness;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Response body for {url} is not valid UTF-8")]
    BodyNotUtf8 { url: String },

    #[error("HTML parsing exceeded {seconds}s")]
    ParseTimeout { seconds: u64 },

    #[error("Page content is not English")]
    NonEnglish,

    #[error("Title contains filtered term {term:?}")]
    TitleFiltered { term: String },

    #[error("Extraction failed: {0}")]
    Extract(String),

    #[error("Dedup filter snapshot at {path} could not be read: {reason}")]
    FilterSnapshot { path: String, reason: String },

    #[error("User-agent table at {path} is missing or empty")]
    NoUserAgents { path: String },

    #[error("Seed file not found at {path}")]
    MissingSeedFile { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Shutdown in progress")]
    Cancelled,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Coordinator;
pub use extract::PageData;
pub use filter::VisitedFilter;
pub use frontier::{Frontier, FrontierError};
pub use politeness::{Permission, PolitenessGate};
pub use url::{domain_of, ensure_scheme};
