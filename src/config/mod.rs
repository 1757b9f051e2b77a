//! Configuration module for Strider
//!
//! Loads and validates the TOML configuration describing worker counts,
//! queue and filter sizing, politeness identity, and on-disk paths. Every
//! field has a default, so the crawler also runs without a config file.

mod parser;
mod types;
mod validation;

pub use parser::{load_config, load_config_or_default};
pub use types::{Config, CrawlConfig, FilterConfig, PathsConfig};
