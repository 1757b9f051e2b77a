//! Crawl output: the JSON-lines page sink and run statistics.

mod sink;
mod stats;

pub use sink::PageSink;
pub use stats::CrawlStats;
