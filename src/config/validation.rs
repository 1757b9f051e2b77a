use crate::config::types::{Config, CrawlConfig, FilterConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_filter_config(&config.filter)?;
    Ok(())
}

fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.reader_workers < 1 {
        return Err(ConfigError::Validation(
            "reader-workers must be >= 1".to_string(),
        ));
    }

    if config.consumer_workers < 1 {
        return Err(ConfigError::Validation(
            "consumer-workers must be >= 1".to_string(),
        ));
    }

    if config.frontier_capacity < 2 {
        return Err(ConfigError::Validation(format!(
            "frontier-capacity must be >= 2, got {}",
            config.frontier_capacity
        )));
    }

    if config.ingress_capacity < 1 {
        return Err(ConfigError::Validation(
            "ingress-capacity must be >= 1".to_string(),
        ));
    }

    if config.domain_visit_cap < 1 {
        return Err(ConfigError::Validation(
            "domain-visit-cap must be >= 1".to_string(),
        ));
    }

    // The adaptive seed throttle is only meaningful within this band: below
    // it readers outrun consumers, above it a full queue stalls seeding for
    // minutes at a time.
    if !(5..=100).contains(&config.max_seed_throttle_secs) {
        return Err(ConfigError::Validation(format!(
            "max-seed-throttle-secs must be between 5 and 100, got {}",
            config.max_seed_throttle_secs
        )));
    }

    Ok(())
}

fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.capacity < 1 {
        return Err(ConfigError::Validation(
            "filter capacity must be >= 1".to_string(),
        ));
    }

    if config.false_positive_rate <= 0.0 || config.false_positive_rate >= 1.0 {
        return Err(ConfigError::Validation(format!(
            "false-positive-rate must be in (0, 1), got {}",
            config.false_positive_rate
        )));
    }

    if config.save_every < 1 {
        return Err(ConfigError::Validation(
            "save-every must be >= 1".to_string(),
        ));
    }

    Ok(())
}
