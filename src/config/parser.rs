use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the configuration, falling back to defaults when the file is absent
///
/// The crawler runs with built-in defaults when no config file exists;
/// a file that exists but fails to parse or validate is still an error.
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!("No config file at {}, using defaults", path.display());
        let config = Config::default();
        validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(
            r#"
[crawl]
crawler-name = "testbot"
reader-workers = 2
consumer-workers = 4
frontier-capacity = 64
domain-visit-cap = 10
max-seed-throttle-secs = 10

[filter]
capacity = 1000
false-positive-rate = 0.05
save-every = 50
snapshot-path = "/tmp/test.bloom"

[paths]
seed-file = "/tmp/seeds.txt"
progress-file = "/tmp/progress.txt"
user-agents = "/tmp/agents.json"
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.crawl.crawler_name, "testbot");
        assert_eq!(config.crawl.reader_workers, 2);
        assert_eq!(config.crawl.consumer_workers, 4);
        assert_eq!(config.crawl.frontier_capacity, 64);
        assert_eq!(config.filter.capacity, 1000);
        assert_eq!(config.filter.save_every, 50);
        assert!(config.paths.page_log.is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let file = create_temp_config(
            r#"
[crawl]
consumer-workers = 2
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.crawl.consumer_workers, 2);
        assert_eq!(config.crawl.reader_workers, 3);
        assert_eq!(config.filter.save_every, 1000);
    }

    #[test]
    fn test_empty_config_is_all_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.crawl.crawler_name, "strider");
        assert_eq!(config.crawl.frontier_capacity, 2048);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let file = create_temp_config("this is [not toml");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = create_temp_config(
            r#"
[crawl]
consumer-workers = 0
"#,
        );
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config =
            load_config_or_default(Path::new("/definitely/not/a/real/config.toml")).unwrap();
        assert_eq!(config.crawl.crawler_name, "strider");
    }
}
