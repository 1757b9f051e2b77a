//! User-agent table
//!
//! Loaded once at startup from a JSON array of `{"userAgent": "..."}`
//! objects; each outgoing request draws one entry uniformly at random.
//! An empty or missing table is a startup fault.

use crate::CrawlError;
use rand::Rng;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct UserAgentEntry {
    #[serde(rename = "userAgent")]
    user_agent: String,
}

/// Pool of user-agent strings rotated across requests.
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    /// Loads the table from disk, rejecting a missing or empty file.
    pub fn load(path: &Path) -> Result<Self, CrawlError> {
        let content = std::fs::read_to_string(path).map_err(|_| CrawlError::NoUserAgents {
            path: path.display().to_string(),
        })?;

        let entries: Vec<UserAgentEntry> = serde_json::from_str(&content).map_err(|e| {
            CrawlError::Config(crate::ConfigError::Validation(format!(
                "user-agent table at {} is not valid JSON: {}",
                path.display(),
                e
            )))
        })?;

        let agents: Vec<String> = entries
            .into_iter()
            .map(|e| e.user_agent)
            .filter(|ua| !ua.is_empty())
            .collect();

        if agents.is_empty() {
            return Err(CrawlError::NoUserAgents {
                path: path.display().to_string(),
            });
        }

        tracing::info!("Loaded {} user agents from {}", agents.len(), path.display());
        Ok(Self { agents })
    }

    /// Builds a pool from in-memory strings. Used by tests and embedders.
    pub fn from_agents(agents: Vec<String>) -> Result<Self, CrawlError> {
        if agents.is_empty() {
            return Err(CrawlError::NoUserAgents {
                path: "<inline>".to_string(),
            });
        }
        Ok(Self { agents })
    }

    /// Picks one entry uniformly at random.
    pub fn random(&self) -> &str {
        let idx = rand::rng().random_range(0..self.agents.len());
        &self.agents[idx]
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_table() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"[
                {"userAgent": "Mozilla/5.0 (X11; Linux x86_64) TestAgent/1.0"},
                {"userAgent": "Mozilla/5.0 (Macintosh) TestAgent/2.0", "platform": "mac"}
            ]"#,
        )
        .unwrap();
        file.flush().unwrap();

        let pool = UserAgentPool::load(file.path()).unwrap();
        assert_eq!(pool.len(), 2);
        assert!(pool.random().starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_missing_file_fails() {
        let result = UserAgentPool::load(Path::new("/no/such/agents.json"));
        assert!(matches!(result, Err(CrawlError::NoUserAgents { .. })));
    }

    #[test]
    fn test_empty_table_fails() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[]").unwrap();
        file.flush().unwrap();

        let result = UserAgentPool::load(file.path());
        assert!(matches!(result, Err(CrawlError::NoUserAgents { .. })));
    }

    #[test]
    fn test_blank_entries_filtered() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"[{"userAgent": ""}, {"userAgent": "Real/1.0"}]"#)
            .unwrap();
        file.flush().unwrap();

        let pool = UserAgentPool::load(file.path()).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.random(), "Real/1.0");
    }

    #[test]
    fn test_random_stays_in_pool() {
        let pool =
            UserAgentPool::from_agents(vec!["A/1".to_string(), "B/2".to_string()]).unwrap();
        for _ in 0..20 {
            let ua = pool.random();
            assert!(ua == "A/1" || ua == "B/2");
        }
    }
}
