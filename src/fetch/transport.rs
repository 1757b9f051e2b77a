//! HTTP transport for page and robots.txt fetches
//!
//! A thin wrapper over a pooled `reqwest` client: one GET per fetch with a
//! randomly rotated user-agent, a hard redirect budget with loop rejection,
//! and a streamed body capped at 2 MiB. Only `200 OK` with valid UTF-8 text
//! comes back as a success.

use crate::fetch::agents::UserAgentPool;
use crate::CrawlError;
use reqwest::header::USER_AGENT;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Hard cap on response bodies; larger pages are truncated with a warning.
pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Redirect chains longer than this are refused.
const MAX_REDIRECTS: usize = 3;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_DEADLINE: Duration = Duration::from_secs(30);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(5);
const POOL_MAX_IDLE_PER_HOST: usize = 10;

/// A successfully fetched page body.
pub struct FetchedBody {
    /// The body text, possibly truncated at [`MAX_BODY_SIZE`].
    pub body: String,
    /// Whether the cap was hit.
    pub truncated: bool,
}

/// Shared fetch context: the pooled HTTP client plus the user-agent table.
pub struct Transport {
    client: Client,
    agents: UserAgentPool,
}

impl Transport {
    /// Builds the transport around a freshly configured client.
    pub fn new(agents: UserAgentPool) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_DEADLINE)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .redirect(redirect_policy())
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, agents })
    }

    /// Fetches a page body with a rotating user-agent.
    ///
    /// # Contract
    ///
    /// * Any status other than `200 OK` is refused with a descriptive error.
    /// * The body is streamed and truncated at [`MAX_BODY_SIZE`] (logged).
    /// * Content that is not valid UTF-8 is refused.
    pub async fn fetch(&self, url: &str) -> Result<FetchedBody, CrawlError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.agents.random())
            .send()
            .await
            .map_err(|source| CrawlError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CrawlError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let (bytes, truncated) = read_capped(response, url).await?;

        let body = String::from_utf8(bytes).map_err(|_| CrawlError::BodyNotUtf8 {
            url: url.to_string(),
        })?;

        Ok(FetchedBody { body, truncated })
    }

    /// Fetches a robots.txt file; any failure means "no rules".
    ///
    /// Network errors, non-success statuses, and unreadable bodies all
    /// collapse to `None`, which the politeness gate treats as allow-all.
    pub async fn fetch_robots(&self, robots_url: &str) -> Option<String> {
        let response = match self
            .client
            .get(robots_url)
            .header(USER_AGENT, self.agents.random())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Failed to fetch {}: {}", robots_url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "robots.txt at {} returned status {}",
                robots_url,
                response.status()
            );
            return None;
        }

        match response.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!("Failed to read {}: {}", robots_url, e);
                None
            }
        }
    }
}

fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        let next = attempt.url().clone();
        if attempt.previous().iter().any(|prev| *prev == next) {
            return attempt.error(format!("redirect loop detected at {}", next));
        }
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error(format!("reached maximum of {} redirects", MAX_REDIRECTS));
        }
        attempt.follow()
    })
}

// Streams the body into memory, stopping at the size cap.
async fn read_capped(
    mut response: reqwest::Response,
    url: &str,
) -> Result<(Vec<u8>, bool), CrawlError> {
    let mut buf: Vec<u8> = Vec::with_capacity(64 * 1024);
    let mut truncated = false;

    while let Some(chunk) = response.chunk().await.map_err(|source| CrawlError::Http {
        url: url.to_string(),
        source,
    })? {
        if buf.len() + chunk.len() >= MAX_BODY_SIZE {
            let take = MAX_BODY_SIZE - buf.len();
            buf.extend_from_slice(&chunk[..take]);
            truncated = true;
            tracing::warn!(
                "Response for {} truncated to {} bytes",
                url,
                MAX_BODY_SIZE
            );
            break;
        }
        buf.extend_from_slice(&chunk);
    }

    Ok((buf, truncated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_transport() -> Transport {
        let agents =
            UserAgentPool::from_agents(vec!["StriderTest/1.0".to_string()]).unwrap();
        Transport::new(agents).unwrap()
    }

    #[test]
    fn test_transport_builds() {
        let transport = test_transport();
        assert_eq!(transport.agents.len(), 1);
    }

    // Network-facing behaviour (status refusal, body cap, redirect loop
    // rejection) is exercised against a mock server in tests/crawl_tests.rs.
}
