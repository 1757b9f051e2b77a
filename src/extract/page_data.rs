//! The structured record produced for every crawled page.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Everything extracted from one fetched page.
///
/// Link invariants: `internal_links` and `external_links` hold only
/// resolved `http`/`https` URLs, split by whether the resolved host equals
/// the page host; `social_links` is the subset of external links whose
/// host belongs to a fixed set of social networks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageData {
    pub url: String,
    pub canonical_url: String,
    pub title: String,
    pub charset: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub robots_meta: String,
    pub language: String,
    /// Heading texts keyed by tag name (`h1` through `h6`).
    pub headings: HashMap<String, Vec<String>>,
    pub alt_texts: Vec<String>,
    pub anchor_texts: Vec<String>,
    pub internal_links: Vec<String>,
    pub external_links: Vec<String>,
    /// Raw JSON-LD blobs from `<script type="application/ld+json">`.
    pub structured_data: Vec<String>,
    /// `og:*` property map from Open Graph meta tags.
    pub open_graph: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_published: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<DateTime<Utc>>,
    pub social_links: Vec<String>,
    pub visible_text: String,
    #[serde(rename = "load_time_ms", serialize_with = "serialize_millis")]
    pub load_time: Duration,
    pub is_secure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_to_flat_json() {
        let mut page = PageData {
            url: "https://example.com/".to_string(),
            title: "Example".to_string(),
            load_time: Duration::from_millis(250),
            is_secure: true,
            ..Default::default()
        };
        page.internal_links.push("https://example.com/a".to_string());

        let json: serde_json::Value = serde_json::to_value(&page).unwrap();
        assert_eq!(json["url"], "https://example.com/");
        assert_eq!(json["load_time_ms"], 250);
        assert_eq!(json["is_secure"], true);
        assert_eq!(json["internal_links"][0], "https://example.com/a");
        // Absent optional fields stay out of the record entirely.
        assert!(json.get("fetch_error").is_none());
        assert!(json.get("date_published").is_none());
    }
}
