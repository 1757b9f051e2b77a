//! HTML extraction: bytes in, [`PageData`] out
//!
//! The extractor is pure: no I/O, no shared state, one record out. Content
//! gating happens here too — non-English pages and pages whose title hits
//! the blocklist are rejected before any link is extracted, so they never
//! feed the frontier.

use crate::extract::page_data::PageData;
use crate::CrawlError;
use chrono::{DateTime, Utc};
use scraper::node::Node;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Parsing longer than this is abandoned and the page dropped.
pub const MAX_PARSE_TIME: Duration = Duration::from_secs(5);

/// Case-insensitive substrings that disqualify a page by its title.
const FILTER_TERMS: [&str; 6] = ["xxx", "porn", "sex", "onlyfans", "gore", "hentai"];

/// External links whose host is one of these count as social links.
const SOCIAL_HOSTS: [&str; 5] = [
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "linkedin.com",
];

/// Runs [`extract`] on the blocking pool under the parse deadline.
///
/// The underlying parse cannot be interrupted once started; on timeout the
/// blocking task is abandoned and the page dropped, mirroring the rest of
/// the per-URL error policy.
pub async fn extract_with_timeout(html: String, base_url: Url) -> Result<PageData, CrawlError> {
    let handle = tokio::task::spawn_blocking(move || extract(&html, &base_url));
    match tokio::time::timeout(MAX_PARSE_TIME, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(CrawlError::Extract(format!(
            "extraction task failed: {}",
            join_err
        ))),
        Err(_) => Err(CrawlError::ParseTimeout {
            seconds: MAX_PARSE_TIME.as_secs(),
        }),
    }
}

/// Parses an HTML document and extracts its metadata and links.
///
/// `base_url` is the URL the document was fetched from; a `<base href>`
/// element, when present, overrides it before any link is resolved.
pub fn extract(html: &str, base_url: &Url) -> Result<PageData, CrawlError> {
    let document = Html::parse_document(html);

    let base = effective_base(&document, base_url);

    let mut page = PageData {
        is_secure: base.scheme() == "https",
        ..Default::default()
    };

    check_language(&document, &mut page)?;
    extract_title(&document, &mut page)?;
    extract_meta(&document, &mut page);
    extract_headings(&document, &mut page);
    extract_alt_texts(&document, &mut page);
    extract_canonical(&document, &base, &mut page);
    extract_anchors(&document, &base, &mut page);
    extract_structured_data(&document, &mut page);
    page.visible_text = visible_text(&document);
    page.social_links = social_subset(&page.external_links);

    Ok(page)
}

// The first <base href> wins, per HTML5.
fn effective_base(document: &Html, base_url: &Url) -> Url {
    if let Ok(selector) = Selector::parse("base[href]") {
        if let Some(element) = document.select(&selector).next() {
            if let Some(href) = element.value().attr("href") {
                if let Ok(resolved) = base_url.join(href) {
                    return resolved;
                }
            }
        }
    }
    base_url.clone()
}

// Absent lang means English; anything whose primary subtag is not "en"
// rejects the page.
fn check_language(document: &Html, page: &mut PageData) -> Result<(), CrawlError> {
    let Ok(selector) = Selector::parse("html") else {
        return Ok(());
    };
    let Some(root) = document.select(&selector).next() else {
        return Ok(());
    };

    match root.value().attr("lang") {
        Some(lang) => {
            page.language = lang.trim().to_string();
            let primary = lang.split('-').next().unwrap_or("").trim().to_lowercase();
            if primary != "en" {
                return Err(CrawlError::NonEnglish);
            }
        }
        None => page.language = "unspecified".to_string(),
    }
    Ok(())
}

fn extract_title(document: &Html, page: &mut PageData) -> Result<(), CrawlError> {
    let Ok(selector) = Selector::parse("title") else {
        return Ok(());
    };
    let Some(element) = document.select(&selector).next() else {
        return Ok(());
    };

    let title = element.text().collect::<String>().trim().to_string();
    if title.is_empty() {
        return Ok(());
    }

    let lowered = title.to_lowercase();
    if let Some(term) = FILTER_TERMS.iter().find(|term| lowered.contains(**term)) {
        return Err(CrawlError::TitleFiltered {
            term: term.to_string(),
        });
    }

    page.title = title;
    Ok(())
}

fn extract_meta(document: &Html, page: &mut PageData) {
    let Ok(selector) = Selector::parse("meta") else {
        return;
    };

    for element in document.select(&selector) {
        let value = element.value();
        let content = value.attr("content").unwrap_or("");
        let property = value.attr("property").unwrap_or("");

        if let Some(charset) = value.attr("charset") {
            page.charset = charset.to_string();
        } else if value
            .attr("http-equiv")
            .is_some_and(|e| e.eq_ignore_ascii_case("content-type"))
        {
            if let Some((_, charset)) = content.split_once("charset=") {
                page.charset = charset.trim().to_string();
            }
        }

        if property.starts_with("og:") && !content.is_empty() {
            page.open_graph
                .insert(property.to_string(), content.to_string());
        }

        match value.attr("name").map(str::to_lowercase).as_deref() {
            Some("description") => page.meta_description = content.to_string(),
            Some("keywords") => page.meta_keywords = content.to_string(),
            Some("robots") => page.robots_meta = content.to_string(),
            _ => {}
        }

        record_timestamp(property, content, page);
    }
}

fn record_timestamp(property: &str, content: &str, page: &mut PageData) {
    if content.is_empty() {
        return;
    }
    match property {
        "article:published_time" | "datepublished" => {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(content) {
                page.date_published = Some(parsed.with_timezone(&Utc));
            }
        }
        "article:modified_time" | "datemodified" => {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(content) {
                page.date_modified = Some(parsed.with_timezone(&Utc));
            }
        }
        _ => {}
    }
}

fn extract_headings(document: &Html, page: &mut PageData) {
    for level in 1..=6u8 {
        let tag = format!("h{}", level);
        let Ok(selector) = Selector::parse(&tag) else {
            continue;
        };
        let texts: Vec<String> = document
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect();
        if !texts.is_empty() {
            page.headings.insert(tag, texts);
        }
    }
}

fn extract_alt_texts(document: &Html, page: &mut PageData) {
    let Ok(selector) = Selector::parse("img[alt]") else {
        return;
    };
    for element in document.select(&selector) {
        if let Some(alt) = element.value().attr("alt") {
            if !alt.is_empty() {
                page.alt_texts.push(alt.to_string());
            }
        }
    }
}

fn extract_canonical(document: &Html, base: &Url, page: &mut PageData) {
    let Ok(selector) = Selector::parse("link[href]") else {
        return;
    };
    for element in document.select(&selector) {
        let rel = element.value().attr("rel").unwrap_or("").to_lowercase();
        if !rel.split_whitespace().any(|r| r == "canonical") {
            continue;
        }
        if let Some(href) = element.value().attr("href") {
            if let Ok(resolved) = base.join(href) {
                page.canonical_url = resolved.to_string();
            }
        }
    }
}

// Resolves every anchor against the effective base, keeps http/https only,
// and splits by host: same host as the page is internal, the rest external.
fn extract_anchors(document: &Html, base: &Url, page: &mut PageData) {
    let Ok(selector) = Selector::parse("a[href]") else {
        return;
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href.trim()) else {
            continue;
        };
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }

        let text = element.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            page.anchor_texts.push(text);
        }

        if same_host(&resolved, base) {
            page.internal_links.push(resolved.to_string());
        } else {
            page.external_links.push(resolved.to_string());
        }
    }
}

fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

fn extract_structured_data(document: &Html, page: &mut PageData) {
    let Ok(selector) = Selector::parse("script") else {
        return;
    };
    for element in document.select(&selector) {
        let is_json_ld = element
            .value()
            .attr("type")
            .is_some_and(|t| t.eq_ignore_ascii_case("application/ld+json"));
        if !is_json_ld {
            continue;
        }
        let content = element.text().collect::<String>();
        let content = content.trim();
        if !content.is_empty() {
            page.structured_data.push(content.to_string());
        }
    }
}

// Concatenates text nodes whose parent is renderable content, then
// collapses all runs of whitespace.
fn visible_text(document: &Html) -> String {
    let mut buffer = String::new();
    for node in document.tree.nodes() {
        if let Node::Text(text) = node.value() {
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|el| {
                    matches!(el.name(), "script" | "style" | "noscript" | "template")
                }))
                .unwrap_or(false);
            if !hidden {
                buffer.push_str(&text.text);
                buffer.push(' ');
            }
        }
    }
    buffer.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn social_subset(external_links: &[String]) -> Vec<String> {
    external_links
        .iter()
        .filter(|link| {
            Url::parse(link)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
                .map(|host| {
                    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
                    SOCIAL_HOSTS.contains(&host.as_str())
                })
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}
