//! URL helpers: scheme completion, domain normalisation, TLD checks
//!
//! Seed lines are bare host names; everything in the pipeline that keys
//! per-host state (politeness, visit counting) uses the normalised domain
//! produced here: lowercase host with any leading `www.` stripped.

use crate::UrlError;
use url::Url;

/// Top-level domains whose pages get a doubled link-feedback budget.
const GENEROUS_TLDS: &[&str] = &[".org", ".edu", ".ac.uk"];

/// Prepends `https://` when the input carries no scheme.
///
/// Seed files list bare hosts (`example.com`), while links extracted from
/// pages are already absolute. Both forms pass through here before parsing.
pub fn ensure_scheme(raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    }
}

/// Parses a URL string, completing the scheme first.
pub fn parse_with_scheme(raw: &str) -> Result<Url, UrlError> {
    Url::parse(&ensure_scheme(raw)).map_err(|e| UrlError::Parse(e.to_string()))
}

/// Extracts the normalised domain from a parsed URL.
///
/// The host is lowercased and a leading `www.` is removed, so
/// `https://WWW.Example.COM/x` and `https://example.com/y` key the same
/// per-domain state.
pub fn domain_of(url: &Url) -> Result<String, UrlError> {
    let host = url.host_str().ok_or(UrlError::MissingHost)?;
    let host = host.to_lowercase();
    Ok(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Convenience wrapper: normalised domain straight from a raw URL string.
pub fn domain_of_str(raw: &str) -> Result<String, UrlError> {
    domain_of(&parse_with_scheme(raw)?)
}

/// Whether a domain ends in a TLD that earns a doubled enqueue budget.
pub fn has_generous_tld(domain: &str) -> bool {
    GENEROUS_TLDS.iter().any(|tld| domain.ends_with(tld))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_scheme_bare_host() {
        assert_eq!(ensure_scheme("example.com"), "https://example.com");
    }

    #[test]
    fn test_ensure_scheme_keeps_existing() {
        assert_eq!(ensure_scheme("http://example.com"), "http://example.com");
        assert_eq!(ensure_scheme("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_domain_strips_www() {
        assert_eq!(
            domain_of_str("https://www.example.com/page").unwrap(),
            "example.com"
        );
    }

    #[test]
    fn test_domain_lowercases() {
        assert_eq!(
            domain_of_str("https://WWW.Example.COM/").unwrap(),
            "example.com"
        );
    }

    #[test]
    fn test_domain_keeps_subdomains() {
        assert_eq!(
            domain_of_str("https://blog.example.com/post").unwrap(),
            "blog.example.com"
        );
    }

    #[test]
    fn test_domain_from_bare_host() {
        assert_eq!(domain_of_str("example.com").unwrap(), "example.com");
    }

    #[test]
    fn test_domain_ignores_port() {
        assert_eq!(
            domain_of_str("http://127.0.0.1:8080/robots.txt").unwrap(),
            "127.0.0.1"
        );
    }

    #[test]
    fn test_generous_tlds() {
        assert!(has_generous_tld("wikipedia.org"));
        assert!(has_generous_tld("mit.edu"));
        assert!(has_generous_tld("cam.ac.uk"));
        assert!(!has_generous_tld("example.com"));
        assert!(!has_generous_tld("orgsomething.net"));
    }

    #[test]
    fn test_parse_invalid_url() {
        assert!(parse_with_scheme("http://[::invalid").is_err());
    }
}
