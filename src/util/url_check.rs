use thiserror::Error;
use url::Url;

/// Errors returned when a link cannot be handed to the system browser.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
}

/// Extract the domain key for a URL: the lowercase hostname with a single
/// leading `www.` removed.
///
/// Returns `None` for unparsable URLs and for URLs without a host
/// (`mailto:`, `data:` and similar).
///
/// ```
/// use sitenav::util::domain_key;
///
/// assert_eq!(domain_key("https://WWW.Baidu.com/s?wd=1").as_deref(), Some("baidu.com"));
/// assert_eq!(domain_key("https://v.qq.com").as_deref(), Some("v.qq.com"));
/// assert_eq!(domain_key("not a url"), None);
/// ```
pub fn domain_key(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    if host.is_empty() {
        return None;
    }
    // The url crate already lowercases registered domains; IP literals and
    // opaque hosts are lowercased here for a stable cache key.
    let host = host.to_ascii_lowercase();
    Some(match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => host,
    })
}

/// Validate a link before launching it in the system browser.
///
/// Bookmarks legitimately point at intranet hosts and localhost, so only the
/// scheme and presence of a host are checked here. `javascript:`, `file:`
/// and similar schemes are refused.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_domain_key_strips_leading_www_only() {
        assert_eq!(
            domain_key("https://www.bilibili.com/video").as_deref(),
            Some("bilibili.com")
        );
        assert_eq!(
            domain_key("https://news.www.example.com").as_deref(),
            Some("news.www.example.com")
        );
    }

    #[test]
    fn test_domain_key_lowercases() {
        assert_eq!(domain_key("HTTPS://GitHub.COM").as_deref(), Some("github.com"));
    }

    #[test]
    fn test_domain_key_ignores_port_and_path() {
        assert_eq!(
            domain_key("http://example.com:8080/a/b?c=d#e").as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn test_domain_key_rejects_unparsable_and_hostless() {
        assert_eq!(domain_key(""), None);
        assert_eq!(domain_key("baidu.com"), None);
        assert_eq!(domain_key("mailto:someone@example.com"), None);
    }

    #[test]
    fn test_open_accepts_http_and_https() {
        assert!(validate_url_for_open("https://github.com").is_ok());
        assert!(validate_url_for_open("http://192.168.1.1:8080/router").is_ok());
        assert!(validate_url_for_open("http://localhost:3000").is_ok());
    }

    #[test]
    fn test_open_rejects_other_schemes() {
        assert!(matches!(
            validate_url_for_open("javascript:alert(1)"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            validate_url_for_open("file:///etc/passwd"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            validate_url_for_open("no scheme"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_www_prefix_shares_domain_key(label in "[a-z][a-z0-9]{0,12}", tld in "(com|cn|org|net)") {
            let bare = format!("https://{label}.{tld}/");
            let www = format!("https://www.{label}.{tld}/some/path");
            prop_assert_eq!(domain_key(&bare), domain_key(&www));
        }

        #[test]
        fn prop_domain_key_is_lowercase(host in "[A-Za-z]{1,10}\\.[A-Za-z]{2,3}") {
            let key = domain_key(&format!("http://{host}"));
            prop_assert!(key.is_some());
            let key = key.unwrap();
            prop_assert_eq!(key.clone(), key.to_lowercase());
        }
    }
}
