//! URL resolution for manifest entries and intercepted requests.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse an absolute URL to use as the app scope.
pub fn parse_base(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    normalize(parsed)
}

/// Resolve `input` against the app scope.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Join relative input (`./`, `index.html`, `/a.html`) onto `base`;
///    absolute URLs are kept as they are
/// 3. Only `http` and `https` are accepted
/// 4. Lowercase the host
/// 5. Remove fragment (#...), keep the query string intact
pub fn resolve(base: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let joined = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    normalize(joined)
}

fn normalize(mut parsed: Url) -> Result<Url, UrlError> {
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let lower = host.to_lowercase();
        if lower != host {
            parsed
                .set_host(Some(&lower))
                .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
        }
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        parse_base("https://app.test/coach/").unwrap()
    }

    #[test]
    fn test_resolve_dot_slash() {
        let url = resolve(&base(), "./").unwrap();
        assert_eq!(url.as_str(), "https://app.test/coach/");
    }

    #[test]
    fn test_resolve_relative_file() {
        let url = resolve(&base(), "icons/Logo.png").unwrap();
        assert_eq!(url.as_str(), "https://app.test/coach/icons/Logo.png");
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = resolve(&base(), "/a.html").unwrap();
        assert_eq!(url.as_str(), "https://app.test/a.html");
    }

    #[test]
    fn test_resolve_absolute_keeps_query() {
        let url = resolve(&base(), "https://fonts.googleapis.com/css2?family=Inter:wght@400;500;700&display=swap").unwrap();
        assert_eq!(url.host_str(), Some("fonts.googleapis.com"));
        assert_eq!(url.query(), Some("family=Inter:wght@400;500;700&display=swap"));
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve(&base(), "https://UNPKG.COM/react@18/umd/react.development.js").unwrap();
        assert_eq!(url.host_str(), Some("unpkg.com"));
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve(&base(), "index.html#top").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/coach/index.html");
    }

    #[test]
    fn test_resolve_trim_whitespace() {
        let url = resolve(&base(), "  manifest.json  ").unwrap();
        assert_eq!(url.as_str(), "https://app.test/coach/manifest.json");
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&base(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&base(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&base(), "   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_parse_base_requires_absolute() {
        assert!(matches!(parse_base("coach/"), Err(UrlError::InvalidUrl(_))));
        assert!(matches!(parse_base("ftp://app.test/"), Err(UrlError::UnsupportedScheme(_))));
        assert_eq!(parse_base("HTTP://App.Test").unwrap().as_str(), "http://app.test/");
    }
}
