use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_inspector::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when `candidate` lives on the same host and effective port as `origin`
///
/// The scheme only matters through its default port, so `http://a` and
/// `https://a` are different sites while `https://a` and `https://a:443` are not.
pub fn is_same_host(origin: &Url, candidate: &Url) -> bool {
    match (extract_domain(origin), extract_domain(candidate)) {
        (Some(a), Some(b)) => {
            a == b && origin.port_or_known_default() == candidate.port_or_known_default()
        }
        _ => false,
    }
}
