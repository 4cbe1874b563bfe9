//! URL resolution helpers shared by every component that consumes hrefs.

/// Resolves an href against a base URL.
///
/// Handles the three forms index pages produce: fully absolute URLs,
/// protocol-relative `//host/path` URLs, and root-relative or relative
/// paths. Returns `None` when no absolute URL can be produced.
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }

    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }

    let base_url = url::Url::parse(base).ok()?;
    base_url.join(href).ok().map(|u| u.to_string())
}

/// Returns the case-insensitive identity key for a resolved URL.
pub fn normalize_url(url: &str) -> String {
    url.trim().to_ascii_lowercase()
}

/// Returns the path portion of a URL, without query or fragment.
///
/// Falls back to stripping `?`/`#` manually when the URL doesn't parse
/// (relative hrefs, odd schemes).
pub fn url_path(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        return parsed.path().to_string();
    }

    let without_fragment = url.split('#').next().unwrap_or(url);
    without_fragment
        .split('?')
        .next()
        .unwrap_or(without_fragment)
        .to_string()
}
