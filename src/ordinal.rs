//! Chapter ordinal resolution from noisy titles and URLs.
//!
//! Titles and slugs disagree often enough ("Chapter 12: Homecoming" living
//! at `/chapter-99.html`) that the patterns are ranked: title evidence
//! outranks URL evidence, and a positional fallback closes the chain.

use crate::utils::url_path;
use regex::Regex;
use std::sync::LazyLock;

/// Ordinals at or above this are treated as noise (timestamps, ids).
const ORDINAL_CEILING: u32 = 10_000;

/// Number following a "chapter"/"ch" keyword in a title.
static TITLE_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bch(?:apter)?\.?\s*(\d+)").unwrap());

/// Leading number before a separator, e.g. "12. Homecoming".
static TITLE_LEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*[.:\-–)\]]").unwrap());

/// Number adjacent to a "chapter"/"ch" keyword in a URL path.
static PATH_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ch(?:apter)?[-_./]?(\d+)").unwrap());

/// Any number in a URL path.
static PATH_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());

/// Parses a captured token, rejecting zero and implausibly large values.
fn accept(token: &str) -> Option<u32> {
    let n: u32 = token.parse().ok()?;
    (1..ORDINAL_CEILING).contains(&n).then_some(n)
}

/// Resolves a chapter's ordinal from its title and URL.
///
/// Attempts, in rank order: keyword number in the title, leading number in
/// the title, keyword number in the URL path, last number in the URL path,
/// then `fallback` (the chapter's position in the scan).
pub fn resolve_ordinal(title: &str, url: &str, fallback: u32) -> u32 {
    if let Some(caps) = TITLE_KEYWORD.captures(title)
        && let Some(n) = accept(&caps[1])
    {
        return n;
    }

    if let Some(caps) = TITLE_LEADING.captures(title)
        && let Some(n) = accept(&caps[1])
    {
        return n;
    }

    let path = url_path(url);

    if let Some(caps) = PATH_KEYWORD.captures(&path)
        && let Some(n) = accept(&caps[1])
    {
        return n;
    }

    // Slugs end with the most specific token, so take the last number.
    if let Some(m) = PATH_NUMBER.find_iter(&path).last()
        && let Some(n) = accept(m.as_str())
    {
        return n;
    }

    fallback.max(1)
}
