//! Index-page count detection.
//!
//! Sites advertise their page count three different ways, none reliably:
//! a "last page" link with the number in its target, a row of numbered
//! page links, or a free-text "Page 1 of 57" legend. All three are probed
//! and their maxima merged, then clamped so a broken site cannot schedule
//! unbounded work.

use crate::cascade::Page;
use crate::console::Console;
use crate::profile::SourceProfile;
use regex::Regex;
use std::sync::LazyLock;

/// Hard ceiling on the number of index pages one scan will walk.
pub const MAX_INDEX_PAGES: u32 = 200;

/// Numbered page links above this are treated as noise, not page counts.
const NUMERIC_TEXT_CEILING: u32 = 500;

/// Page numbers encoded in pagination-link targets.
static PAGE_IN_HREF: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"[?&]page=(\d+)").unwrap(),
        Regex::new(r"[?&]p=(\d+)").unwrap(),
        Regex::new(r"/page[-/](\d+)").unwrap(),
    ]
});

/// Free-text "page N of M" phrasing.
static PAGE_OF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)page\s+\d+\s+of\s+(\d+)").unwrap());

/// Determines the total number of index pages from the first page's markup.
///
/// Returns 1 when no pagination evidence exists; warns and clamps to
/// [`MAX_INDEX_PAGES`] when a site declares an implausible count.
pub fn detect_total_pages(page: &Page, profile: &SourceProfile, console: &Console) -> u32 {
    let mut total: u32 = 1;

    for expr in &profile.pagination_selectors {
        for node in page.query(expr) {
            // Method 1: page number encoded in the link target.
            if let Some(href) = node.first_attr(&["href", "data-page", "data-href"]) {
                for re in PAGE_IN_HREF.iter() {
                    if let Some(caps) = re.captures(href)
                        && let Ok(n) = caps[1].parse::<u32>()
                    {
                        total = total.max(n);
                    }
                }
            }

            // Method 2: purely numeric link text.
            let text = node.text.trim();
            if !text.is_empty()
                && text.chars().all(|c| c.is_ascii_digit())
                && let Ok(n) = text.parse::<u32>()
                && (1..NUMERIC_TEXT_CEILING).contains(&n)
            {
                total = total.max(n);
            }
        }
    }

    // Method 3: "page N of M" free text anywhere on the page.
    if let Some(caps) = PAGE_OF.captures(&page.text())
        && let Ok(n) = caps[1].parse::<u32>()
    {
        total = total.max(n);
    }

    if total > MAX_INDEX_PAGES {
        console.warning(&format!(
            "Pagination declares {} pages; clamping to {}",
            total, MAX_INDEX_PAGES
        ));
        total = MAX_INDEX_PAGES;
    }

    total
}
