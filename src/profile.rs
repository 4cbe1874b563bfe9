//! Site selector tables and URL templates.
//!
//! The engine itself is layout-agnostic; everything a concrete site
//! contributes — which containers hold the chapter list, where the content
//! body lives, how index pages are addressed — is data in a
//! [`SourceProfile`]. The defaults cover the common NovelFull-style
//! layouts and serve as a template for site-specific overrides.

/// Selector tables and URL template for one source site.
#[derive(Debug, Clone)]
pub struct SourceProfile {
    /// Base URL used to resolve root-relative hrefs, e.g. `https://site.com`.
    pub base_url: String,

    /// Chapter-link selectors, most specific container first. The trailing
    /// entry is a general href-pattern match that excludes report/edit
    /// links and button-styled anchors.
    pub chapter_selectors: Vec<String>,

    /// Plausible chapter-link count per index page; outside this window the
    /// cascade keeps looking.
    pub chapter_count_range: Option<(usize, usize)>,

    /// Content-container selectors, most specific id/class first.
    pub content_selectors: Vec<String>,

    /// Pagination-control selectors.
    pub pagination_selectors: Vec<String>,

    /// Query parameter addressing index pages (`?page=N`).
    pub page_param: String,
}

impl SourceProfile {
    /// Creates a profile with the default selector tables for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            chapter_selectors: vec![
                ".chapter-list .row a".to_string(),
                "ul.list-chapter li a".to_string(),
                ".list-chapter a".to_string(),
                ".chapter-item a".to_string(),
                "#list-chapter a".to_string(),
                r#"a[href*="chapter"]:not([href*="report"]):not([href*="edit"]):not(.btn)"#
                    .to_string(),
            ],
            chapter_count_range: Some((1, 1000)),
            content_selectors: vec![
                "#chapter-content".to_string(),
                ".chapter-content".to_string(),
                ".chapter-body".to_string(),
                "#content".to_string(),
                ".content".to_string(),
                ".novel-content".to_string(),
            ],
            pagination_selectors: vec![
                ".pagination .last a".to_string(),
                ".paging .last a".to_string(),
                ".pagination a".to_string(),
                ".paging a".to_string(),
                "ul.pager a".to_string(),
            ],
            page_param: "page".to_string(),
        }
    }

    /// Builds the URL of the `page`-th index page for a novel.
    pub fn index_page_url(&self, novel_url: &str, page: u32) -> String {
        let separator = if novel_url.contains('?') { '&' } else { '?' };
        format!("{}{}{}={}", novel_url, separator, self.page_param, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_page_url() {
        let profile = SourceProfile::new("https://example.com");
        assert_eq!(
            profile.index_page_url("https://example.com/novel/abc", 3),
            "https://example.com/novel/abc?page=3"
        );
    }

    #[test]
    fn test_index_page_url_existing_query() {
        let profile = SourceProfile::new("https://example.com");
        assert_eq!(
            profile.index_page_url("https://example.com/novel/abc?sort=asc", 2),
            "https://example.com/novel/abc?sort=asc&page=2"
        );
    }
}
