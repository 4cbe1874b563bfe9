//! Chapter-link extraction and cross-page deduplication.
//!
//! Index pages overlap: sites shift chapters across page boundaries while
//! new chapters are being posted, so adjacent pages routinely return a few
//! of the same entries. Every candidate link is filtered through a
//! build-scoped [`DedupState`] before it is accepted.

use crate::cascade::{Page, cascade};
use crate::ordinal::resolve_ordinal;
use crate::profile::SourceProfile;
use crate::utils::{normalize_url, resolve_url};
use std::collections::HashSet;

/// One chapter as listed on an index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRef {
    /// Resolved absolute URL of the chapter.
    pub url: String,

    /// Chapter title as listed, or a synthesized "Chapter N".
    pub title: String,

    /// Ordinal used for catalog ordering.
    pub ordinal: u32,

    /// The href exactly as it appeared in the markup.
    pub slug: String,
}

/// Identity sets for one catalog build.
///
/// Created when a build starts and discarded when it ends; never shared
/// across builds. Mutated only during the sequential per-page merge, so
/// no synchronization is needed.
#[derive(Debug, Default)]
pub struct DedupState {
    seen_urls: HashSet<String>,
    seen_ordinals: HashSet<u32>,
}

impl DedupState {
    /// Creates empty identity sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a chapter if neither its URL nor its ordinal has been seen.
    ///
    /// Returns true when the chapter is new.
    pub fn admit(&mut self, normalized_url: &str, ordinal: u32) -> bool {
        if self.seen_urls.contains(normalized_url) || self.seen_ordinals.contains(&ordinal) {
            return false;
        }

        self.seen_urls.insert(normalized_url.to_string());
        self.seen_ordinals.insert(ordinal);
        true
    }

    /// Number of chapters accepted so far.
    pub fn len(&self) -> usize {
        self.seen_urls.len()
    }

    /// Returns true if nothing has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.seen_urls.is_empty()
    }
}

/// Extracts the new chapter references from one index page.
///
/// Candidates already present in `dedup` are dropped, and `dedup` is
/// updated as each candidate is accepted, so duplicates within the same
/// page are dropped too. `fallback_base` is the number of chapters
/// accepted before this page; it offsets positional ordinals so pages
/// merged later cannot collide with earlier ones.
pub fn extract_chapter_links(
    page: &Page,
    profile: &SourceProfile,
    dedup: &mut DedupState,
    fallback_base: u32,
) -> Vec<ChapterRef> {
    let nodes = cascade(page, &profile.chapter_selectors, profile.chapter_count_range);

    let mut chapters = Vec::new();
    for (idx, node) in nodes.iter().enumerate() {
        let position = fallback_base + idx as u32 + 1;

        let Some(href) = node.first_attr(&["href", "data-href", "data-url"]) else {
            continue;
        };
        let Some(url) = resolve_url(&profile.base_url, href) else {
            continue;
        };

        let title = if node.text.is_empty() {
            format!("Chapter {}", position)
        } else {
            node.text.clone()
        };

        let ordinal = resolve_ordinal(&title, &url, position);

        if dedup.admit(&normalize_url(&url), ordinal) {
            chapters.push(ChapterRef {
                url,
                title,
                ordinal,
                slug: href.to_string(),
            });
        }
    }

    chapters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> SourceProfile {
        SourceProfile::new("https://example.com")
    }

    fn index_page(links: &[(&str, &str)]) -> Page {
        let items: String = links
            .iter()
            .map(|(href, title)| format!(r#"<div class="row"><a href="{}">{}</a></div>"#, href, title))
            .collect();
        Page::parse(&format!(r#"<div class="chapter-list">{}</div>"#, items))
    }

    #[test]
    fn test_extracts_links_in_document_order() {
        let page = index_page(&[
            ("/n/chapter-1", "Chapter 1"),
            ("/n/chapter-2", "Chapter 2"),
        ]);
        let mut dedup = DedupState::new();
        let chapters = extract_chapter_links(&page, &profile(), &mut dedup, 0);

        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].url, "https://example.com/n/chapter-1");
        assert_eq!(chapters[0].ordinal, 1);
        assert_eq!(chapters[0].slug, "/n/chapter-1");
        assert_eq!(chapters[1].ordinal, 2);
    }

    #[test]
    fn test_duplicates_within_page_dropped() {
        let page = index_page(&[
            ("/n/chapter-1", "Chapter 1"),
            ("/n/CHAPTER-1", "Chapter 1"),
        ]);
        let mut dedup = DedupState::new();
        let chapters = extract_chapter_links(&page, &profile(), &mut dedup, 0);
        assert_eq!(chapters.len(), 1);
    }

    #[test]
    fn test_previously_seen_urls_dropped() {
        let mut dedup = DedupState::new();

        let first = index_page(&[("/n/chapter-3", "Chapter 3")]);
        assert_eq!(extract_chapter_links(&first, &profile(), &mut dedup, 0).len(), 1);

        let second = index_page(&[
            ("/n/chapter-3", "Chapter 3"),
            ("/n/chapter-4", "Chapter 4"),
        ]);
        let chapters = extract_chapter_links(&second, &profile(), &mut dedup, 1);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].ordinal, 4);
    }

    #[test]
    fn test_missing_href_skipped() {
        let page = Page::parse(
            r#"<div class="chapter-list">
                <div class="row"><a href="/n/chapter-1">Chapter 1</a></div>
                <div class="row"><a>Chapter broken</a></div>
            </div>"#,
        );
        // The anchor without an href never matches a[href*=...], but the
        // container selector catches both; only the resolvable one survives.
        let mut dedup = DedupState::new();
        let chapters = extract_chapter_links(&page, &profile(), &mut dedup, 0);
        assert_eq!(chapters.len(), 1);
    }

    #[test]
    fn test_untitled_link_synthesized() {
        let page = index_page(&[("/n/extra-side-story", "")]);
        let mut dedup = DedupState::new();
        let chapters = extract_chapter_links(&page, &profile(), &mut dedup, 41);
        assert_eq!(chapters[0].title, "Chapter 42");
        assert_eq!(chapters[0].ordinal, 42);
    }

    #[test]
    fn test_protocol_relative_href() {
        let page = index_page(&[("//mirror.example.com/n/chapter-9", "Chapter 9")]);
        let mut dedup = DedupState::new();
        let chapters = extract_chapter_links(&page, &profile(), &mut dedup, 0);
        assert_eq!(chapters[0].url, "https://mirror.example.com/n/chapter-9");
    }
}
