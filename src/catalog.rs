//! Catalog building: batched index-page scanning and assembly.
//!
//! Page 1 seeds the scan and fixes the page count; pages 2..=N are fetched
//! in bounded-concurrency batches. Fetches within a batch race freely, but
//! their results are merged in ascending page order, so dedup decisions
//! never depend on which request finished first.

use crate::cascade::Page;
use crate::config::ScrapingConfig;
use crate::console::Console;
use crate::error::ScrapeError;
use crate::extract::{ChapterRef, DedupState, extract_chapter_links};
use crate::fetch::{Fetcher, courtesy_pause};
use crate::pagination::detect_total_pages;
use crate::profile::SourceProfile;
use futures::future::join_all;

/// The deduplicated, ordered chapter list of one novel.
#[derive(Debug, Clone)]
pub struct NovelCatalog {
    /// The novel's canonical URL.
    pub source_url: String,

    /// Number of index pages the scan walked.
    pub total_index_pages: u32,

    /// Chapters sorted by ordinal, ties broken by title.
    pub chapters: Vec<ChapterRef>,
}

/// The reconciliation-and-extraction engine for one source site.
///
/// Holds the retrieval capability, the site's selector tables, and the
/// scan configuration. One instance serves any number of catalog builds;
/// nothing is cached between them.
pub struct NovelSource<F: Fetcher> {
    fetcher: F,
    profile: SourceProfile,
    config: ScrapingConfig,
    console: Console,
}

impl<F: Fetcher> NovelSource<F> {
    /// Creates an engine from a fetcher, a site profile, and scan settings.
    pub fn new(fetcher: F, profile: SourceProfile, config: ScrapingConfig) -> Self {
        Self {
            fetcher,
            profile,
            config,
            console: Console::new(),
        }
    }

    /// Replaces the console used for scan diagnostics.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub(crate) fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub(crate) fn profile(&self) -> &SourceProfile {
        &self.profile
    }

    pub(crate) fn console(&self) -> &Console {
        &self.console
    }

    pub(crate) fn debug(&self) -> bool {
        self.config.debug
    }

    /// Builds the catalog for a novel, fetching the first index page.
    ///
    /// Only this first retrieval is fatal; every later page failure is
    /// tolerated and logged.
    pub async fn build_catalog(&self, novel_url: &str) -> Result<NovelCatalog, ScrapeError> {
        let first_page = self.fetcher.retrieve(novel_url).await.map_err(|e| {
            ScrapeError::FirstPageUnavailable {
                url: novel_url.to_string(),
                message: e.to_string(),
            }
        })?;

        self.build_catalog_from(novel_url, &first_page).await
    }

    /// Builds the catalog for a novel from already-retrieved first-page
    /// markup.
    pub async fn build_catalog_from(
        &self,
        novel_url: &str,
        first_page_markup: &str,
    ) -> Result<NovelCatalog, ScrapeError> {
        let first_page = Page::parse(first_page_markup);
        let total_pages = detect_total_pages(&first_page, &self.profile, &self.console);

        let mut dedup = DedupState::new();
        let mut chapters = extract_chapter_links(&first_page, &self.profile, &mut dedup, 0);

        if self.config.debug {
            self.console.info(&format!(
                "{} found {} chapters",
                self.console.page_summary(1, total_pages),
                chapters.len()
            ));
        }

        if total_pages > 1 {
            self.scan_remaining_pages(novel_url, total_pages, &mut dedup, &mut chapters)
                .await;
        }

        // The single point guaranteeing catalog order: chapters arrive in
        // page-fetch order, not ordinal order.
        chapters.sort_by(|a, b| a.ordinal.cmp(&b.ordinal).then_with(|| a.title.cmp(&b.title)));

        Ok(NovelCatalog {
            source_url: novel_url.to_string(),
            total_index_pages: total_pages,
            chapters,
        })
    }

    /// Fetches pages 2..=total in batches and merges their chapters.
    async fn scan_remaining_pages(
        &self,
        novel_url: &str,
        total_pages: u32,
        dedup: &mut DedupState,
        chapters: &mut Vec<ChapterRef>,
    ) {
        let pending: Vec<u32> = (2..=total_pages).collect();
        let batch_width = self.config.batch_width.max(1);

        for (batch_idx, batch) in pending.chunks(batch_width).enumerate() {
            if batch_idx > 0 {
                courtesy_pause(self.config.delay_between_batches_sec).await;
            }

            let fetches = batch.iter().map(|&page_no| {
                let url = self.profile.index_page_url(novel_url, page_no);
                async move { (page_no, self.fetcher.retrieve(&url).await) }
            });
            let mut results = join_all(fetches).await;

            // Merge in ascending page order regardless of completion order.
            results.sort_by_key(|(page_no, _)| *page_no);

            for (page_no, result) in results {
                let markup = match result {
                    Ok(markup) => markup,
                    Err(e) => {
                        self.console.warning(&format!(
                            "Index page {} of {} unavailable, skipping: {}",
                            page_no, total_pages, e
                        ));
                        continue;
                    }
                };

                let page = Page::parse(&markup);
                let new_chapters =
                    extract_chapter_links(&page, &self.profile, dedup, chapters.len() as u32);

                if self.config.debug {
                    self.console.info(&format!(
                        "{} found {} new chapters",
                        self.console.page_summary(page_no, total_pages),
                        new_chapters.len()
                    ));
                }

                // Zero new chapters means overlap, not end of catalog; the
                // scan continues through every detected page.
                chapters.extend(new_chapters);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// In-memory fetcher: unknown URLs fail like unreachable pages.
    struct StubFetcher {
        pages: HashMap<String, String>,
    }

    impl StubFetcher {
        fn new(pages: &[(&str, String)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, markup)| (url.to_string(), markup.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn retrieve(&self, url: &str) -> Result<String, ScrapeError> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| ScrapeError::ElementNotFound(format!("no page at {}", url)))
        }
    }

    const NOVEL_URL: &str = "https://example.com/novel/abc";

    fn index_markup(total_pages: u32, chapters: &[(u32, &str)]) -> String {
        let pager = if total_pages > 1 {
            format!(
                r#"<ul class="pagination"><li class="last"><a href="{}?page={}">Last</a></li></ul>"#,
                NOVEL_URL, total_pages
            )
        } else {
            String::new()
        };
        let rows: String = chapters
            .iter()
            .map(|(n, title)| {
                format!(
                    r#"<div class="row"><a href="/novel/abc/chapter-{}">{}</a></div>"#,
                    n, title
                )
            })
            .collect();
        format!(
            r#"<html><body><div class="chapter-list">{}</div>{}</body></html>"#,
            rows, pager
        )
    }

    fn engine(fetcher: StubFetcher) -> NovelSource<StubFetcher> {
        NovelSource::new(
            fetcher,
            SourceProfile::new("https://example.com"),
            ScrapingConfig {
                batch_width: 8,
                delay_between_batches_sec: 0.0,
                debug: false,
            },
        )
        .with_console(Console::with_colors(false))
    }

    fn page_url(n: u32) -> String {
        format!("{}?page={}", NOVEL_URL, n)
    }

    #[tokio::test]
    async fn test_single_page_catalog() {
        let fetcher = StubFetcher::new(&[(
            NOVEL_URL,
            index_markup(1, &[(1, "Chapter 1"), (2, "Chapter 2")]),
        )]);
        let catalog = engine(fetcher).build_catalog(NOVEL_URL).await.unwrap();

        assert_eq!(catalog.total_index_pages, 1);
        assert_eq!(catalog.chapters.len(), 2);
        assert_eq!(catalog.source_url, NOVEL_URL);
    }

    #[tokio::test]
    async fn test_overlap_across_pages_deduplicated() {
        // Page 1 lists 1-3; page 2 lists 3-5 (3 overlaps); page 3 is
        // declared by pagination but unreachable.
        let fetcher = StubFetcher::new(&[
            (
                NOVEL_URL,
                index_markup(3, &[(1, "Chapter 1"), (2, "Chapter 2"), (3, "Chapter 3")]),
            ),
            (
                &page_url(2),
                index_markup(3, &[(3, "Chapter 3"), (4, "Chapter 4"), (5, "Chapter 5")]),
            ),
        ]);
        let catalog = engine(fetcher).build_catalog(NOVEL_URL).await.unwrap();

        let ordinals: Vec<u32> = catalog.chapters.iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_other_pages() {
        // Page 3 of 5 is unreachable; everything else survives.
        let fetcher = StubFetcher::new(&[
            (NOVEL_URL, index_markup(5, &[(1, "Chapter 1"), (2, "Chapter 2")])),
            (&page_url(2), index_markup(5, &[(3, "Chapter 3"), (4, "Chapter 4")])),
            (&page_url(4), index_markup(5, &[(7, "Chapter 7"), (8, "Chapter 8")])),
            (&page_url(5), index_markup(5, &[(9, "Chapter 9")])),
        ]);
        let catalog = engine(fetcher).build_catalog(NOVEL_URL).await.unwrap();

        let ordinals: Vec<u32> = catalog.chapters.iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 7, 8, 9]);
    }

    #[tokio::test]
    async fn test_catalog_sorted_by_ordinal_regardless_of_page_order() {
        // Later pages list earlier chapters (descending listing).
        let fetcher = StubFetcher::new(&[
            (NOVEL_URL, index_markup(2, &[(50, "Chapter 50"), (49, "Chapter 49")])),
            (&page_url(2), index_markup(2, &[(2, "Chapter 2"), (1, "Chapter 1")])),
        ]);
        let catalog = engine(fetcher).build_catalog(NOVEL_URL).await.unwrap();

        let ordinals: Vec<u32> = catalog.chapters.iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 49, 50]);
    }

    #[tokio::test]
    async fn test_build_is_idempotent() {
        let page_two = page_url(2);
        let engine = engine(StubFetcher::new(&[
            (NOVEL_URL, index_markup(2, &[(1, "Chapter 1"), (2, "Chapter 2")])),
            (&page_two, index_markup(2, &[(2, "Chapter 2"), (3, "Chapter 3")])),
        ]));

        let first = engine.build_catalog(NOVEL_URL).await.unwrap();
        let second = engine.build_catalog(NOVEL_URL).await.unwrap();
        assert_eq!(first.chapters, second.chapters);
    }

    #[tokio::test]
    async fn test_no_two_chapters_share_a_url() {
        let fetcher = StubFetcher::new(&[
            (NOVEL_URL, index_markup(2, &[(1, "Chapter 1"), (2, "Chapter 2")])),
            (&page_url(2), index_markup(2, &[(2, "Chapter 2"), (3, "Chapter 3")])),
        ]);
        let catalog = engine(fetcher).build_catalog(NOVEL_URL).await.unwrap();

        let mut urls: Vec<String> = catalog
            .chapters
            .iter()
            .map(|c| c.url.to_ascii_lowercase())
            .collect();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), catalog.chapters.len());
    }

    #[tokio::test]
    async fn test_first_page_failure_is_fatal() {
        let fetcher = StubFetcher::new(&[]);
        let err = engine(fetcher).build_catalog(NOVEL_URL).await.unwrap_err();
        assert!(matches!(err, ScrapeError::FirstPageUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_small_batch_width_still_walks_all_pages() {
        let fetcher = StubFetcher::new(&[
            (NOVEL_URL, index_markup(4, &[(1, "Chapter 1")])),
            (&page_url(2), index_markup(4, &[(2, "Chapter 2")])),
            (&page_url(3), index_markup(4, &[(3, "Chapter 3")])),
            (&page_url(4), index_markup(4, &[(4, "Chapter 4")])),
        ]);
        let engine = NovelSource::new(
            fetcher,
            SourceProfile::new("https://example.com"),
            ScrapingConfig {
                batch_width: 1,
                delay_between_batches_sec: 0.0,
                debug: false,
            },
        )
        .with_console(Console::with_colors(false));

        let catalog = engine.build_catalog(NOVEL_URL).await.unwrap();
        assert_eq!(catalog.chapters.len(), 4);
        assert_eq!(catalog.total_index_pages, 4);
    }
}
