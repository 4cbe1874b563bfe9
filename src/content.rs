//! Chapter content extraction and markup-to-text normalization.
//!
//! Content extraction never fails outright: a fetch error or a cascade
//! with no sufficiently long candidate produces a sentinel result with
//! `valid` unset, and the caller decides what to do with it.

use crate::cascade::Page;
use crate::catalog::NovelSource;
use crate::fetch::Fetcher;
use regex::Regex;
use std::sync::LazyLock;

/// Minimum normalized length for a content candidate to count as a chapter.
pub const MIN_CONTENT_CHARS: usize = 100;

/// Sentinel when the chapter page itself could not be retrieved.
const FETCH_FAILED: &str = "Failed to load chapter content";

/// Sentinel when no content selector produced a plausible body.
const NO_CONTENT: &str = "Chapter content could not be loaded";

/// Extracted chapter text plus a validity verdict.
#[derive(Debug, Clone)]
pub struct ChapterContent {
    /// The chapter URL the extraction ran against.
    pub source_url: String,

    /// Normalized plain text, or a sentinel message when invalid.
    pub content: String,

    /// False when no selector yielded content above the length threshold.
    pub valid: bool,
}

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static AD_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div[^>]*class="[^"]*(?:ads|advert)[^"]*"[^>]*>.*?</div>"#).unwrap()
});
static P_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</p\s*>").unwrap());
static P_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<p[^>]*>").unwrap());
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(?:strong|b)[^>]*>(.*?)</(?:strong|b)>").unwrap());
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(?:em|i)[^>]*>(.*?)</(?:em|i)>").unwrap());
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]+\n").unwrap());
static EXTRA_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Converts chapter markup into clean, paragraph-preserving text.
///
/// Works on the markup rather than pre-extracted text so paragraph
/// boundaries survive. Bold and italic runs become `**text**` and
/// `*text*`. The output is stable under re-application.
pub fn normalize_markup(markup: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(markup, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = AD_BLOCK.replace_all(&text, "");

    let text = P_CLOSE.replace_all(&text, "\n\n");
    let text = P_OPEN.replace_all(&text, "");
    let text = LINE_BREAK.replace_all(&text, "\n");

    let text = BOLD.replace_all(&text, "**$1**");
    let text = ITALIC.replace_all(&text, "*$1*");
    let text = ANY_TAG.replace_all(&text, "");

    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let text = BLANK_LINE.replace_all(&text, "\n\n");
    let text = EXTRA_NEWLINES.replace_all(&text, "\n\n");

    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl<F: Fetcher> NovelSource<F> {
    /// Fetches one chapter and extracts its normalized plain text.
    ///
    /// Runs the content-selector cascade over the page and accepts the
    /// first candidate whose normalized text exceeds
    /// [`MIN_CONTENT_CHARS`]. Never returns an error: retrieval or
    /// extraction failure yields `valid == false` with a sentinel message.
    pub async fn extract_chapter_content(&self, chapter_url: &str) -> ChapterContent {
        let markup = match self.fetcher().retrieve(chapter_url).await {
            Ok(markup) => markup,
            Err(e) => {
                self.console()
                    .warning(&format!("Chapter {} unavailable: {}", chapter_url, e));
                return ChapterContent {
                    source_url: chapter_url.to_string(),
                    content: FETCH_FAILED.to_string(),
                    valid: false,
                };
            }
        };

        let page = Page::parse(&markup);

        for expr in &self.profile().content_selectors {
            let Some(node) = page.query(expr).into_iter().next() else {
                continue;
            };

            let candidate = if node.inner_html.trim().is_empty() {
                node.text.clone()
            } else {
                node.inner_html.clone()
            };

            let text = normalize_markup(&candidate);
            if text.chars().count() > MIN_CONTENT_CHARS {
                if self.debug() {
                    self.console().info(&format!(
                        "Extracted {} characters via '{}'",
                        text.chars().count(),
                        expr
                    ));
                }
                return ChapterContent {
                    source_url: chapter_url.to_string(),
                    content: text,
                    valid: true,
                };
            }
        }

        ChapterContent {
            source_url: chapter_url.to_string(),
            content: NO_CONTENT.to_string(),
            valid: false,
        }
    }
}
