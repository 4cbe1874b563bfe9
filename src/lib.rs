//! Bunko - web novel catalog builder and chapter extractor.
//!
//! This library reconstructs a deduplicated, ordered chapter catalog from
//! a source site's paginated index pages and extracts normalized plain
//! text for individual chapters:
//! - Bounded-concurrency scanning of index pages with partial-failure
//!   tolerance
//! - Ranked selector cascades that survive site layout drift
//! - Chapter ordinal resolution from noisy titles and URLs

pub mod cascade;
pub mod catalog;
pub mod config;
pub mod console;
pub mod content;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod ordinal;
pub mod pagination;
pub mod profile;
pub mod utils;

// Re-export commonly used types
pub use cascade::{MatchedNode, Page, cascade};
pub use catalog::{NovelCatalog, NovelSource};
pub use config::Config;
pub use console::Console;
pub use content::{ChapterContent, normalize_markup};
pub use error::{ConfigError, ScrapeError};
pub use extract::{ChapterRef, DedupState};
pub use fetch::{Fetcher, HttpFetcher};
pub use profile::SourceProfile;
