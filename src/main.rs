//! Bunko CLI - web novel catalog builder and chapter extractor.

use anyhow::{Context, Result};
use bunko::catalog::NovelSource;
use bunko::config::Config;
use bunko::console::Console;
use bunko::fetch::HttpFetcher;
use bunko::profile::SourceProfile;
use clap::Parser;
use std::path::PathBuf;

/// Web novel catalog builder and chapter extractor.
#[derive(Parser, Debug)]
#[command(name = "bunko")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the novel's index page.
    novel_url: String,

    /// Extract the content of chapter N (by ordinal).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    chapter: Option<u32>,

    /// Write extracted chapter text to the configured output directory
    /// instead of printing a preview.
    #[arg(long)]
    save: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let console = Console::new();

    console.section("Bunko - Web Novel Catalog Builder");

    console.step("Loading configuration...");
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    console.success("Configuration loaded");

    let base_url = site_origin(&args.novel_url)?;
    let profile = SourceProfile::new(base_url);
    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;
    let source = NovelSource::new(fetcher, profile, config.scraping.clone());

    console.step("Building chapter catalog...");
    let catalog = source
        .build_catalog(&args.novel_url)
        .await
        .context("Failed to build catalog")?;

    console.success(&format!(
        "Found {} chapters across {} index pages",
        console.count(catalog.chapters.len()),
        catalog.total_index_pages
    ));

    if let Some(first) = catalog.chapters.first() {
        console.info(&format!("First: {}", first.title));
    }
    if let Some(last) = catalog.chapters.last() {
        console.info(&format!("Last:  {}", last.title));
    }

    if let Some(ordinal) = args.chapter {
        let chapter = catalog
            .chapters
            .iter()
            .find(|c| c.ordinal == ordinal)
            .ok_or_else(|| anyhow::anyhow!("No chapter with ordinal {} in catalog", ordinal))?;

        console.step(&format!("Extracting chapter {}: {}", ordinal, chapter.title));
        let result = source.extract_chapter_content(&chapter.url).await;

        if !result.valid {
            console.error(&format!("Extraction failed: {}", result.content));
            anyhow::bail!("Could not extract chapter {}", ordinal);
        }

        console.success(&format!(
            "Extracted {} characters",
            console.count(result.content.chars().count())
        ));

        if args.save {
            let path = chapter_path(&config.paths.output_directory, ordinal, &chapter.title);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &result.content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            console.success(&format!("Saved to {}", path.display()));
        } else {
            let preview: String = result.content.chars().take(300).collect();
            console.info(&format!("Preview: {}...", preview));
        }
    }

    console.section("Done!");
    Ok(())
}

/// Returns the scheme+host origin of a novel URL, used to resolve
/// root-relative chapter hrefs.
fn site_origin(novel_url: &str) -> Result<String> {
    let parsed = url::Url::parse(novel_url)
        .with_context(|| format!("Invalid novel URL: {}", novel_url))?;
    Ok(parsed.origin().ascii_serialization())
}

/// Builds an output path like `0042-chapter-title.txt`.
fn chapter_path(output_dir: &std::path::Path, ordinal: u32, title: &str) -> PathBuf {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    output_dir.join(format!("{:04}-{}.txt", ordinal, slug))
}
