// src/main.rs
mod anonymize;
mod extractors;
mod storage;
mod utils;
mod wiki;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use reqwest::Url;

use anonymize::AnthropicRewriter;
use extractors::{NominationExtractor, SectionExtractor, PLOT_LABELS};
use storage::StorageManager;
use utils::AppError;
use wiki::{client, MovieRecord, ScrapeReport, WikiClient};

/// Award nominee scraper: nominations, plots, anonymized plots, merged collection
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape the nominations page and every nominee's plot
    Scrape(ScrapeArgs),
    /// Print the plot extracted from a single page
    Plot(PlotArgs),
    /// Rewrite stored plots without identifying details
    Anonymize(AnonymizeArgs),
    /// Merge stored records and anonymized plots into one collection
    Merge(MergeArgs),
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Base URL used to resolve article links
    #[arg(long, default_value = client::DEFAULT_BASE_URL)]
    base_url: String,

    /// Delay before every request, in milliseconds
    #[arg(long, default_value_t = client::DEFAULT_REQUEST_DELAY_MS)]
    delay_ms: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = client::DEFAULT_USER_AGENT)]
    user_agent: String,
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// Page listing the nominations
    #[arg(long, default_value = client::DEFAULT_SOURCE_URL)]
    source_url: String,

    /// Output directory for per-film records
    #[arg(short, long, default_value = storage::DEFAULT_MOVIES_DIR)]
    output_dir: PathBuf,

    /// Stop after this many nominees (after skipping already scraped ones)
    #[arg(long)]
    limit: Option<usize>,

    /// Debug mode - save the raw and annotated source page
    #[arg(short, long)]
    debug: bool,

    #[command(flatten)]
    fetch: FetchArgs,
}

#[derive(Args, Debug)]
struct PlotArgs {
    /// Film page URL
    url: String,

    #[command(flatten)]
    fetch: FetchArgs,
}

#[derive(Args, Debug)]
struct AnonymizeArgs {
    /// Directory holding per-film records
    #[arg(long, default_value = storage::DEFAULT_MOVIES_DIR)]
    input_dir: PathBuf,

    /// Directory for anonymized plots
    #[arg(short, long, default_value = storage::DEFAULT_ANONYMIZED_DIR)]
    output_dir: PathBuf,

    /// Maximum concurrent rewrite requests
    #[arg(short, long, default_value_t = anonymize::DEFAULT_WORKERS)]
    workers: usize,

    /// Model used for rewriting
    #[arg(long, default_value = anonymize::client::DEFAULT_MODEL)]
    model: String,

    /// API key for the rewrite service
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Directory holding per-film records
    #[arg(long, default_value = storage::DEFAULT_MOVIES_DIR)]
    movies_dir: PathBuf,

    /// Directory holding anonymized plots
    #[arg(long, default_value = storage::DEFAULT_ANONYMIZED_DIR)]
    anonymized_dir: PathBuf,

    /// Output collection file
    #[arg(short, long, default_value = storage::DEFAULT_COLLECTION_FILE)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let cli = Cli::parse();

    match cli.command {
        Command::Scrape(args) => run_scrape(args).await,
        Command::Plot(args) => run_plot(args).await,
        Command::Anonymize(args) => run_anonymize(args).await,
        Command::Merge(args) => run_merge(args),
    }
}

fn build_client(args: &FetchArgs) -> Result<(WikiClient, Url), AppError> {
    let base_url = Url::parse(&args.base_url)
        .map_err(|e| AppError::Config(format!("Invalid base URL '{}': {}", args.base_url, e)))?;
    let client = WikiClient::new(&args.user_agent, Duration::from_millis(args.delay_ms))?;
    Ok((client, base_url))
}

async fn run_scrape(args: ScrapeArgs) -> Result<(), AppError> {
    let (client, base_url) = build_client(&args.fetch)?;
    let storage = StorageManager::new(&args.output_dir, storage::DEFAULT_ANONYMIZED_DIR)?;
    let nomination_extractor = NominationExtractor::new(base_url);
    let section_extractor = SectionExtractor::new();

    // 1. Fetch the nominations page
    tracing::info!("Fetching {}...", args.source_url);
    let page = client.fetch_page(&args.source_url).await?;

    if args.debug {
        let debug_dir = args.output_dir.join("debug");
        std::fs::create_dir_all(&debug_dir)?;
        let raw_path = debug_dir.join("source_page.html");
        std::fs::write(&raw_path, &page)?;
        tracing::info!("Saved raw source page to: {}", raw_path.display());

        let annotated_path = debug_dir.join("source_page_annotated.html");
        if let Err(e) = utils::html_debug::create_debug_html(&page, &annotated_path, &utils::html_debug::debug_patterns()) {
            tracing::warn!("Failed to create debug HTML: {}", e);
        }
    }

    // 2. Extract nominations
    let nominations = {
        let document = scraper::Html::parse_document(&page);
        nomination_extractor.extract_nominations(&document)
    };
    tracing::info!("Found {} movie links", nominations.len());
    if nominations.is_empty() {
        tracing::warn!("No nominations found on {}", args.source_url);
    }

    // 3. Backfill wiki links for existing files
    storage.backfill_wiki_links(&nominations);

    // 4. Process each nominee
    let mut report = ScrapeReport { nominations: nominations.len(), ..Default::default() };
    let total = nominations.len();

    for (i, nomination) in nominations.iter().enumerate() {
        if args.limit.is_some_and(|limit| report.processed + report.no_plot_found.len() >= limit) {
            tracing::info!("Reached limit of {} nominees", report.processed + report.no_plot_found.len());
            break;
        }
        tracing::info!("[{}/{}] Processing: {}", i + 1, total, nomination.title);

        if storage.is_scraped(&nomination.title, nomination.year.as_deref()) {
            tracing::info!("Already scraped, skipping...");
            report.skipped += 1;
            continue;
        }

        let plot = match client.fetch_document(&nomination.url).await {
            Ok(document) => section_extractor
                .extract_first(&document, PLOT_LABELS)
                .map(|(label, text)| {
                    tracing::debug!("Plot taken from '{}' section ({} chars)", label, text.len());
                    text
                }),
            Err(e) => {
                tracing::error!("Error fetching plot from {}: {}", nomination.url, e);
                None
            }
        };

        match plot {
            Some(plot) => {
                match storage.save_movie(&MovieRecord::from_nomination(nomination, plot)) {
                    Ok(_) => report.processed += 1,
                    Err(e) => tracing::error!("Failed to save {}: {}", nomination.title, e),
                }
            }
            None => {
                tracing::warn!("No plot or synopsis section found for {}", nomination.title);
                report.no_plot_found.push(nomination.clone());
            }
        }
    }

    // 5. Report
    report.generated_at = chrono::Utc::now().to_rfc3339();
    let report_path = storage.save_report(&report)?;
    tracing::info!("Done! Processed {} new movies, skipped {} existing movies.", report.processed, report.skipped);

    if report.no_plot_found.is_empty() {
        tracing::info!("All movies had plots!");
    } else {
        tracing::warn!("Could not find plots for {} movies (see {})", report.no_plot_found.len(), report_path.display());
        for movie in &report.no_plot_found {
            tracing::warn!("  - {} ({}) {}", movie.title, movie.year.as_deref().unwrap_or("?"), movie.url);
        }
    }

    Ok(())
}

async fn run_plot(args: PlotArgs) -> Result<(), AppError> {
    let (client, _) = build_client(&args.fetch)?;
    let document = client.fetch_document(&args.url).await?;

    match SectionExtractor::new().extract_first(&document, PLOT_LABELS) {
        Some((label, text)) => {
            tracing::info!("Found '{}' section", label);
            println!("{}", text);
            Ok(())
        }
        None => Err(AppError::Processing(format!("No plot or synopsis section found on {}", args.url))),
    }
}

async fn run_anonymize(args: AnonymizeArgs) -> Result<(), AppError> {
    let api_key = args.api_key
        .ok_or_else(|| AppError::Config("ANTHROPIC_API_KEY environment variable not set".to_string()))?;
    let storage = StorageManager::new(&args.input_dir, &args.output_dir)?;
    let rewriter = AnthropicRewriter::new(api_key, args.model)?;

    let summary = anonymize::anonymize_all(&storage, &rewriter, args.workers).await?;
    for error in &summary.errors {
        tracing::warn!("  - {}", error);
    }
    Ok(())
}

fn run_merge(args: MergeArgs) -> Result<(), AppError> {
    let storage = StorageManager::new(&args.movies_dir, &args.anonymized_dir)?;
    let summary = storage.merge_collection(&args.output)?;
    tracing::info!("Successfully created {} with {} movies", args.output.display(), summary.merged);
    if !summary.missing.is_empty() {
        tracing::warn!("{} records had no anonymized plot", summary.missing.len());
    }
    if !summary.unreadable.is_empty() {
        tracing::warn!("{} records could not be read: {}", summary.unreadable.len(), summary.unreadable.join(", "));
    }
    Ok(())
}
