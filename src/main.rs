//! web-crawler main entry point
//!
//! This is the command-line interface for the web-crawler page extraction
//! pipeline.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use web_crawler::config::{load_config_with_hash, validate, Config};
use web_crawler::output::{export_json, print_statistics};
use web_crawler::{CrawlRequest, Crawler, RenderRequest};

/// web-crawler: a polite page extractor
///
/// Fetches each configured URL once, honouring robots.txt and a fixed delay
/// between requests, extracts title, description, content, links and
/// images through selector fallback chains, and keeps the pages that pass
/// the content filter.
#[derive(Parser, Debug)]
#[command(name = "web-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A polite page extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// URL to crawl; replaces the configured list when given (repeatable)
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Fetch through a headless browser
    #[arg(long)]
    render: bool,

    /// Script to evaluate in rendered pages
    #[arg(long, value_name = "JS", requires = "render")]
    script: Option<String>,

    /// Do not consult robots.txt
    #[arg(long)]
    ignore_robots: bool,

    /// Selector/filter preset (ecommerce, blog, social)
    #[arg(long, value_name = "NAME")]
    preset: Option<String>,

    /// Write accepted results to this JSON file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli)?;

    if config.urls.is_empty() {
        anyhow::bail!("No URLs to crawl; add `urls` to the config or pass --url");
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(());
    }

    handle_crawl(&config, cli.output.as_deref()).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("web_crawler=info,warn"),
            1 => EnvFilter::new("web_crawler=debug,info"),
            2 => EnvFilter::new("web_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line flags on top of the file and revalidates
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if !cli.urls.is_empty() {
        config.urls = cli.urls.clone();
    }
    if cli.render {
        config.render.enabled = true;
    }
    if let Some(script) = &cli.script {
        config.render.script = Some(script.clone());
    }
    if cli.ignore_robots {
        config.session.respect_robots = false;
    }
    if let Some(preset) = &cli.preset {
        config.preset = Some(preset.clone());
    }

    validate(config).context("Invalid command-line overrides")?;
    Ok(())
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== web-crawler Dry Run ===\n");

    println!("Session:");
    println!("  Timeout: {:?}", config.session.timeout());
    println!("  Delay: {:?}", config.session.delay());
    println!("  Respect robots.txt: {}", config.session.respect_robots);
    println!("  Robots user agent: {}", config.session.robots_user_agent);
    println!("  Custom headers: {}", config.session.headers.len());
    println!("  Proxies: {}", config.session.proxies.len());

    println!("\nRendering:");
    println!("  Enabled: {}", config.render.enabled);
    if config.render.enabled {
        println!("  Settle: {:?}", config.render.settle());
        println!("  Gated: {}", config.render.gate_rendered);
        println!("  Script: {}", config.render.script.is_some());
    }

    if let Some(preset) = config.preset()? {
        println!("\nPreset: {}", preset);
    }

    match config.filter_spec()? {
        Some(filter) => {
            println!("\nFilter:");
            println!("  Keywords: {:?}", filter.keywords());
            println!("  Exclude keywords: {:?}", filter.exclude_keywords());
            println!("  Min length: {}", filter.min_length());
            println!("  Regex: {}", filter.regex().unwrap_or("-"));
        }
        None => println!("\nFilter: none"),
    }

    println!("\nURLs ({}):", config.urls.len());
    for url in &config.urls {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, output: Option<&std::path::Path>) -> anyhow::Result<()> {
    let mut crawler = Crawler::from_config(config)?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping after the current URL");
                stop.store(true, Ordering::SeqCst);
            }
        });
    }

    tracing::info!(
        "Starting crawl of {} URLs ({})",
        config.urls.len(),
        if config.render.enabled { "rendered" } else { "plain HTTP" }
    );

    let accepted = if config.render.enabled {
        let request = RenderRequest::from_config(config)?;
        crawler
            .crawl_many_rendered_until(&config.urls, &request, &stop)
            .await
    } else {
        let request = CrawlRequest::from_config(config)?;
        crawler.crawl_many_until(&config.urls, &request, &stop).await
    };

    tracing::info!(
        "Crawl finished: {} accepted, {} URLs visited",
        accepted.len(),
        crawler.visited_count()
    );

    match crawler.statistics() {
        Some(stats) => print_statistics(&stats),
        None => println!("No pages collected."),
    }

    if let Some(path) = output {
        export_json(crawler.results(), path)
            .with_context(|| format!("Failed to export results to {}", path.display()))?;
        println!("✓ Results exported to: {}", path.display());
    }

    Ok(())
}
