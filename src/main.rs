//! Scuttle main entry point
//!
//! A thin CLI around the crawl engine: seeds come from the command line or a
//! TOML config file, and every visited page is reported on stdout. It doubles
//! as a working example of embedding the engine.

use anyhow::Context;
use clap::Parser;
use scuttle::config::{load_config_with_hash, Config};
use scuttle::fetch::Document;
use scuttle::url::CanonicalUrl;
use scuttle::{CrawlHandler, Crawler};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scuttle: an embeddable, concurrent web crawler
#[derive(Parser, Debug)]
#[command(name = "scuttle")]
#[command(version)]
#[command(about = "Crawl the web from seed URLs", long_about = None)]
struct Cli {
    /// Seed URLs to start crawling from (merged with config file seeds)
    #[arg(value_name = "URL")]
    seeds: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the maximum crawl depth (-1 = unbounded)
    #[arg(long)]
    max_depth: Option<i32>,

    /// Override the total page budget (-1 = unbounded)
    #[arg(long)]
    total_pages: Option<i64>,
}

/// Handler that visits everything and reports each page on stdout
struct LinkLogger;

impl CrawlHandler for LinkLogger {
    fn should_visit(&self, _url: &CanonicalUrl) -> bool {
        true
    }

    fn visit(&self, url: &CanonicalUrl, doc: &Document) {
        println!(
            "{}  [{}]  {} links",
            url,
            doc.status_code,
            doc.anchor_hrefs.len()
        );
    }

    fn on_content_fetch_error(&self, url: &CanonicalUrl, reason: &str) {
        tracing::warn!("failed to fetch {}: {}", url, reason);
    }

    fn on_repeat_visit(&self, url: &CanonicalUrl, _parent: &CanonicalUrl) {
        tracing::debug!("already seen {}", url);
    }

    fn on_crawl_start(&self) {
        tracing::info!("crawl starting");
    }

    fn on_crawl_end(&self) {
        tracing::info!("crawl finished");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            tracing::info!("configuration loaded (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(total_pages) = cli.total_pages {
        config.crawler.total_pages = total_pages;
    }

    let mut seeds = config.seeds.clone();
    seeds.extend(cli.seeds.iter().cloned());
    if seeds.is_empty() {
        anyhow::bail!("no seed URLs given; pass them as arguments or in the config file");
    }

    tracing::info!(
        "crawling {} seed(s), max depth {}, budget {}",
        seeds.len(),
        config.crawler.max_depth,
        config.crawler.total_pages
    );

    let crawler = Crawler::new(config.crawler, LinkLogger)?;
    crawler.start(seeds).await?;

    println!("done: {} pages fetched", crawler.visit_count());
    if crawler.dropped_task_count() > 0 {
        println!(
            "note: {} discovered links dropped by backlog overflow",
            crawler.dropped_task_count()
        );
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scuttle=info,warn"),
            1 => EnvFilter::new("scuttle=debug,info"),
            2 => EnvFilter::new("scuttle=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
