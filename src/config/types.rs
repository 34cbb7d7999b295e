use serde::Deserialize;
use std::path::PathBuf;

/// Crawl behavior configuration
///
/// Immutable for the lifetime of a crawl; every worker task reads the same
/// instance. Constructible directly in code (all fields public, `Default`
/// provided) or deserialized from the `[crawler]` table of a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlConfig {
    /// Number of parallel worker tasks
    pub num_workers: usize,

    /// Maximum link depth from a seed; -1 means unbounded
    pub max_depth: i32,

    /// Total page budget across the whole crawl; -1 means unbounded
    pub total_pages: i64,

    /// How many seconds an idle worker waits on an empty frontier before
    /// giving up its task
    pub empty_frontier_wait_secs: u64,

    /// Capacity of the worker backlog; submissions beyond it are dropped
    pub max_backlog: usize,

    /// Route discovered links through the durable frontier store
    pub persistent_crawl: bool,

    /// Consult robots.txt before fetching
    pub respect_robots_txt: bool,

    /// User agent presented to servers and matched against robots rules
    pub user_agent: String,

    /// Directory holding the sqlite files for persistent crawls
    pub crawl_directory: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            num_workers: 4,
            max_depth: -1,
            total_pages: -1,
            empty_frontier_wait_secs: 10,
            max_backlog: 10_000,
            persistent_crawl: false,
            respect_robots_txt: true,
            user_agent: "scuttle/0.2".to_string(),
            crawl_directory: PathBuf::from("./scuttle-data"),
        }
    }
}

/// Top-level configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Engine knobs
    #[serde(default)]
    pub crawler: CrawlConfig,

    /// Seed URLs to start crawling from
    #[serde(default)]
    pub seeds: Vec<String>,
}
