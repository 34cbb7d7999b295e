//! Crawl lifecycle controller
//!
//! [`Crawler`] wires the stores, fetcher, politeness gate, and worker pool
//! together and exposes the public start/stop surface. Components default to
//! production implementations chosen from the configuration; embedders can
//! swap any of them before the first start.

use crate::config::{validate_crawl_config, CrawlConfig};
use crate::crawler::pool::{CrawlJob, WorkerPool};
use crate::crawler::state::CrawlState;
use crate::crawler::task::{run_job, TaskContext};
use crate::fetch::{build_http_client, FetchProvider, HttpFetcher};
use crate::handler::CrawlHandler;
use crate::robots::{PolitenessGate, RobotsSentry};
use crate::storage::{
    FrontierEntry, FrontierStore, HistoryStore, MemoryFrontier, MemoryHistory, SqliteFrontier,
    SqliteHistory,
};
use crate::url::CanonicalUrl;
use crate::Result;
use std::any::Any;
use std::sync::{Arc, Mutex};

/// An embeddable web crawler
///
/// Construct with a [`CrawlConfig`] and a [`CrawlHandler`], optionally swap
/// components, then call [`Crawler::start`] (blocking until the crawl winds
/// down) or [`Crawler::start_nonblocking`]. One `Crawler` instance runs one
/// crawl; its shared state lives for that crawl's duration.
pub struct Crawler {
    config: Arc<CrawlConfig>,
    state: Arc<CrawlState>,
    handler: Arc<dyn CrawlHandler>,
    frontier: Arc<dyn FrontierStore>,
    history: Arc<dyn HistoryStore>,
    fetcher: Arc<dyn FetchProvider>,
    politeness: Arc<dyn PolitenessGate>,
    pool: WorkerPool,
    context: Mutex<Option<Arc<dyn Any + Send + Sync>>>,
}

impl Crawler {
    /// Creates a crawler with production components
    ///
    /// Persistent crawls open sqlite stores under `crawl_directory`
    /// (creating it if needed); transient crawls use in-memory stores.
    pub fn new(config: CrawlConfig, handler: impl CrawlHandler) -> Result<Self> {
        validate_crawl_config(&config).map_err(crate::ScuttleError::Config)?;

        let client = build_http_client(&config.user_agent)?;

        let (frontier, history): (Arc<dyn FrontierStore>, Arc<dyn HistoryStore>) =
            if config.persistent_crawl {
                std::fs::create_dir_all(&config.crawl_directory)?;
                let db = config.crawl_directory.join("crawl.db");
                (
                    Arc::new(SqliteFrontier::open(&db)?),
                    Arc::new(SqliteHistory::open(&db)?),
                )
            } else {
                (
                    Arc::new(MemoryFrontier::new()),
                    Arc::new(MemoryHistory::new()),
                )
            };

        let politeness = Arc::new(RobotsSentry::new(client.clone(), config.user_agent.clone()));
        let fetcher = Arc::new(HttpFetcher::new(client));
        let pool = WorkerPool::new(config.max_backlog);
        let state = Arc::new(CrawlState::new(config.total_pages));

        Ok(Self {
            config: Arc::new(config),
            state,
            handler: Arc::new(handler),
            frontier,
            history,
            fetcher,
            politeness,
            pool,
            context: Mutex::new(None),
        })
    }

    /// Replaces the frontier store
    pub fn with_frontier(mut self, frontier: Arc<dyn FrontierStore>) -> Self {
        self.frontier = frontier;
        self
    }

    /// Replaces the history store
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }

    /// Replaces the fetch provider
    pub fn with_fetcher(mut self, fetcher: Arc<dyn FetchProvider>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replaces the politeness gate
    pub fn with_politeness(mut self, politeness: Arc<dyn PolitenessGate>) -> Self {
        self.politeness = politeness;
        self
    }

    /// Attaches an opaque context value for the embedding application
    ///
    /// The engine never reads or writes it.
    pub fn set_context(&self, context: Arc<dyn Any + Send + Sync>) {
        *self.context.lock().unwrap() = Some(context);
    }

    /// The attached context value, if any
    pub fn context(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.context.lock().unwrap().clone()
    }

    /// Starts the crawl and blocks until it winds down
    ///
    /// Seeds are canonicalized and pushed to the frontier, `on_crawl_start`
    /// fires, one task is submitted per seed, and the call then waits for
    /// pool quiescence before stopping the workers and firing
    /// `on_crawl_end`.
    pub async fn start(&self, seeds: Vec<String>) -> Result<()> {
        self.launch(seeds)?;
        self.pool.wait_quiescent().await;
        self.stop();
        self.handler.on_crawl_end();
        Ok(())
    }

    /// Starts the crawl with a single seed and blocks until it winds down
    pub async fn start_one(&self, seed: &str) -> Result<()> {
        self.start(vec![seed.to_string()]).await
    }

    /// Starts the crawl and returns immediately
    ///
    /// The caller is responsible for eventually calling [`Crawler::stop`] or
    /// [`Crawler::shutdown`]; `on_crawl_end` is not invoked automatically.
    /// Must be called within a tokio runtime.
    pub fn start_nonblocking(&self, seeds: Vec<String>) -> Result<()> {
        self.launch(seeds)?;
        Ok(())
    }

    /// Graceful termination: stop accepting tasks, let in-flight ones finish
    ///
    /// Cooperative: running tasks observe the halt at their next liveness
    /// gate. Idempotent.
    pub fn stop(&self) {
        self.state.halt();
        self.pool.stop();
    }

    /// Forceful termination: abort in-flight tasks
    ///
    /// Returns the tasks that never ran. Idempotent, and legal after
    /// [`Crawler::stop`].
    pub fn shutdown(&self) -> Vec<CrawlJob> {
        self.state.halt();
        self.pool.shutdown()
    }

    /// Number of fetches performed so far (visits and checks both count)
    pub fn visit_count(&self) -> u64 {
        self.state.visit_count()
    }

    /// Number of discovered tasks dropped by backlog overflow
    pub fn dropped_task_count(&self) -> u64 {
        self.pool.dropped_count()
    }

    fn launch(&self, seeds: Vec<String>) -> Result<()> {
        let entries = seeds
            .iter()
            .map(|seed| CanonicalUrl::parse(seed).map(FrontierEntry::seed))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let count = entries.len();
        self.frontier.push(entries)?;

        self.handler.on_crawl_start();

        self.ensure_workers();
        let sink = self.pool.sink();
        for _ in 0..count {
            sink.submit(CrawlJob::unassigned());
        }

        tracing::info!("crawl started with {} seed(s)", count);
        Ok(())
    }

    fn ensure_workers(&self) {
        let ctx = Arc::new(TaskContext {
            config: Arc::clone(&self.config),
            state: Arc::clone(&self.state),
            frontier: Arc::clone(&self.frontier),
            history: Arc::clone(&self.history),
            fetcher: Arc::clone(&self.fetcher),
            politeness: Arc::clone(&self.politeness),
            handler: Arc::clone(&self.handler),
            sink: self.pool.sink(),
        });

        self.pool
            .spawn_workers(self.config.num_workers, move |job| {
                run_job(Arc::clone(&ctx), job)
            });
    }
}
