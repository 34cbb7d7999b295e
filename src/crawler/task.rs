//! Per-task crawl orchestration
//!
//! One execution of [`run_job`] processes one frontier entry through a fixed
//! sequence of gates: liveness, acquire, depth, dedup, then the independent
//! visit and check branches. Failing any gate ends the task without spawning
//! children; nothing is returned to the submitter.

use crate::config::CrawlConfig;
use crate::crawler::pool::{CrawlJob, JobSink};
use crate::crawler::state::CrawlState;
use crate::fetch::{Document, FetchProvider, FetchResult};
use crate::handler::CrawlHandler;
use crate::robots::PolitenessGate;
use crate::storage::{FrontierEntry, FrontierStore, HistoryStore};
use crate::url::CanonicalUrl;
use std::sync::Arc;
use std::time::Duration;

/// Everything a worker task needs, shared across all tasks of one crawl
pub(crate) struct TaskContext {
    pub config: Arc<CrawlConfig>,
    pub state: Arc<CrawlState>,
    pub frontier: Arc<dyn FrontierStore>,
    pub history: Arc<dyn HistoryStore>,
    pub fetcher: Arc<dyn FetchProvider>,
    pub politeness: Arc<dyn PolitenessGate>,
    pub handler: Arc<dyn CrawlHandler>,
    pub sink: JobSink,
}

/// Runs the orchestration state machine for one job
pub(crate) async fn run_job(ctx: Arc<TaskContext>, job: CrawlJob) {
    // Liveness first, before touching the frontier: once the budget is hit
    // or the crawl is stopped, queued jobs must not drain entries pointlessly
    if !ctx.state.should_continue() {
        return;
    }

    let entry = match acquire_entry(&ctx, job).await {
        Some(entry) => entry,
        None => return,
    };

    let FrontierEntry { url, parent, depth } = entry;

    let max_depth = ctx.config.max_depth;
    if max_depth != -1 && i64::from(depth) >= i64::from(max_depth) {
        tracing::trace!("dropping {} at depth {} (max {})", url, depth, max_depth);
        return;
    }

    let claim = match ctx.history.try_claim(&url) {
        Ok(claim) => claim,
        Err(e) => {
            tracing::warn!("history claim failed for {}: {}", url, e);
            return;
        }
    };
    if !claim.claimed {
        ctx.handler.on_repeat_visit(&url, &parent);
        return;
    }

    if ctx.handler.should_visit(&url) {
        if ctx.config.respect_robots_txt && !ctx.politeness.is_safe_to_visit(&url).await {
            tracing::debug!("robots policy denied visit to {}", url);
            return;
        }

        if !ctx.state.try_acquire_visit() {
            return;
        }

        match ctx.fetcher.get_url(&url).await {
            FetchResult::Error(reason) => {
                ctx.handler.on_content_fetch_error(&url, &reason);
                return;
            }
            FetchResult::Status(_) => {
                ctx.handler
                    .on_content_fetch_error(&url, "response carried no parseable document");
                return;
            }
            FetchResult::Document(doc) => {
                let children = child_entries(&doc, &url, depth);
                dispatch_children(&ctx, children);
                ctx.handler.visit(&url, &doc);
            }
        }
    }

    if ctx.handler.should_check(&url) {
        if ctx.config.respect_robots_txt && !ctx.politeness.is_safe_to_visit(&url).await {
            tracing::debug!("robots policy denied check of {}", url);
            return;
        }

        if !ctx.state.try_acquire_visit() {
            return;
        }

        match ctx.fetcher.check_url(&url).await {
            FetchResult::Error(reason) => ctx.handler.on_content_fetch_error(&url, &reason),
            FetchResult::Status(status_code) => ctx.handler.check(&url, status_code),
            FetchResult::Document(doc) => ctx.handler.check(&url, doc.status_code),
        }
    }
}

/// Resolves the entry this task will process
///
/// A carried entry is used as-is; otherwise the task pops from the frontier,
/// waiting out short starvation one second at a time. Giving up after
/// `empty_frontier_wait_secs` rounds is the mechanism by which idle workers
/// wind down and the crawl naturally ends.
async fn acquire_entry(ctx: &TaskContext, job: CrawlJob) -> Option<FrontierEntry> {
    if let Some(entry) = job.entry {
        return Some(entry);
    }

    if let Some(entry) = pop_frontier(ctx) {
        return Some(entry);
    }

    for _ in 0..ctx.config.empty_frontier_wait_secs {
        tokio::time::sleep(Duration::from_secs(1)).await;
        if let Some(entry) = pop_frontier(ctx) {
            return Some(entry);
        }
    }

    None
}

fn pop_frontier(ctx: &TaskContext) -> Option<FrontierEntry> {
    match ctx.frontier.pop() {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!("frontier pop failed: {}", e);
            None
        }
    }
}

/// Builds child entries for every outgoing link worth following
///
/// Anchor targets and other resource links are treated alike: same-page
/// fragment hrefs are excluded, the rest resolve against the current page,
/// and anything that fails to canonicalize is dropped.
fn child_entries(doc: &Document, page: &CanonicalUrl, depth: u32) -> Vec<FrontierEntry> {
    doc.anchor_hrefs
        .iter()
        .chain(doc.resource_links.iter())
        .filter(|href| !href.starts_with('#'))
        .filter_map(|href| CanonicalUrl::resolve(href, page).ok())
        .map(|child| FrontierEntry::child(child, page, depth))
        .collect()
}

/// Hands discovered children to the pool
///
/// Persistent crawls route every child through the durable frontier and
/// submit unassigned jobs, decoupling submission order from processing
/// order. Transient crawls skip the round-trip and carry each entry in its
/// job directly; a backlog lost to early termination was never durable
/// anyway.
fn dispatch_children(ctx: &TaskContext, children: Vec<FrontierEntry>) {
    if children.is_empty() {
        return;
    }

    if ctx.config.persistent_crawl {
        let count = children.len();
        if let Err(e) = ctx.frontier.push(children) {
            tracing::warn!("failed to enqueue {} discovered links: {}", count, e);
            return;
        }
        for _ in 0..count {
            ctx.sink.submit(CrawlJob::unassigned());
        }
    } else {
        for child in children {
            ctx.sink.submit(CrawlJob::carrying(child));
        }
    }
}
