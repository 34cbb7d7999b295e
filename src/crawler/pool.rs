//! Bounded worker pool
//!
//! A fixed group of worker tasks drains one bounded job channel. Submissions
//! beyond the backlog capacity are dropped rather than blocking the producer
//! or growing memory without bound; dropped links are never retried. Each job
//! runs in its own spawned task so a panicking hook is contained to that job.
//!
//! Completion is detected by a ledger counting pending plus in-flight jobs:
//! when it reaches zero the quiescence signal fires, which is what ends a
//! blocking crawl.

use crate::storage::FrontierEntry;
use kanal::{AsyncReceiver, AsyncSender};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

/// One unit of crawl work
///
/// A job either carries its entry directly (non-persistent dispatch) or pops
/// one from the frontier when it runs.
#[derive(Debug)]
pub struct CrawlJob {
    /// Entry to process; `None` means pop from the frontier
    pub entry: Option<FrontierEntry>,
}

impl CrawlJob {
    /// Job that will pop its own entry from the frontier
    pub fn unassigned() -> Self {
        Self { entry: None }
    }

    /// Job carrying its entry directly, skipping the frontier round-trip
    pub fn carrying(entry: FrontierEntry) -> Self {
        Self { entry: Some(entry) }
    }
}

/// Counter of pending + in-flight jobs with an idle notification
pub(crate) struct TaskLedger {
    outstanding: AtomicUsize,
    idle: Notify,
}

impl TaskLedger {
    fn new() -> Self {
        Self {
            outstanding: AtomicUsize::new(0),
            idle: Notify::new(),
        }
    }

    fn register(&self) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
    }

    fn complete(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }

    fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    async fn wait_idle(&self) {
        loop {
            // Register interest before re-checking, so a completion between
            // the check and the await cannot be missed
            let notified = self.idle.notified();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Cloneable submission handle handed to running tasks
///
/// Tasks use it to submit the child jobs they discover; the engine uses it
/// for seeds. `submit` never blocks.
#[derive(Clone)]
pub(crate) struct JobSink {
    tx: AsyncSender<CrawlJob>,
    ledger: Arc<TaskLedger>,
    accepting: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
}

impl JobSink {
    /// Submits a job; returns false if it was refused or dropped
    pub fn submit(&self, job: CrawlJob) -> bool {
        if !self.accepting.load(Ordering::SeqCst) {
            return false;
        }

        self.ledger.register();
        match self.tx.try_send(job) {
            Ok(true) => true,
            Ok(false) => {
                // Backlog full: lossy backpressure, the link is gone
                self.ledger.complete();
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("worker backlog full, dropping submitted task");
                false
            }
            Err(_) => {
                self.ledger.complete();
                false
            }
        }
    }
}

/// Fixed-size pool of worker tasks over a bounded backlog
pub struct WorkerPool {
    sink: JobSink,
    rx: AsyncReceiver<CrawlJob>,
    stop_tx: watch::Sender<bool>,
    force_tx: watch::Sender<bool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
}

impl WorkerPool {
    /// Creates the pool and its backlog; workers are spawned separately
    pub fn new(max_backlog: usize) -> Self {
        let (tx, rx) = kanal::bounded_async(max_backlog);
        let (stop_tx, _) = watch::channel(false);
        let (force_tx, _) = watch::channel(false);

        Self {
            sink: JobSink {
                tx,
                ledger: Arc::new(TaskLedger::new()),
                accepting: Arc::new(AtomicBool::new(true)),
                dropped: Arc::new(AtomicU64::new(0)),
            },
            rx,
            stop_tx,
            force_tx,
            workers: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        }
    }

    pub(crate) fn sink(&self) -> JobSink {
        self.sink.clone()
    }

    /// Spawns the fixed worker group; later calls are no-ops
    ///
    /// Must run inside a tokio runtime. `run` executes one job; it is cloned
    /// per worker and each invocation runs in its own spawned task.
    pub(crate) fn spawn_workers<F, Fut>(&self, count: usize, run: F)
    where
        F: Fn(CrawlJob) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut workers = self.workers.lock().unwrap();
        for worker_id in 0..count {
            let rx = self.rx.clone();
            let mut stop_rx = self.stop_tx.subscribe();
            let mut force_rx = self.force_tx.subscribe();
            let ledger = Arc::clone(&self.sink.ledger);
            let run = run.clone();

            workers.push(tokio::spawn(async move {
                loop {
                    let job = tokio::select! {
                        biased;
                        _ = stop_rx.wait_for(|stopped| *stopped) => break,
                        received = rx.recv() => match received {
                            Ok(job) => job,
                            Err(_) => break,
                        },
                    };

                    let mut handle = tokio::spawn(run(job));
                    let finished = tokio::select! {
                        biased;
                        _ = force_rx.wait_for(|forced| *forced) => None,
                        result = &mut handle => Some(result),
                    };
                    match finished {
                        None => handle.abort(),
                        Some(Err(e)) if e.is_panic() => {
                            tracing::error!(worker_id, "crawl task panicked");
                        }
                        _ => {}
                    }
                    ledger.complete();
                }
                tracing::trace!(worker_id, "worker exiting");
            }));
        }
    }

    /// Resolves when no jobs are pending or in flight, or the pool stopped
    pub(crate) async fn wait_quiescent(&self) {
        let mut stop_rx = self.stop_tx.subscribe();
        tokio::select! {
            _ = self.sink.ledger.wait_idle() => {}
            _ = stop_rx.wait_for(|stopped| *stopped) => {}
        }
    }

    /// Graceful termination: refuse new jobs, let in-flight jobs finish
    ///
    /// Idempotent; jobs still queued in the backlog are abandoned and can be
    /// collected with [`WorkerPool::shutdown`].
    pub fn stop(&self) {
        self.sink.accepting.store(false, Ordering::SeqCst);
        self.stop_tx.send_replace(true);
    }

    /// Forceful termination: abort in-flight jobs, return the ones never run
    ///
    /// Idempotent; a second call finds an empty backlog.
    pub fn shutdown(&self) -> Vec<CrawlJob> {
        self.stop();
        self.force_tx.send_replace(true);

        for handle in self.workers.lock().unwrap().iter() {
            handle.abort();
        }

        let mut abandoned = Vec::new();
        while let Ok(Some(job)) = self.rx.try_recv() {
            self.sink.ledger.complete();
            abandoned.push(job);
        }
        abandoned
    }

    /// Number of submissions dropped because the backlog was full
    pub fn dropped_count(&self) -> u64 {
        self.sink.dropped.load(Ordering::Relaxed)
    }

    /// Pending plus in-flight job count
    pub fn outstanding(&self) -> usize {
        self.sink.ledger.outstanding()
    }
}
