//! Store traits and record types
//!
//! The frontier (pending work) and history (dedup ledger) sit behind traits
//! so that crawls can run against transient in-memory stores or durable
//! sqlite-backed ones, or anything an embedder supplies.

use crate::url::CanonicalUrl;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

/// Result type for store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A discovered-but-not-yet-processed crawl entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// The URL to process
    pub url: CanonicalUrl,

    /// The page this URL was discovered on; seeds are their own parent
    pub parent: CanonicalUrl,

    /// Link hops from the seed that led here
    pub depth: u32,
}

impl FrontierEntry {
    /// Builds a depth-0 entry for a seed URL (its own parent)
    pub fn seed(url: CanonicalUrl) -> Self {
        Self {
            parent: url.clone(),
            url,
            depth: 0,
        }
    }

    /// Builds an entry for a link discovered on `parent`
    pub fn child(url: CanonicalUrl, parent: &CanonicalUrl, parent_depth: u32) -> Self {
        Self {
            url,
            parent: parent.clone(),
            depth: parent_depth + 1,
        }
    }
}

/// The first-seen record created when a URL is claimed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    /// Claim sequence number
    pub id: i64,

    /// Canonical URL string
    pub url: String,

    /// When the URL was first claimed
    pub first_seen: DateTime<Utc>,
}

/// Outcome of an atomic history claim
#[derive(Debug, Clone)]
pub struct Claim {
    /// True if this call created the record; false if the URL was already
    /// claimed by an earlier call
    pub claimed: bool,

    /// The record, newly created or pre-existing
    pub record: HistoryRecord,
}

/// Queue of pending crawl entries
///
/// Implementations must be safe for unsynchronized concurrent use from many
/// workers. `push` never rejects and never deduplicates; `pop` is
/// non-blocking and hands each pushed entry to at most one caller. No
/// ordering is guaranteed beyond that.
pub trait FrontierStore: Send + Sync {
    /// Appends entries to the frontier
    fn push(&self, entries: Vec<FrontierEntry>) -> StorageResult<()>;

    /// Removes and returns one entry, if any is available
    fn pop(&self) -> StorageResult<Option<FrontierEntry>>;

    /// Number of entries currently queued
    fn len(&self) -> StorageResult<usize>;
}

/// Dedup ledger mapping canonical URL to its first-seen record
///
/// The claim is a single atomic insert-if-absent: when two workers race on
/// the same URL, exactly one observes `claimed == true`.
pub trait HistoryStore: Send + Sync {
    /// Atomically claims a URL, creating its record if absent
    fn try_claim(&self, url: &CanonicalUrl) -> StorageResult<Claim>;

    /// Number of distinct URLs claimed so far
    fn seen_count(&self) -> StorageResult<u64>;
}
