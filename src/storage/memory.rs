//! Transient in-memory store implementations
//!
//! Used for non-persistent crawls: nothing survives the process, which is
//! exactly the trade-off the non-persistent mode accepts.

use crate::storage::traits::{
    Claim, FrontierEntry, FrontierStore, HistoryRecord, HistoryStore, StorageResult,
};
use crate::url::CanonicalUrl;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// FIFO frontier backed by a mutex-guarded deque
#[derive(Default)]
pub struct MemoryFrontier {
    queue: Mutex<VecDeque<FrontierEntry>>,
}

impl MemoryFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrontierStore for MemoryFrontier {
    fn push(&self, entries: Vec<FrontierEntry>) -> StorageResult<()> {
        let mut queue = self.queue.lock().unwrap();
        queue.extend(entries);
        Ok(())
    }

    fn pop(&self) -> StorageResult<Option<FrontierEntry>> {
        Ok(self.queue.lock().unwrap().pop_front())
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(self.queue.lock().unwrap().len())
    }
}

/// Dedup ledger backed by a mutex-guarded map
///
/// The whole claim runs under one lock, which is what makes check-and-insert
/// a single atomic step.
#[derive(Default)]
pub struct MemoryHistory {
    seen: Mutex<HashMap<String, HistoryRecord>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistory {
    fn try_claim(&self, url: &CanonicalUrl) -> StorageResult<Claim> {
        let mut seen = self.seen.lock().unwrap();

        if let Some(record) = seen.get(url.as_str()) {
            return Ok(Claim {
                claimed: false,
                record: record.clone(),
            });
        }

        let record = HistoryRecord {
            id: seen.len() as i64 + 1,
            url: url.as_str().to_string(),
            first_seen: Utc::now(),
        };
        seen.insert(record.url.clone(), record.clone());

        Ok(Claim {
            claimed: true,
            record,
        })
    }

    fn seen_count(&self) -> StorageResult<u64> {
        Ok(self.seen.lock().unwrap().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn url(s: &str) -> CanonicalUrl {
        CanonicalUrl::parse(s).unwrap()
    }

    fn entry(s: &str, depth: u32) -> FrontierEntry {
        FrontierEntry {
            url: url(s),
            parent: url("https://example.com/"),
            depth,
        }
    }

    #[test]
    fn test_frontier_fifo_order() {
        let frontier = MemoryFrontier::new();
        frontier
            .push(vec![
                entry("https://example.com/a", 1),
                entry("https://example.com/b", 1),
            ])
            .unwrap();

        assert_eq!(frontier.len().unwrap(), 2);
        assert_eq!(
            frontier.pop().unwrap().unwrap().url.as_str(),
            "https://example.com/a"
        );
        assert_eq!(
            frontier.pop().unwrap().unwrap().url.as_str(),
            "https://example.com/b"
        );
        assert!(frontier.pop().unwrap().is_none());
    }

    #[test]
    fn test_frontier_does_not_dedup() {
        let frontier = MemoryFrontier::new();
        frontier
            .push(vec![
                entry("https://example.com/a", 1),
                entry("https://example.com/a", 2),
            ])
            .unwrap();
        assert_eq!(frontier.len().unwrap(), 2);
    }

    #[test]
    fn test_first_claim_wins() {
        let history = MemoryHistory::new();

        let first = history.try_claim(&url("https://example.com/page")).unwrap();
        assert!(first.claimed);

        let second = history.try_claim(&url("https://example.com/page")).unwrap();
        assert!(!second.claimed);
        assert_eq!(second.record.id, first.record.id);

        assert_eq!(history.seen_count().unwrap(), 1);
    }

    #[test]
    fn test_normalized_forms_share_one_claim() {
        let history = MemoryHistory::new();

        let first = history.try_claim(&url("https://example.com/page/")).unwrap();
        let second = history
            .try_claim(&url("https://EXAMPLE.com/page#frag"))
            .unwrap();

        assert!(first.claimed);
        assert!(!second.claimed);
    }

    #[test]
    fn test_concurrent_claims_exactly_one_winner() {
        let history = Arc::new(MemoryHistory::new());
        let target = url("https://example.com/contested");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let history = Arc::clone(&history);
                let target = target.clone();
                std::thread::spawn(move || history.try_claim(&target).unwrap().claimed)
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|claimed| *claimed)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(history.seen_count().unwrap(), 1);
    }
}
