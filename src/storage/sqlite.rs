//! SQLite-backed store implementations
//!
//! Used for persistent crawls: frontier entries and history records survive
//! a crash, so an interrupted crawl can be resumed from the durable queue.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{
    Claim, FrontierEntry, FrontierStore, HistoryRecord, HistoryStore, StorageError, StorageResult,
};
use crate::url::CanonicalUrl;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

fn open_connection(path: &Path) -> StorageResult<Connection> {
    let conn = Connection::open(path)?;

    // WAL keeps concurrent readers from blocking the single writer
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
    ",
    )?;

    initialize_schema(&conn)?;

    Ok(conn)
}

fn parse_stored_url(raw: &str) -> StorageResult<CanonicalUrl> {
    CanonicalUrl::parse(raw)
        .map_err(|e| StorageError::CorruptRecord(format!("stored URL {}: {}", raw, e)))
}

/// Durable FIFO frontier
pub struct SqliteFrontier {
    conn: Mutex<Connection>,
}

impl SqliteFrontier {
    /// Opens (or creates) the frontier table in the database at `path`
    pub fn open(path: &Path) -> StorageResult<Self> {
        Ok(Self {
            conn: Mutex::new(open_connection(path)?),
        })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl FrontierStore for SqliteFrontier {
    fn push(&self, entries: Vec<FrontierEntry>) -> StorageResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO frontier (url, parent, depth) VALUES (?1, ?2, ?3)")?;
            for entry in &entries {
                stmt.execute(params![
                    entry.url.as_str(),
                    entry.parent.as_str(),
                    entry.depth
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn pop(&self) -> StorageResult<Option<FrontierEntry>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let row: Option<(i64, String, String, u32)> = tx
            .query_row(
                "SELECT id, url, parent, depth FROM frontier ORDER BY id LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let entry = match row {
            Some((id, url, parent, depth)) => {
                tx.execute("DELETE FROM frontier WHERE id = ?1", params![id])?;
                Some(FrontierEntry {
                    url: parse_stored_url(&url)?,
                    parent: parse_stored_url(&parent)?,
                    depth,
                })
            }
            None => None,
        };

        tx.commit()?;
        Ok(entry)
    }

    fn len(&self) -> StorageResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT count(*) FROM frontier", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Durable dedup ledger
///
/// The claim maps to a single `INSERT OR IGNORE`: the UNIQUE constraint on
/// the url column decides the winner, so racing workers cannot both claim.
pub struct SqliteHistory {
    conn: Mutex<Connection>,
}

impl SqliteHistory {
    /// Opens (or creates) the history table in the database at `path`
    pub fn open(path: &Path) -> StorageResult<Self> {
        Ok(Self {
            conn: Mutex::new(open_connection(path)?),
        })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl HistoryStore for SqliteHistory {
    fn try_claim(&self, url: &CanonicalUrl) -> StorageResult<Claim> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO history (url, first_seen) VALUES (?1, ?2)",
            params![url.as_str(), now.to_rfc3339()],
        )?;

        if inserted == 1 {
            return Ok(Claim {
                claimed: true,
                record: HistoryRecord {
                    id: conn.last_insert_rowid(),
                    url: url.as_str().to_string(),
                    first_seen: now,
                },
            });
        }

        let record = conn.query_row(
            "SELECT id, url, first_seen FROM history WHERE url = ?1",
            params![url.as_str()],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )?;

        let first_seen = DateTime::parse_from_rfc3339(&record.2)
            .map_err(|e| StorageError::CorruptRecord(format!("first_seen timestamp: {}", e)))?
            .with_timezone(&Utc);

        Ok(Claim {
            claimed: false,
            record: HistoryRecord {
                id: record.0,
                url: record.1,
                first_seen,
            },
        })
    }

    fn seen_count(&self) -> StorageResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT count(*) FROM history", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn url(s: &str) -> CanonicalUrl {
        CanonicalUrl::parse(s).unwrap()
    }

    #[test]
    fn test_frontier_push_pop_roundtrip() {
        let frontier = SqliteFrontier::open_in_memory().unwrap();

        let entry = FrontierEntry {
            url: url("https://example.com/a"),
            parent: url("https://example.com/"),
            depth: 2,
        };
        frontier.push(vec![entry.clone()]).unwrap();

        let popped = frontier.pop().unwrap().unwrap();
        assert_eq!(popped, entry);
        assert!(frontier.pop().unwrap().is_none());
    }

    #[test]
    fn test_frontier_pops_in_insertion_order() {
        let frontier = SqliteFrontier::open_in_memory().unwrap();
        frontier
            .push(vec![
                FrontierEntry::seed(url("https://example.com/first")),
                FrontierEntry::seed(url("https://example.com/second")),
            ])
            .unwrap();

        assert_eq!(
            frontier.pop().unwrap().unwrap().url.as_str(),
            "https://example.com/first"
        );
        assert_eq!(
            frontier.pop().unwrap().unwrap().url.as_str(),
            "https://example.com/second"
        );
    }

    #[test]
    fn test_frontier_survives_reopen() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("crawl.db");

        {
            let frontier = SqliteFrontier::open(&db).unwrap();
            frontier
                .push(vec![FrontierEntry::seed(url("https://example.com/kept"))])
                .unwrap();
        }

        let frontier = SqliteFrontier::open(&db).unwrap();
        assert_eq!(frontier.len().unwrap(), 1);
        assert_eq!(
            frontier.pop().unwrap().unwrap().url.as_str(),
            "https://example.com/kept"
        );
    }

    #[test]
    fn test_history_first_claim_wins() {
        let history = SqliteHistory::open_in_memory().unwrap();

        let first = history.try_claim(&url("https://example.com/page")).unwrap();
        assert!(first.claimed);

        let second = history.try_claim(&url("https://example.com/page")).unwrap();
        assert!(!second.claimed);
        assert_eq!(second.record.id, first.record.id);
        assert_eq!(history.seen_count().unwrap(), 1);
    }

    #[test]
    fn test_history_distinct_urls_get_distinct_records() {
        let history = SqliteHistory::open_in_memory().unwrap();

        let a = history.try_claim(&url("https://example.com/a")).unwrap();
        let b = history.try_claim(&url("https://example.com/b")).unwrap();

        assert!(a.claimed);
        assert!(b.claimed);
        assert_ne!(a.record.id, b.record.id);
        assert_eq!(history.seen_count().unwrap(), 2);
    }
}
