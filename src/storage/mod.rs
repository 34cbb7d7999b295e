//! Frontier and history stores
//!
//! Two stores back every crawl: the frontier (discovered-but-unprocessed
//! entries) and the history ledger (first-seen records used for dedup).
//! Transient in-memory implementations serve non-persistent crawls; the
//! sqlite implementations make a crawl resumable after a crash.

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::{MemoryFrontier, MemoryHistory};
pub use schema::initialize_schema;
pub use sqlite::{SqliteFrontier, SqliteHistory};
pub use traits::{
    Claim, FrontierEntry, FrontierStore, HistoryRecord, HistoryStore, StorageError, StorageResult,
};
