//! Scuttle: an embeddable, concurrent web-crawl engine
//!
//! This crate crawls the web from a set of seed URLs, dispatching every page
//! to user-supplied hooks while enforcing depth limits, a global page budget,
//! URL deduplication, and robots.txt compliance. The frontier queue, history
//! ledger, fetcher, and politeness gate are pluggable components behind
//! traits, so embedders can swap any of them out.

pub mod config;
pub mod crawler;
pub mod fetch;
pub mod handler;
pub mod robots;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for scuttle operations
#[derive(Debug, Error)]
pub enum ScuttleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for scuttle operations
pub type Result<T> = std::result::Result<T, ScuttleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::Crawler;
pub use fetch::{Document, FetchProvider, FetchResult};
pub use handler::CrawlHandler;
pub use robots::PolitenessGate;
pub use storage::{FrontierEntry, FrontierStore, HistoryRecord, HistoryStore};
pub use url::CanonicalUrl;
