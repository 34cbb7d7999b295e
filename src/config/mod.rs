//! Configuration loading and validation
//!
//! The engine is driven by a [`CrawlConfig`] value object shared read-only by
//! every worker. Embedders construct one directly; the CLI loads it from a
//! TOML file together with the seed list.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, CrawlConfig};
pub use validation::{validate, validate_crawl_config};
