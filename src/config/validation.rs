use crate::config::types::{Config, CrawlConfig};
use crate::url::CanonicalUrl;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawler)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates the engine knobs
pub fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.num_workers < 1 || config.num_workers > 256 {
        return Err(ConfigError::Validation(format!(
            "num_workers must be between 1 and 256, got {}",
            config.num_workers
        )));
    }

    if config.max_depth < -1 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be -1 (unbounded) or >= 0, got {}",
            config.max_depth
        )));
    }

    if config.total_pages != -1 && config.total_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "total_pages must be -1 (unbounded) or >= 1, got {}",
            config.total_pages
        )));
    }

    if config.max_backlog < 1 {
        return Err(ConfigError::Validation(format!(
            "max_backlog must be >= 1, got {}",
            config.max_backlog
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.crawl_directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "crawl_directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every seed is a canonicalizable URL
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        CanonicalUrl::parse(seed)
            .map_err(|e| ConfigError::InvalidSeed(format!("{}: {}", seed, e)))?;
    }
    Ok(())
}
