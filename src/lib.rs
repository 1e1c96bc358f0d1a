//! Storecrawl: a three-tier storefront catalog crawler
//!
//! This crate crawls a storefront site in three stages (menu categories,
//! category jersey listings, individual products), bounding concurrent
//! fetches at every stage, and persists one row per product identity.

pub mod config;
pub mod crawler;
pub mod dispatch;
pub mod extract;
pub mod fetch;
pub mod observe;
pub mod server;
pub mod storage;

use thiserror::Error;

/// Main error type for storecrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for storecrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Orchestrator;
pub use extract::ProductRecord;
pub use fetch::{FetchError, Fetcher};
pub use observe::{CrawlEvent, EventSink, Level, Observer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_wraps_into_crawl_error() {
        let err = storage::StorageError::from(rusqlite::Error::InvalidQuery);
        assert!(matches!(CrawlError::from(err), CrawlError::Storage(_)));
    }
}
