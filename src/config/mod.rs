//! Configuration loading and validation
//!
//! Configuration comes from a TOML file: the storefront root URL, the
//! category allow-list, per-tier concurrency limits, the per-fetch retry
//! budget, the HTTP bind address, and the database path.

mod parser;
mod types;

pub use parser::load_config;
pub use types::{Config, CrawlerConfig, OutputConfig, ServerConfig};
