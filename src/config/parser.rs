use crate::config::types::Config;
use crate::ConfigError;
use std::path::Path;
use url::Url;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let root = Url::parse(&config.crawler.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root-url: {}", e)))?;

    if root.scheme() != "http" && root.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url must be http(s), got scheme '{}'",
            root.scheme()
        )));
    }

    if config.crawler.categories.is_empty() {
        return Err(ConfigError::Validation(
            "categories must contain at least one entry".to_string(),
        ));
    }

    if config.crawler.category_concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "category-concurrency must be >= 1, got {}",
            config.crawler.category_concurrency
        )));
    }

    if config.crawler.product_concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "product-concurrency must be >= 1, got {}",
            config.crawler.product_concurrency
        )));
    }

    if config.server.bind_addr.parse::<std::net::SocketAddr>().is_err() {
        return Err(ConfigError::Validation(format!(
            "bind-addr is not a valid socket address: '{}'",
            config.server.bind_addr
        )));
    }

    if config.output.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
