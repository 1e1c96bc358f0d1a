use serde::Deserialize;

/// Main configuration structure for storecrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Absolute URL of the storefront root page
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Menu categories to crawl; anything else in the top nav is skipped
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Worker count for category branches (tier 2)
    #[serde(rename = "category-concurrency", default = "default_concurrency")]
    pub category_concurrency: usize,

    /// Worker count for product pages within one category (tier 3)
    #[serde(rename = "product-concurrency", default = "default_concurrency")]
    pub product_concurrency: usize,

    /// Retries per fetch after the first attempt
    #[serde(rename = "fetch-retries", default = "default_retries")]
    pub fetch_retries: u32,
}

/// HTTP control surface configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the trigger endpoint listens on
    #[serde(rename = "bind-addr", default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_categories() -> Vec<String> {
    ["nfl", "mlb", "nba", "nhl"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_concurrency() -> usize {
    10
}

fn default_retries() -> u32 {
    3
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_in() {
        let toml = r#"
[crawler]
root-url = "https://shop.example.com/"

[output]
database-path = "./crawl.db"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.crawler.categories, default_categories());
        assert_eq!(config.crawler.category_concurrency, 10);
        assert_eq!(config.crawler.product_concurrency, 10);
        assert_eq!(config.crawler.fetch_retries, 3);
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let toml = r#"
[crawler]
root-url = "https://shop.example.com/"
categories = ["nfl"]
category-concurrency = 4
product-concurrency = 2
fetch-retries = 0

[server]
bind-addr = "127.0.0.1:9999"

[output]
database-path = "./crawl.db"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.crawler.categories, vec!["nfl".to_string()]);
        assert_eq!(config.crawler.category_concurrency, 4);
        assert_eq!(config.crawler.product_concurrency, 2);
        assert_eq!(config.crawler.fetch_retries, 0);
        assert_eq!(config.server.bind_addr, "127.0.0.1:9999");
    }
}
