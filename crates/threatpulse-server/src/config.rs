use serde::{Deserialize, Serialize};
use threatpulse_feed::client::DEFAULT_FEED_ENDPOINT;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Full connection URL; defaults to a SQLite file under `data_dir`.
    #[serde(default)]
    pub url: Option<String>,
}

impl DatabaseConfig {
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("sqlite://{}/threatpulse.db?mode=rwc", self.data_dir),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Interval between scheduled feed runs. Overlap avoidance is the
    /// scheduler's concern only for feed-API load; writes are idempotent.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// How far back the correlation batch reaches, in hours. A cost bound,
    /// not a product requirement, so it stays configurable.
    #[serde(default = "default_correlation_window_hours")]
    pub correlation_window_hours: i64,
}

fn default_http_port() -> u16 {
    8080
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_feed_endpoint() -> String {
    DEFAULT_FEED_ENDPOINT.to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    3600
}

fn default_correlation_window_hours() -> i64 {
    24
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            database: DatabaseConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            url: None,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: default_feed_endpoint(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            correlation_window_hours: default_correlation_window_hours(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
