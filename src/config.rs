use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::normalize::{parse_date, DEFAULT_BASE_DATE, DEFAULT_CLUSTER_UUID};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
}

/// Upload target. Command-line flags override `url`, `index` and the
/// credentials.
#[derive(Debug, Deserialize, Clone)]
pub struct ElasticsearchConfig {
    /// `host:port` or a full URL.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: None,
            index: None,
            user: None,
            password: None,
            timeout_secs: 30,
            max_retries: 5,
            backoff_ms: 500,
        }
    }
}

/// Upper bound on the base retry delay (one minute).
const MAX_BACKOFF_MS: u64 = 60_000;

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    5
}
fn default_backoff_ms() -> u64 {
    500
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerateConfig {
    #[serde(default = "default_cluster_uuid")]
    pub cluster_uuid: String,
    /// Date of the first row, `YYYY-MM-DDTHH:MM:SS`.
    #[serde(default = "default_base_date")]
    pub base_date: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            cluster_uuid: default_cluster_uuid(),
            base_date: default_base_date(),
        }
    }
}

fn default_cluster_uuid() -> String {
    DEFAULT_CLUSTER_UUID.to_string()
}
fn default_base_date() -> String {
    DEFAULT_BASE_DATE.to_string()
}

/// Load the config at `path`, or the defaults when no file exists there.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let es = &config.elasticsearch;
    if es.timeout_secs == 0 {
        anyhow::bail!("elasticsearch.timeout_secs must be > 0");
    }
    if es.max_retries > 10 {
        anyhow::bail!("elasticsearch.max_retries must be <= 10");
    }
    if es.backoff_ms > MAX_BACKOFF_MS {
        anyhow::bail!("elasticsearch.backoff_ms must be <= {}", MAX_BACKOFF_MS);
    }
    if es.user.is_some() != es.password.is_some() {
        anyhow::bail!("elasticsearch.user and elasticsearch.password must be set together");
    }

    if config.generate.cluster_uuid.trim().is_empty() {
        anyhow::bail!("generate.cluster_uuid must not be empty");
    }
    parse_date(&config.generate.base_date).with_context(|| {
        format!(
            "generate.base_date must look like YYYY-MM-DDTHH:MM:SS, got '{}'",
            config.generate.base_date
        )
    })?;

    Ok(())
}
