use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const MAX_EARLY_TOLERANCE_SECS: u64 = 1800;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. The DATABASE_URL environment
    /// variable takes precedence over the file value.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
    #[serde(default = "default_catalog_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_description_max_len")]
    pub description_max_len: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SchedulerSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub early_tolerance_secs: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Discord-compatible webhook for episode alerts. When unset,
    /// alerts only go to the log.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Role mention prepended to broadcast alerts.
    #[serde(default)]
    pub mention_role_id: Option<u64>,
}

fn default_catalog_base_url() -> String {
    "https://graphql.anilist.co".to_string()
}

fn default_catalog_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_description_max_len() -> usize {
    300
}

fn default_interval_secs() -> u64 {
    600
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            timeout_secs: default_catalog_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            description_max_len: default_description_max_len(),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            early_tolerance_secs: 0,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from the given file if it exists, otherwise start from
    /// defaults; then apply environment overrides.
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                self.database.url = Some(url);
            }
        }
        if let Ok(webhook) = std::env::var("ALERT_WEBHOOK_URL") {
            if !webhook.is_empty() {
                self.delivery.webhook_url = Some(webhook);
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.scheduler.interval_secs == 0 {
            return Err(anyhow::anyhow!("scheduler.interval_secs must be positive"));
        }
        if self.scheduler.early_tolerance_secs > MAX_EARLY_TOLERANCE_SECS {
            return Err(anyhow::anyhow!(
                "scheduler.early_tolerance_secs must be at most {} (30 minutes)",
                MAX_EARLY_TOLERANCE_SECS
            ));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(anyhow::anyhow!("catalog.timeout_secs must be positive"));
        }
        Ok(())
    }

    /// The database URL, required for anything that touches the store.
    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database
            .url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("database.url is not set (or set DATABASE_URL)"))
    }
}
