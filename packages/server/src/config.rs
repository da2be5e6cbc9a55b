use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use common::config::MqAppConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct EventConfig {
    /// Seconds from creation until an event is abandoned. Default: 3600.
    pub timeout_secs: u64,
}

impl EventConfig {
    /// Saturates at `Duration::MAX` for out-of-range values.
    pub fn timeout(&self) -> chrono::Duration {
        i64::try_from(self.timeout_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    Filesystem,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory for the filesystem backend.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SweeperConfig {
    pub enabled: bool,
    pub scan_interval_secs: u64,
}

impl SweeperConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub event: EventConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub mq: MqAppConfig,
    pub sweeper: SweeperConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("TRYON_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("event.timeout_secs", 3600_i64)?
            .set_default("store.backend", "filesystem")?
            .set_default("store.path", "./data/events")?
            .set_default("sweeper.enabled", true)?
            .set_default("sweeper.scan_interval_secs", 60_i64)?
            .set_default("mq.enabled", true)?
            .set_default("mq.url", "redis://localhost:6379")?
            .set_default("mq.pool_size", 5_i64)?
            .set_default("mq.queue_name", "inference_jobs")?
            .set_default("mq.result_queue_name", "inference_results")?
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., TRYON__EVENT__TIMEOUT_SECS)
            .add_source(Environment::with_prefix("TRYON").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
