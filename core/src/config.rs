//! Application configuration values.
//!
//! Only the shape and defaults live here; hosts decide where the values come
//! from (the CLI layers files and environment variables with `config`).

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CLEAR_AFTER_MS: u64 = 5000;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,
    /// Upper bound on one request round-trip. Unset means requests may hang
    /// and the list keeps its loading placeholder.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ApiConfig {
    fn default_base_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    #[serde(default = "NotifierConfig::default_clear_after_ms")]
    pub clear_after_ms: u64,
}

impl NotifierConfig {
    fn default_clear_after_ms() -> u64 {
        DEFAULT_CLEAR_AFTER_MS
    }

    pub fn clear_after(&self) -> Duration {
        Duration::from_millis(self.clear_after_ms)
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            clear_after_ms: Self::default_clear_after_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
