use chrono::NaiveDate;
use contracts::shared::filters::{FilterState, RelevanceTable};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_STORAGE_KEY: &str = "retail-dashboard-filters";
pub const DEFAULT_DEBOUNCE_MS: u32 = 300;

/// Default configuration embedded in the bundle
const DEFAULT_CONFIG: &str = r#"
storage_key = "retail-dashboard-filters"
debounce_ms = 300

# Pages not listed here honor every filter
[pages]
"/" = ["dateRange", "location"]
"/product-mix" = ["dateRange", "category", "brand", "location"]
"/consumer-insights" = ["dateRange", "category", "brand", "location", "weekdayWeekend"]
"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid filter config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("storage_key must not be empty")]
    EmptyStorageKey,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_debounce_ms() -> u32 {
    DEFAULT_DEBOUNCE_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterSyncConfig {
    /// Key of the persisted filter blob
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Quiet time before URL and storage are rewritten
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
    /// Rolling default window; `None` means "all time"
    #[serde(default)]
    pub default_window_days: Option<u32>,
    #[serde(default)]
    pub pages: RelevanceTable,
}

impl Default for FilterSyncConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            default_window_days: None,
            pages: RelevanceTable::default(),
        }
    }
}

impl FilterSyncConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: FilterSyncConfig = toml::from_str(contents)?;
        if config.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        Ok(config)
    }

    /// Load the embedded configuration
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            log::error!("Falling back to default filter config: {}", err);
            Self::default()
        })
    }

    /// Compiled-in filter defaults as of `today`
    pub fn defaults(&self, today: NaiveDate) -> FilterState {
        match self.default_window_days {
            Some(days) => FilterState::with_rolling_window(today, days),
            None => FilterState::default(),
        }
    }
}
