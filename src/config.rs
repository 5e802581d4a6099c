use crate::api::RetryPolicy;
use crate::error::{FridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// APIベースURLの環境変数
pub const API_URL_ENV: &str = "SMART_FRIDGE_API_URL";
/// デモモードの環境変数
pub const DEMO_ENV: &str = "SMART_FRIDGE_DEMO";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_BUCKET: &str = "smart-fridge-uploads";
pub const DEFAULT_PEOPLE: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    /// 検出APIに渡すストレージ名前空間
    pub bucket: String,
    pub demo_mode: bool,
    pub default_people: u32,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// None の場合タイムアウトなし
    pub timeout_seconds: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            bucket: DEFAULT_BUCKET.into(),
            demo_mode: false,
            default_people: DEFAULT_PEOPLE,
            max_retries: 0,
            retry_backoff_ms: 500,
            timeout_seconds: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        Ok(config.with_env_overrides())
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FridgeError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("smart-fridge").join("config.json"))
    }

    /// 環境変数を優先
    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        if let Ok(flag) = std::env::var(DEMO_ENV) {
            self.demo_mode = parse_flag(&flag);
        }
        self
    }

    pub fn set_api_base_url(&mut self, url: String) -> Result<()> {
        let url = url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FridgeError::Config(format!("invalid API URL: {}", url)));
        }
        self.api_base_url = url;
        self.save()
    }

    pub fn set_demo_mode(&mut self, enabled: bool) -> Result<()> {
        self.demo_mode = enabled;
        self.save()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        if self.max_retries == 0 {
            RetryPolicy::none()
        } else {
            RetryPolicy::exponential(self.max_retries, Duration::from_millis(self.retry_backoff_ms))
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// "1" / "true" / "on" / "yes" を真とみなす
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}
