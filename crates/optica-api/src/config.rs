//! # Console Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     OPTICA_API_URL=https://optica.example.com/api                      │
//! │     OPTICA_PAGE_SIZE=20                                                │
//! │     OPTICA_ALERT_SECS=5                                                │
//! │     OPTICA_TIMEOUT_SECS=60                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/optica/console.toml (Linux)                              │
//! │     ~/Library/Application Support/sv.optica.optica/console.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:4000/api, 10 rows, 5 s alerts, 60 s timeout       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # console.toml
//! [api]
//! base_url = "http://localhost:4000/api"
//! timeout_secs = 60
//!
//! [display]
//! page_size = 10
//! alert_secs = 5
//! ```

use std::path::PathBuf;
use std::time::Duration;

use optica_core::validation::validate_page_size;
use optica_core::{ScreenSettings, DEFAULT_NOTIFICATION_SECS, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};

// =============================================================================
// Sections
// =============================================================================

/// Where the REST backend lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every endpoint path is appended to (e.g. `.../api`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:4000/api".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// How listings are shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Seconds a notification stays visible.
    #[serde(default = "default_alert_secs")]
    pub alert_secs: u64,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_alert_secs() -> u64 {
    DEFAULT_NOTIFICATION_SECS
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            page_size: default_page_size(),
            alert_secs: default_alert_secs(),
        }
    }
}

// =============================================================================
// Console Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl ConsoleConfig {
    /// Loads defaults, then the TOML file (if it exists), then the
    /// environment, and validates the result.
    pub fn load(config_path: Option<PathBuf>) -> ApiResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading console config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies `OPTICA_*` overrides read through `lookup`.
    ///
    /// Unparseable numbers are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("OPTICA_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(raw) = lookup("OPTICA_TIMEOUT_SECS") {
            match raw.trim().parse() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %raw, "Ignoring invalid OPTICA_TIMEOUT_SECS"),
            }
        }

        if let Some(raw) = lookup("OPTICA_PAGE_SIZE") {
            match raw.trim().parse() {
                Ok(size) => self.display.page_size = size,
                Err(_) => warn!(value = %raw, "Ignoring invalid OPTICA_PAGE_SIZE"),
            }
        }

        if let Some(raw) = lookup("OPTICA_ALERT_SECS") {
            match raw.trim().parse() {
                Ok(secs) => self.display.alert_secs = secs,
                Err(_) => warn!(value = %raw, "Ignoring invalid OPTICA_ALERT_SECS"),
            }
        }
    }

    pub fn validate(&self) -> ApiResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ApiError::Config("timeout_secs must be greater than 0".into()));
        }

        validate_page_size(self.display.page_size).map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(())
    }

    /// Parsed base URL (validated by [`ConsoleConfig::validate`]).
    pub fn base_url(&self) -> ApiResult<Url> {
        Ok(Url::parse(&self.api.base_url)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Screen settings derived from the display section.
    pub fn screen_settings(&self) -> ScreenSettings {
        ScreenSettings {
            page_size: self.display.page_size,
            notification_ttl: Duration::from_secs(self.display.alert_secs),
        }
    }

    /// `<config dir>/optica/console.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("sv", "optica", "optica")
            .map(|dirs| dirs.config_dir().join("console.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ConsoleConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:4000/api");
        assert_eq!(config.display.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ConsoleConfig = toml::from_str("[display]\npage_size = 25\n").unwrap();
        assert_eq!(config.display.page_size, 25);
        assert_eq!(config.display.alert_secs, DEFAULT_NOTIFICATION_SECS);
        assert_eq!(config.api, ApiSettings::default());
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("OPTICA_API_URL", "https://optica.example.com/api"),
            ("OPTICA_PAGE_SIZE", "20"),
            ("OPTICA_ALERT_SECS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = ConsoleConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.api.base_url, "https://optica.example.com/api");
        assert_eq!(config.display.page_size, 20);
        assert_eq!(config.display.alert_secs, DEFAULT_NOTIFICATION_SECS);
        assert_eq!(config.screen_settings().page_size, 20);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ConsoleConfig::default();

        config.api.base_url = "ftp://files.example.com".into();
        assert!(config.validate().is_err());

        config.api.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(ApiError::Config(_))));

        config.api.base_url = default_base_url();
        config.display.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.toml");
        std::fs::write(&path, "[api]\nbase_url = \"http://10.0.0.5:4000/api\"\ntimeout_secs = 30\n").unwrap();

        let config = ConsoleConfig::load(Some(path)).unwrap();
        assert_eq!(config.api.timeout_secs, 30);
    }
}
