//! Configuration management
//!
//! Settings live in `<app_dir>/settings.json`:
//! ```json
//! {
//!   "api": { "baseUrl": "/api", "origin": "http://localhost:5000", "timeoutSecs": 30 },
//!   ...
//! }
//! ```
//! Environment variables take precedence over the file.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::adapters::reqwest_transport::DEFAULT_TIMEOUT_SECS;
use crate::domain::result::Error;

/// Default API base URL (relative to `origin`)
pub const DEFAULT_API_URL: &str = "/api";

/// Default origin used to resolve a relative base URL
pub const DEFAULT_ORIGIN: &str = "http://localhost:5000";

/// Overrides the API base URL
pub const API_URL_ENV: &str = "FINANZAS_API_URL";

/// Overrides the origin
pub const API_ORIGIN_ENV: &str = "FINANZAS_API_ORIGIN";

/// Overrides the request timeout (seconds)
pub const TIMEOUT_ENV: &str = "FINANZAS_TIMEOUT_SECS";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Finanzas configuration (resolved view of settings + environment)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub origin: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load config from the application directory
    ///
    /// Precedence: environment variable > settings.json > default.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let raw = read_settings(app_dir)?;

        let api_url = env_value(API_URL_ENV)
            .or(raw.api.base_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let origin = env_value(API_ORIGIN_ENV)
            .or(raw.api.origin)
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());

        let timeout_secs = env_value(TIMEOUT_ENV)
            .and_then(|v| v.parse::<u64>().ok())
            .or(raw.api.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            api_url,
            origin,
            timeout_secs,
        })
    }

    /// Save config to the application directory
    /// Preserves other settings this crate doesn't manage
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let settings_path = app_dir.join("settings.json");
        let mut settings = read_settings(app_dir)?;

        settings.api.base_url = Some(self.api_url.clone());
        settings.api.origin = Some(self.origin.clone());
        settings.api.timeout_secs = Some(self.timeout_secs);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Absolute base URL, always ending in `/` so relative joins append
    ///
    /// A relative `api_url` such as `/api` is resolved against `origin`.
    pub fn base_url(&self) -> crate::domain::result::Result<Url> {
        let raw = self.api_url.trim();
        let mut url = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let origin = Url::parse(self.origin.trim()).map_err(|e| {
                    Error::Config(format!("Invalid API origin '{}': {}", self.origin, e))
                })?;
                origin.join(raw).map_err(|e| {
                    Error::Config(format!("Invalid API base URL '{}': {}", raw, e))
                })?
            }
            Err(e) => {
                return Err(Error::Config(format!(
                    "Invalid API base URL '{}': {}",
                    raw, e
                )))
            }
        };

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }
}

fn read_settings(app_dir: &Path) -> Result<SettingsFile> {
    let settings_path = app_dir.join("settings.json");
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
