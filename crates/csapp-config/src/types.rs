//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [api]
//! base_url = "https://api.example.com/api/v1"
//! timeout_secs = 15
//!
//! [web]
//! bind_address = "127.0.0.1:3000"
//! public_url = "https://app.example.com"
//! secure_cookies = true
//!
//! [logging]
//! file = true
//! directory = "/var/log/csapp"
//! ```
//!
//! # Environment Variables
//!
//! - `CSAPP_API_URL` - Override the API base URL
//! - `CSAPP_CONFIG_DIR` - Override the user config directory

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "CSAPP_API_URL";

/// API base URL used when nothing else is configured (local backend).
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default bind address for the web gateway.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsappConfig {
    /// Backend API connection.
    pub api: Option<ApiConfig>,

    /// Web gateway settings.
    pub web: Option<WebConfig>,

    /// Log output settings.
    pub logging: Option<LoggingConfig>,
}

impl CsappConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: CsappConfig) {
        match (&mut self.api, other.api) {
            (Some(base), Some(over)) => base.merge(over),
            (slot, Some(over)) => *slot = Some(over),
            _ => {}
        }
        match (&mut self.web, other.web) {
            (Some(base), Some(over)) => base.merge(over),
            (slot, Some(over)) => *slot = Some(over),
            _ => {}
        }
        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// API base URL after applying the `CSAPP_API_URL` override.
    pub fn api_base_url(&self) -> String {
        let env = std::env::var(API_URL_ENV).ok();
        resolve_api_url(
            env.as_deref(),
            self.api.as_ref().and_then(|a| a.base_url.as_deref()),
        )
    }

    /// Per-request timeout for API calls.
    pub fn api_timeout(&self) -> Duration {
        let secs = self
            .api
            .as_ref()
            .and_then(|a| a.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Address the web gateway binds to.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        let raw = self
            .web
            .as_ref()
            .and_then(|w| w.bind_address.as_deref())
            .unwrap_or(DEFAULT_BIND_ADDRESS);
        raw.parse().map_err(|e| ConfigError::InvalidValue {
            field: "web.bind_address".to_string(),
            reason: format!("{}", e),
        })
    }

    /// Whether cookies must carry the `Secure` attribute.
    ///
    /// An explicit `web.secure_cookies` wins; otherwise cookies are secure
    /// when the gateway's public URL is served over https.
    pub fn secure_cookies(&self) -> bool {
        let Some(web) = &self.web else {
            return false;
        };
        if let Some(secure) = web.secure_cookies {
            return secure;
        }
        web.public_url
            .as_deref()
            .and_then(|u| url::Url::parse(u).ok())
            .is_some_and(|u| u.scheme() == "https")
    }
}

/// Pick the API base URL: environment first, then config, then the default.
/// Blank values are ignored.
pub fn resolve_api_url(env_value: Option<&str>, configured: Option<&str>) -> String {
    env_value
        .filter(|v| !v.trim().is_empty())
        .or(configured.filter(|v| !v.trim().is_empty()))
        .unwrap_or(DEFAULT_API_URL)
        .trim()
        .to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// `[api]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API, including any version prefix.
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl ApiConfig {
    fn merge(&mut self, other: ApiConfig) {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }
}

/// `[web]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Socket address to listen on.
    pub bind_address: Option<String>,
    /// Externally visible URL of the gateway.
    pub public_url: Option<String>,
    /// Force the `Secure` cookie attribute on or off.
    pub secure_cookies: Option<bool>,
}

impl WebConfig {
    fn merge(&mut self, other: WebConfig) {
        if other.bind_address.is_some() {
            self.bind_address = other.bind_address;
        }
        if other.public_url.is_some() {
            self.public_url = other.public_url;
        }
        if other.secure_cookies.is_some() {
            self.secure_cookies = other.secure_cookies;
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write a rotating JSON log file in addition to console output.
    pub file: bool,
    /// Directory for log files. Defaults to `<config dir>/logs`.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: true,
            directory: None,
        }
    }
}
