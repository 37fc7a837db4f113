//! CLI command handlers.

pub mod api;
pub mod auth;
pub mod clients;
pub mod invoices;
pub mod serve;
pub mod whoami;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use console::{Style, style};
use csapp_client::{ApiClient, FileTokenStore, SharedTokenStore};
use csapp_config::CsappConfig;
use csapp_session::{AuthSession, RecordingNavigator};
use serde::Serialize;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Backend API base URL.
    pub api_url: String,
    /// Directory holding config, tokens and logs.
    pub config_dir: PathBuf,
    /// Merged configuration.
    pub config: CsappConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Load configuration layers and resolve the API URL.
    ///
    /// `--api-url` (or `CSAPP_API_URL`) wins over the `[api]` section.
    pub fn load(
        config_dir: PathBuf,
        api_url: Option<String>,
        json_output: bool,
        verbose: bool,
    ) -> Result<Self> {
        let loaded = csapp_config::load_config_with_options(None, Some(&config_dir))?;
        for warning in &loaded.warnings {
            tracing::warn!(warning = %warning, "Config layer skipped");
        }
        tracing::debug!(sources = ?loaded.loaded_from(), "Configuration loaded");

        let config = loaded.config;
        let api_url = api_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| config.api_base_url());

        Ok(Self {
            api_url,
            config_dir,
            config,
            json_output,
            verbose,
        })
    }

    /// Token file store in the config directory.
    pub fn token_store(&self) -> Arc<FileTokenStore> {
        Arc::new(FileTokenStore::new(&self.config_dir))
    }

    /// Authenticated client persisting tokens to the config directory.
    pub fn client(&self) -> Result<ApiClient> {
        let tokens: SharedTokenStore = self.token_store();
        Ok(ApiClient::builder()
            .base_url(&self.api_url)
            .timeout(self.config.api_timeout())
            .token_store(tokens)
            .build()?)
    }

    /// Session over [`Context::client`]; navigation is only recorded.
    pub fn session(&self) -> Result<(AuthSession, Arc<RecordingNavigator>)> {
        let navigator = Arc::new(RecordingNavigator::new());
        let session = AuthSession::new(self.client()?, navigator.clone());
        Ok((session, navigator))
    }

    /// Print a value as pretty JSON.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Print a section title with a rule under it.
pub fn heading(title: &str) {
    let dim = Style::new().dim();
    println!("{}", style(title).bold());
    println!("{}", dim.apply_to("─".repeat(50)));
}

/// Wire name of a serializable enum (`"defaulter"`).
pub fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => "?".to_string(),
    }
}

/// Print a command failure to stderr.
///
/// Validation failures get one line per field; an expired session points
/// at `auth login`.
pub fn report_error(error: &anyhow::Error) {
    let red = Style::new().red();
    let dim = Style::new().dim();

    let Some(api_error) = error.downcast_ref::<csapp_client::Error>() else {
        eprintln!("{} {:#}", red.apply_to("Error:"), error);
        return;
    };

    if let Some(fields) = api_error.field_errors() {
        eprintln!("{} validation failed", red.apply_to("Error:"));
        for field in fields {
            eprintln!("  {}", field);
        }
    } else if api_error.is_session_expired() {
        eprintln!("{} session expired", red.apply_to("Error:"));
        eprintln!("{}", dim.apply_to("Sign in again with: csapp auth login"));
    } else if api_error.is_offline() {
        eprintln!("{} {}", red.apply_to("Error:"), api_error);
        eprintln!("{}", dim.apply_to("Is the backend running? Check --api-url."));
    } else {
        eprintln!("{} {}", red.apply_to("Error:"), api_error);
    }
}
