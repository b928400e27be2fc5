//! Workspace configuration for the notiva SDK.

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "notiva.toml";
const ENV_PREFIX: &str = "NOTIVA_";

/// Workspace credentials and endpoint configuration.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables prefixed `NOTIVA_` (highest priority)
/// 2. Configuration file (`notiva.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// `workspace_key` and `workspace_secret` have no defaults and must be
/// supplied by the environment or config file.
///
/// # Example
///
/// ```no_run
/// use notiva_core::Config;
///
/// let config = Config::load().expect("failed to load configuration");
/// assert!(config.base_url.ends_with('/'));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the platform's ingestion API. Must end with `/`.
    ///
    /// Environment variable: `NOTIVA_BASE_URL`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Workspace key identifying the tenant workspace. Travels in every
    /// record's `env` field and in the `Authorization` header.
    ///
    /// Environment variable: `NOTIVA_WORKSPACE_KEY`
    #[serde(default)]
    pub workspace_key: String,

    /// Workspace secret handed to the request signer. Never logged.
    ///
    /// Environment variable: `NOTIVA_WORKSPACE_SECRET`
    #[serde(default)]
    pub workspace_secret: String,

    /// User agent reported on every request and stamped into each record
    /// as `$sdk_version`.
    ///
    /// Environment variable: `NOTIVA_USER_AGENT`
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `NOTIVA_REQUEST_TIMEOUT_SECONDS`
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Config {
    /// Loads configuration from defaults, `notiva.toml`, and `NOTIVA_*`
    /// environment overrides, then validates it.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX));

        let config: Self = figment.extract().context("failed to load configuration")?;
        config.validate()?;
        tracing::debug!(
            base_url = %config.base_url,
            timeout_seconds = config.request_timeout_seconds,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Joins an API path onto the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("base_url must not be empty");
        }

        if !self.base_url.ends_with('/') {
            anyhow::bail!("base_url must end with a trailing slash");
        }

        if self.workspace_key.is_empty() {
            anyhow::bail!("workspace_key must not be empty");
        }

        if self.workspace_secret.is_empty() {
            anyhow::bail!("workspace_secret must not be empty");
        }

        if self.request_timeout_seconds == 0 {
            anyhow::bail!("request_timeout_seconds must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            workspace_key: String::new(),
            workspace_secret: String::new(),
            user_agent: default_user_agent(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://hub.notiva.dev/".to_string()
}

fn default_user_agent() -> String {
    concat!("notiva-rust/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout() -> u64 {
    30
}
