//! Core configuration types and loading.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::validation::ValidationError;
use crate::banner::{BannerTemplate, TemplateError};
use crate::roster::ResolvePolicy;
use crate::slots::SlotTable;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("invalid configuration: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bridge configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Notification webhook.
    #[serde(default)]
    pub discord: DiscordConfig,
    /// ServerQuery connection.
    #[serde(default)]
    pub query: QueryConfig,
    /// Host banner slots. Disabled unless `gfx_format` is set.
    #[serde(default)]
    pub banner: BannerConfig,
    /// Prometheus endpoint.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Parse a TOML file without overlaying the environment or validating.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration: the TOML file at `path` (or defaults), then the
    /// `TS_*` environment, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |var| std::env::var(var).ok())
    }

    /// [`load`](Self::load) with an explicit environment lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_from(lookup)?;
        super::validation::validate(&config).map_err(ConfigError::Invalid)?;
        super::validation::warn_suspicious_tokens(&config);
        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Webhook URL (required).
    #[serde(default)]
    pub webhook: String,
    /// Sender display name.
    #[serde(default = "default_username")]
    pub username: String,
    /// Sender avatar URL.
    pub avatar: Option<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook: String::new(),
            username: default_username(),
            avatar: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// `host:port` of the ServerQuery interface.
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Virtual server to select with `use`.
    #[serde(default = "default_server_id")]
    pub server_id: u32,
    /// Per-command response timeout in seconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
    /// Seconds between keepalive commands.
    #[serde(default = "default_keepalive")]
    pub keepalive_secs: u64,
    /// Behavior when a joining client's identity cannot be resolved.
    #[serde(default)]
    pub on_resolve_failure: ResolvePolicy,
}

impl QueryConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            user: String::new(),
            password: String::new(),
            server_id: default_server_id(),
            command_timeout_secs: default_command_timeout(),
            keepalive_secs: default_keepalive(),
            on_resolve_failure: ResolvePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BannerConfig {
    /// printf-style template with exactly one `%s`, e.g.
    /// `https://example.com/banner/%s.png`.
    pub gfx_format: Option<String>,
    /// Identity token → slot number.
    #[serde(default)]
    pub slots: BTreeMap<String, u32>,
}

impl BannerConfig {
    /// Parsed template; `None` when the banner feature is off.
    pub fn template(&self) -> Result<Option<BannerTemplate>, TemplateError> {
        match &self.gfx_format {
            Some(format) => BannerTemplate::parse(format),
            None => Ok(None),
        }
    }

    pub fn slot_table(&self) -> SlotTable {
        self.slots
            .iter()
            .map(|(token, slot)| (token.as_str(), *slot))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// HTTP port for `/metrics`. Unset or `0` disables the endpoint.
    pub port: Option<u16>,
}

impl MetricsConfig {
    pub fn enabled_port(&self) -> Option<u16> {
        self.port.filter(|&p| p != 0)
    }
}

fn default_username() -> String {
    "TeamSpeak".to_string()
}

fn default_server_id() -> u32 {
    1
}

fn default_command_timeout() -> u64 {
    10
}

fn default_keepalive() -> u64 {
    200
}
