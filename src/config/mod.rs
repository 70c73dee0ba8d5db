//! Configuration loading and management.
//!
//! - [`types`]: Config struct definitions and loading
//! - [`env`]: `TS_*` environment overlay
//! - [`validation`]: Startup validation

mod env;
mod types;
mod validation;

pub use types::{BannerConfig, Config, ConfigError, DiscordConfig, MetricsConfig, QueryConfig};
pub use validation::{ValidationError, validate, warn_suspicious_tokens};
