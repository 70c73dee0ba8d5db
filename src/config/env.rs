//! `TS_*` environment overlay.
//!
//! Variables override the corresponding TOML values when set and non-empty.

use std::str::FromStr;

use super::types::{Config, ConfigError};

pub const DISCORD_WEBHOOK: &str = "TS_DISCORD_WEBHOOK";
pub const DISCORD_USERNAME: &str = "TS_DISCORD_USERNAME";
pub const DISCORD_AVATAR: &str = "TS_DISCORD_AVATAR";
pub const QUERY_ADDR: &str = "TS_QUERY_ADDR";
pub const QUERY_USER: &str = "TS_QUERY_USER";
pub const QUERY_PASS: &str = "TS_QUERY_PASS";
pub const QUERY_SERVER_ID: &str = "TS_QUERY_SERVER_ID";
pub const SPOTLIGHT_GFX_FMT: &str = "TS_SPOTLIGHT_GFX_FMT";
pub const SPOTLIGHT_ID_MAP: &str = "TS_SPOTLIGHT_ID_MAP";
pub const RESOLVE_FAILURE: &str = "TS_RESOLVE_FAILURE";
pub const METRICS_PORT: &str = "TS_METRICS_PORT";

impl Config {
    /// Overlay variables obtained from `lookup` onto this config.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.is_empty());

        if let Some(v) = get(DISCORD_WEBHOOK) {
            self.discord.webhook = v;
        }
        if let Some(v) = get(DISCORD_USERNAME) {
            self.discord.username = v;
        }
        if let Some(v) = get(DISCORD_AVATAR) {
            self.discord.avatar = Some(v);
        }
        if let Some(v) = get(QUERY_ADDR) {
            self.query.address = v;
        }
        if let Some(v) = get(QUERY_USER) {
            self.query.user = v;
        }
        if let Some(v) = get(QUERY_PASS) {
            self.query.password = v;
        }
        if let Some(v) = get(QUERY_SERVER_ID) {
            self.query.server_id = parse_var(QUERY_SERVER_ID, &v)?;
        }
        if let Some(v) = get(SPOTLIGHT_GFX_FMT) {
            self.banner.gfx_format = Some(v);
        }
        if let Some(v) = get(SPOTLIGHT_ID_MAP) {
            for (token, slot) in parse_id_map(&v)? {
                self.banner.slots.insert(token, slot);
            }
        }
        if let Some(v) = get(RESOLVE_FAILURE) {
            self.query.on_resolve_failure = parse_var(RESOLVE_FAILURE, &v)?;
        }
        if let Some(v) = get(METRICS_PORT) {
            self.metrics.port = Some(parse_var(METRICS_PORT, &v)?);
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}

/// Parse `token:slot,token:slot`. Empty entries are skipped; tokens are
/// checked later by validation.
fn parse_id_map(raw: &str) -> Result<Vec<(String, u32)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let invalid = || ConfigError::InvalidEnv {
                var: SPOTLIGHT_ID_MAP,
                value: entry.to_string(),
            };
            let (token, slot) = entry.rsplit_once(':').ok_or_else(invalid)?;
            let slot = slot.trim().parse().map_err(|_| invalid())?;
            Ok((token.trim().to_string(), slot))
        })
        .collect()
}
