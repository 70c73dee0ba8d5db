//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use super::Config;
use crate::banner::TemplateError;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("discord.webhook is required")]
    MissingWebhook,
    #[error("discord.webhook must be an http(s) URL, got '{0}'")]
    InvalidWebhookUrl(String),
    #[error("query.address is required")]
    MissingQueryAddress,
    #[error("query.user is required")]
    MissingQueryUser,
    #[error("query.password is required")]
    MissingQueryPassword,
    #[error("query.{0} must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("banner.gfx_format: {0}")]
    InvalidBannerTemplate(#[from] TemplateError),
    #[error("banner.slots contains an empty identity token")]
    EmptySlotToken,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Notification destination
    let webhook = &config.discord.webhook;
    if webhook.is_empty() {
        errors.push(ValidationError::MissingWebhook);
    } else if !(webhook.starts_with("http://") || webhook.starts_with("https://")) {
        errors.push(ValidationError::InvalidWebhookUrl(webhook.clone()));
    }

    // Query credentials
    if config.query.address.is_empty() {
        errors.push(ValidationError::MissingQueryAddress);
    }
    if config.query.user.is_empty() {
        errors.push(ValidationError::MissingQueryUser);
    }
    if config.query.password.is_empty() {
        errors.push(ValidationError::MissingQueryPassword);
    }
    if config.query.command_timeout_secs == 0 {
        errors.push(ValidationError::ZeroInterval("command_timeout_secs"));
    }
    if config.query.keepalive_secs == 0 {
        errors.push(ValidationError::ZeroInterval("keepalive_secs"));
    }

    // Banner
    if let Err(e) = config.banner.template() {
        errors.push(e.into());
    }
    if config.banner.slots.keys().any(|token| token.is_empty()) {
        errors.push(ValidationError::EmptySlotToken);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Warn about slot tokens that do not look like identity tokens.
///
/// Identity tokens are base64; anything else will never match a client, but
/// is not fatal.
pub fn warn_suspicious_tokens(config: &Config) -> usize {
    let mut suspicious = 0;
    for token in config.banner.slots.keys() {
        if !token.is_empty() && STANDARD.decode(token).is_err() {
            suspicious += 1;
            tracing::warn!(token = %token, "Slot token is not valid base64 and may never match");
        }
    }
    suspicious
}
