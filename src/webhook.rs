//! Discord webhook notifier.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::dispatch::Notifier;
use crate::error::EffectError;

/// Upper bound on one webhook delivery.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
}

/// Posts presence lines to a Discord-compatible webhook URL.
pub struct DiscordWebhook {
    http_client: reqwest::Client,
    url: String,
    username: String,
    avatar_url: Option<String>,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>, username: impl Into<String>, avatar_url: Option<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            url: url.into(),
            username: username.into(),
            avatar_url,
        }
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn notify(&self, content: &str) -> Result<(), EffectError> {
        let payload = WebhookPayload {
            content,
            username: &self.username,
            avatar_url: self.avatar_url.as_deref(),
        };

        let response = self.http_client.post(&self.url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EffectError::WebhookStatus(status.as_u16()));
        }

        debug!(status = %status, "Webhook delivered");
        Ok(())
    }
}
