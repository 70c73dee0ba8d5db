use async_trait::async_trait;
use tracing::{info, warn};

use crate::banner::{BannerTemplate, BannerToken};
use crate::error::EffectError;

/// Direction of a presence change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceKind {
    Connected,
    Disconnected,
}

/// Side effect derived from a roster transition.
///
/// The bridge produces effects; the dispatcher delivers them. Delivery is
/// best-effort: failures are logged and dropped, never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Post a presence line to the notification channel.
    Notify {
        kind: PresenceKind,
        display_name: String,
    },
    /// Push a freshly derived banner token to the server.
    UpdateBanner { token: BannerToken },
}

/// Notification channel (a chat webhook in production).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, content: &str) -> Result<(), EffectError>;
}

/// Writes the rendered banner value to the live server.
#[async_trait]
pub trait BannerWriter: Send + Sync {
    async fn write_banner(&self, value: &str) -> Result<(), EffectError>;
}

/// Human-readable presence line.
pub fn presence_message(kind: PresenceKind, display_name: &str) -> String {
    match kind {
        PresenceKind::Connected => format!("Client connected: {}", display_name),
        PresenceKind::Disconnected => format!("Client disconnected: {}", display_name),
    }
}

/// Delivers effects to the external collaborators.
pub struct EffectDispatcher<N, B> {
    notifier: N,
    /// `None` when no banner template is configured.
    banner: Option<(BannerTemplate, B)>,
}

impl<N: Notifier, B: BannerWriter> EffectDispatcher<N, B> {
    pub fn new(notifier: N, banner: Option<(BannerTemplate, B)>) -> Self {
        Self { notifier, banner }
    }

    pub fn banner_enabled(&self) -> bool {
        self.banner.is_some()
    }

    /// Apply a list of effects sequentially.
    pub async fn apply_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.apply_effect(effect).await;
        }
    }

    /// Apply a single effect. Never fails.
    pub async fn apply_effect(&self, effect: Effect) {
        match effect {
            Effect::Notify { kind, display_name } => {
                let content = presence_message(kind, &display_name);
                match self.notifier.notify(&content).await {
                    Ok(()) => crate::metrics::record_notification("ok"),
                    Err(e) => {
                        crate::metrics::record_notification("failed");
                        warn!(error = %e, content = %content, "Failed to send notification");
                    }
                }
            }

            Effect::UpdateBanner { token } => {
                let Some((template, writer)) = &self.banner else {
                    return;
                };
                let value = template.render(&token);
                match writer.write_banner(&value).await {
                    Ok(()) => {
                        crate::metrics::record_banner_update("ok");
                        info!(banner = %value, "Updated banner");
                    }
                    Err(e) => {
                        crate::metrics::record_banner_update("failed");
                        warn!(banner = %value, error = %e, "Failed to update banner");
                    }
                }
            }
        }
    }
}
