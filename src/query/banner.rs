//! Banner writes over ServerQuery.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::QueryClient;
use crate::dispatch::BannerWriter;
use crate::error::EffectError;

/// Writes the host banner URL with `serveredit`.
pub struct ServerBanner {
    client: Arc<QueryClient>,
}

impl ServerBanner {
    pub fn new(client: Arc<QueryClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BannerWriter for ServerBanner {
    async fn write_banner(&self, value: &str) -> Result<(), EffectError> {
        self.client.set_host_banner(value).await?;
        Ok(())
    }
}
