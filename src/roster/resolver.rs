//! Identity resolution capability.

use async_trait::async_trait;

use super::types::{DatabaseId, IdentityToken};
use crate::error::ResolveError;

/// Maps an account database id to its durable identity token.
///
/// The production implementation is a ServerQuery round trip
/// (`crate::query::QueryResolver`); tests inject a table.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, database_id: DatabaseId) -> Result<IdentityToken, ResolveError>;
}

#[async_trait]
impl<R: IdentityResolver + ?Sized> IdentityResolver for std::sync::Arc<R> {
    async fn resolve(&self, database_id: DatabaseId) -> Result<IdentityToken, ResolveError> {
        (**self).resolve(database_id).await
    }
}
