//! Identity resolution over ServerQuery.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::client::QueryClient;
use crate::error::{QueryError, ResolveError};
use crate::roster::{DatabaseId, IdentityResolver, IdentityToken};

/// Server error id for an unknown database id.
const ERROR_INVALID_CLIENT_ID: u32 = 512;
/// Server error id for an empty result set.
const ERROR_EMPTY_RESULT: u32 = 1281;

/// Resolves identities with `clientgetnamefromdbid`.
pub struct QueryResolver {
    client: Arc<QueryClient>,
    timeout: Duration,
}

impl QueryResolver {
    pub fn new(client: Arc<QueryClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl IdentityResolver for QueryResolver {
    async fn resolve(&self, database_id: DatabaseId) -> Result<IdentityToken, ResolveError> {
        match self.client.client_uid_from_dbid(database_id, self.timeout).await {
            Ok(token) => {
                debug!(database_id = %database_id, identity = %token, "Resolved identity");
                Ok(token)
            }
            Err(e) => Err(classify(database_id, e)),
        }
    }
}

fn classify(database_id: DatabaseId, err: QueryError) -> ResolveError {
    match err {
        QueryError::Timeout => ResolveError::Timeout,
        QueryError::MissingField(_) => ResolveError::NotFound(database_id),
        QueryError::Server { id, .. } if id == ERROR_INVALID_CLIENT_ID || id == ERROR_EMPTY_RESULT => {
            ResolveError::NotFound(database_id)
        }
        other => ResolveError::Query(other),
    }
}
