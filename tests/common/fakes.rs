//! In-memory collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ts_activity::dispatch::{BannerWriter, Notifier};
use ts_activity::error::{EffectError, ResolveError};
use ts_activity::roster::{DatabaseId, IdentityResolver, IdentityToken};

/// Resolves database ids from a fixed table; unknown ids fail.
#[derive(Clone, Default)]
pub struct TableResolver {
    table: HashMap<u64, String>,
}

impl TableResolver {
    pub fn new(entries: &[(u64, &str)]) -> Self {
        Self {
            table: entries.iter().map(|(id, t)| (*id, t.to_string())).collect(),
        }
    }
}

#[async_trait]
impl IdentityResolver for TableResolver {
    async fn resolve(&self, database_id: DatabaseId) -> Result<IdentityToken, ResolveError> {
        self.table
            .get(&database_id.0)
            .map(|t| IdentityToken::new(t.as_str()))
            .ok_or(ResolveError::NotFound(database_id))
    }
}

/// Records every notification or banner value it receives.
#[derive(Clone, Default)]
pub struct Recorder {
    received: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.received.lock().unwrap().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for Recorder {
    async fn notify(&self, content: &str) -> Result<(), EffectError> {
        self.received.lock().unwrap().push(content.to_string());
        Ok(())
    }
}

#[async_trait]
impl BannerWriter for Recorder {
    async fn write_banner(&self, value: &str) -> Result<(), EffectError> {
        self.received.lock().unwrap().push(value.to_string());
        Ok(())
    }
}
