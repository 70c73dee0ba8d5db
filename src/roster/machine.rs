//! The roster state machine.
//!
//! Per session handle the state is binary: absent or present.
//!
//! ```text
//!            Join (voice, resolved)
//!   absent ─────────────────────────► present
//!      ▲                                 │
//!      └───────────── Leave ─────────────┘
//! ```
//!
//! Joins for present handles and leaves for absent handles are no-ops. The
//! roster is owned by a single consumer and is never shared; every method
//! that mutates it takes `&mut self`.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::event::{IgnoreReason, RosterEvent, Transition};
use super::resolver::IdentityResolver;
use super::types::{IdentityToken, Participant, RosterEntry, SessionHandle};
use crate::error::RosterError;

/// What to do when a joining client's identity cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvePolicy {
    /// Fail the transition; the bridge shuts down.
    #[default]
    Abort,
    /// Admit the client without an identity. It is still announced but
    /// contributes nothing to the banner.
    Skip,
}

impl std::str::FromStr for ResolvePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(format!("expected 'abort' or 'skip', got '{}'", other)),
        }
    }
}

/// Authoritative view of who is connected.
pub struct Roster<R> {
    entries: HashMap<SessionHandle, RosterEntry>,
    resolver: R,
    policy: ResolvePolicy,
}

impl<R: IdentityResolver> Roster<R> {
    pub fn new(resolver: R, policy: ResolvePolicy) -> Self {
        Self {
            entries: HashMap::new(),
            resolver,
            policy,
        }
    }

    /// Replace the roster with a full snapshot. No transitions are reported.
    ///
    /// Entries absent from the snapshot are dropped, so this doubles as a
    /// resync. On a fatal resolve error the previous roster is kept.
    pub async fn fill(&mut self, snapshot: Vec<Participant>) -> Result<usize, RosterError> {
        let mut entries = HashMap::with_capacity(snapshot.len());

        for participant in snapshot {
            if !participant.client_type.is_voice() || entries.contains_key(&participant.handle) {
                continue;
            }
            let entry = self.admit(&participant).await?;
            debug!(
                handle = %participant.handle,
                name = %participant.display_name,
                identity = ?entry.identity,
                "Snapshot client"
            );
            entries.insert(participant.handle, entry);
        }

        self.entries = entries;
        Ok(self.entries.len())
    }

    /// Apply one event.
    pub async fn apply(&mut self, event: RosterEvent) -> Result<Transition, RosterError> {
        match event {
            RosterEvent::Join(participant) => {
                if !participant.client_type.is_voice() {
                    debug!(handle = %participant.handle, client_type = ?participant.client_type, "Ignoring non-voice client");
                    return Ok(Transition::Ignored(IgnoreReason::Filtered));
                }
                if self.entries.contains_key(&participant.handle) {
                    debug!(handle = %participant.handle, "Duplicate join");
                    return Ok(Transition::Ignored(IgnoreReason::Duplicate));
                }

                let entry = self.admit(&participant).await?;
                info!(handle = %participant.handle, name = %participant.display_name, "Client connected");
                self.entries.insert(participant.handle, entry);

                Ok(Transition::Connected {
                    handle: participant.handle,
                    display_name: participant.display_name,
                })
            }
            RosterEvent::Leave { handle } => match self.entries.remove(&handle) {
                Some(entry) => {
                    info!(handle = %handle, name = %entry.display_name, "Client disconnected");
                    Ok(Transition::Disconnected {
                        handle,
                        display_name: entry.display_name,
                    })
                }
                None => {
                    info!(handle = %handle, "Unknown client left");
                    Ok(Transition::Ignored(IgnoreReason::UnknownSession))
                }
            },
        }
    }

    async fn admit(&self, participant: &Participant) -> Result<RosterEntry, RosterError> {
        let identity = match self.resolver.resolve(participant.database_id).await {
            Ok(identity) => Some(identity),
            Err(source) => {
                crate::metrics::record_resolve_failure();
                match self.policy {
                    ResolvePolicy::Abort => {
                        return Err(RosterError::Unresolved {
                            handle: participant.handle,
                            source,
                        });
                    }
                    ResolvePolicy::Skip => {
                        warn!(
                            handle = %participant.handle,
                            database_id = %participant.database_id,
                            error = %source,
                            "Identity unresolved; client will not appear in banner"
                        );
                        None
                    }
                }
            }
        };

        Ok(RosterEntry {
            display_name: participant.display_name.clone(),
            identity,
        })
    }

    /// Identities of all present sessions that have one.
    pub fn identities(&self) -> impl Iterator<Item = &IdentityToken> {
        self.entries.values().filter_map(|e| e.identity.as_ref())
    }

    pub fn get(&self, handle: SessionHandle) -> Option<&RosterEntry> {
        self.entries.get(&handle)
    }

    pub fn contains(&self, handle: SessionHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
