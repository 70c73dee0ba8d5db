//! Unified error handling for ts-activity.
//!
//! One error enum per layer. Only [`RosterError`] and [`BridgeError`] are
//! fatal to the event loop; query, resolve and effect errors are confined to
//! a single command, join or side effect.

use thiserror::Error;
use ts_query_proto::ProtocolError;

use crate::roster::{DatabaseId, SessionHandle};

// ============================================================================
// Query Errors (ServerQuery round trips)
// ============================================================================

/// Errors from a single ServerQuery command.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("server rejected command (id {id}): {msg}")]
    Server { id: u32, msg: String },

    #[error("command timed out")]
    Timeout,

    #[error("query connection closed")]
    ConnectionClosed,

    #[error("reply is missing field {0:?}")]
    MissingField(&'static str),
}

impl QueryError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Protocol(_) => "protocol",
            Self::Server { .. } => "server",
            Self::Timeout => "timeout",
            Self::ConnectionClosed => "connection_closed",
            Self::MissingField(_) => "missing_field",
        }
    }
}

// ============================================================================
// Identity Resolution Errors
// ============================================================================

/// Failure to turn a database id into a durable identity token.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("identity lookup failed: {0}")]
    Query(#[from] QueryError),

    #[error("identity lookup timed out")]
    Timeout,

    #[error("no identity for database id {0}")]
    NotFound(DatabaseId),
}

// ============================================================================
// Effect Errors (notification / banner write)
// ============================================================================

/// Failure to deliver a side effect. Always logged and dropped.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("webhook request failed: {0}")]
    Webhook(#[from] reqwest::Error),

    #[error("webhook returned HTTP {0}")]
    WebhookStatus(u16),

    #[error("banner write failed: {0}")]
    Query(#[from] QueryError),
}

// ============================================================================
// Roster / Bridge Errors (fatal)
// ============================================================================

/// Errors that leave the roster unable to continue.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("could not resolve identity for session {handle}: {source}")]
    Unresolved {
        handle: SessionHandle,
        #[source]
        source: ResolveError,
    },
}

/// Errors that end the bridge event loop.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("event stream ended: query connection lost")]
    ConnectionLost,
}
