//! Roster value types.

use std::fmt;
use std::str::FromStr;

/// Ephemeral per-connection id assigned by the server (`clid`).
///
/// Unique only while connected; the server reuses it after a disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionHandle(pub u32);

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionHandle {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Per-account database id (`client_database_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatabaseId(pub u64);

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DatabaseId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Durable identity token (the account's unique identifier, base64).
///
/// Stable across reconnects; the key for slot mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for IdentityToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Connection kind reported in `client_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    /// A regular voice client (a human).
    Voice,
    /// A ServerQuery connection (bots, this process included).
    Query,
    Other(u32),
}

impl ClientType {
    /// Only voice clients are tracked in the roster.
    pub fn is_voice(self) -> bool {
        matches!(self, Self::Voice)
    }
}

impl From<u32> for ClientType {
    fn from(raw: u32) -> Self {
        match raw {
            0 => Self::Voice,
            1 => Self::Query,
            n => Self::Other(n),
        }
    }
}

/// A connected client as reported by a snapshot or a join event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub handle: SessionHandle,
    pub display_name: String,
    pub client_type: ClientType,
    pub database_id: DatabaseId,
}

impl Participant {
    /// Shorthand for a voice client; mostly used by tests.
    pub fn voice(handle: u32, display_name: &str, database_id: u64) -> Self {
        Self {
            handle: SessionHandle(handle),
            display_name: display_name.to_string(),
            client_type: ClientType::Voice,
            database_id: DatabaseId(database_id),
        }
    }
}

/// What the roster remembers about a present session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub display_name: String,
    /// `None` only when resolution failed under the `skip` policy.
    pub identity: Option<IdentityToken>,
}
