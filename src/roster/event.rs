//! Typed roster events and the transitions they produce.

use super::types::{Participant, SessionHandle};

/// A validated presence event.
///
/// Built once at the transport boundary; the roster never sees raw fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    Join(Participant),
    Leave { handle: SessionHandle },
}

impl RosterEvent {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::Leave { .. } => "leave",
        }
    }

    pub fn handle(&self) -> SessionHandle {
        match self {
            Self::Join(p) => p.handle,
            Self::Leave { handle } => *handle,
        }
    }
}

/// Why an event left the roster untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Join from a non-voice connection.
    Filtered,
    /// Join for a handle that is already present.
    Duplicate,
    /// Leave for a handle that was never recorded.
    UnknownSession,
}

/// The outcome of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Connected {
        handle: SessionHandle,
        display_name: String,
    },
    Disconnected {
        handle: SessionHandle,
        display_name: String,
    },
    Ignored(IgnoreReason),
}

impl Transition {
    /// Whether the set of present sessions changed.
    pub fn changed_membership(&self) -> bool {
        !matches!(self, Self::Ignored(_))
    }
}
