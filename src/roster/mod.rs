//! Presence tracking.
//!
//! - [`types`]: session handles, identities, participants
//! - [`event`]: typed join/leave events and the transitions they produce
//! - [`resolver`]: the identity resolution capability
//! - [`machine`]: the [`Roster`] state machine

mod event;
mod machine;
mod resolver;
mod types;

pub use event::{IgnoreReason, RosterEvent, Transition};
pub use machine::{ResolvePolicy, Roster};
pub use resolver::IdentityResolver;
pub use types::{ClientType, DatabaseId, IdentityToken, Participant, RosterEntry, SessionHandle};
