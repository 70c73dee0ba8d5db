//! Standardized span constructors.

use tracing::{Span, info_span};

use crate::roster::SessionHandle;

/// Span for applying one roster event.
pub fn event(kind: &str, handle: SessionHandle) -> Span {
    info_span!("event", kind = %kind, handle = %handle)
}

/// Span for one ServerQuery command round trip.
pub fn query_command(name: &str) -> Span {
    info_span!("query", command = %name)
}
