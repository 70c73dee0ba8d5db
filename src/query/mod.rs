//! ServerQuery integration: the connection, its event stream, and the
//! resolver and banner writer built on top of it.

mod banner;
mod client;
pub mod events;
mod resolver;

pub use banner::ServerBanner;
pub use client::{HOST_BANNER_PROPERTY, NotificationStream, QueryClient, spawn_keepalive};
pub use events::{MalformedEvent, roster_events};
pub use resolver::QueryResolver;
