//! # ts-query-proto
//!
//! A Rust library for parsing and encoding TeamSpeak 3 ServerQuery messages.
//!
//! ## Features
//!
//! - Reply parsing: status lines, notifications, and `|`-separated data records
//! - ServerQuery escaping for keys and values
//! - Command construction with a builder and typed constructors
//! - Optional Tokio integration (line codec, query codec, TCP transport)
//!
//! ## Quick Start
//!
//! ### Building commands
//!
//! ```rust
//! use ts_query_proto::Command;
//!
//! let login = Command::login("serveradmin", "secret pass");
//! assert_eq!(login.to_string(), "login client_login_name=serveradmin client_login_password=secret\\spass");
//!
//! let list = Command::new("clientlist").option("uid");
//! assert_eq!(list.to_string(), "clientlist -uid");
//! ```
//!
//! ### Parsing replies
//!
//! ```rust
//! use ts_query_proto::Reply;
//!
//! let reply: Reply = "notifyclientleftview cfid=1 ctid=0 reasonid=8 clid=5"
//!     .parse()
//!     .expect("valid notification");
//!
//! if let Reply::Notify(notification) = reply {
//!     assert_eq!(notification.event, "clientleftview");
//!     assert_eq!(notification.records[0].get("clid"), Some("5"));
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

#[cfg(feature = "tokio")]
pub mod codec;
pub mod command;
pub mod error;
pub mod escape;
#[cfg(feature = "tokio")]
pub mod line;
pub mod reply;
#[cfg(feature = "tokio")]
pub mod transport;

pub use self::command::Command;
pub use self::error::{ProtocolError, Result};
pub use self::reply::{Notification, QueryStatus, Record, Reply};

#[cfg(feature = "tokio")]
pub use self::codec::QueryCodec;
#[cfg(feature = "tokio")]
pub use self::transport::Transport;

/// Maximum accepted ServerQuery line length.
///
/// `clientlist` on a busy server produces a single long line, so this is far
/// above the usual line-protocol limits.
pub const MAX_QUERY_LINE_LEN: usize = 1 << 20;
