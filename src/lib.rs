//! ts-activity - TeamSpeak presence bridge
//!
//! Tracks who is connected to a TeamSpeak 3 server over ServerQuery,
//! announces joins and leaves to a Discord webhook, and optionally encodes
//! the occupied identity slots into the server's host banner URL.

pub mod banner;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod metrics;
pub mod query;
pub mod roster;
pub mod slots;
pub mod telemetry;
pub mod webhook;
