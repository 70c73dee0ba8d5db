//! Integration test common infrastructure.
//!
//! Provides a scripted ServerQuery peer and in-memory fakes for the bridge's
//! collaborators.

pub mod fakes;
pub mod server;

#[allow(unused_imports)]
pub use fakes::{Recorder, TableResolver};
#[allow(unused_imports)]
pub use server::FakeQueryServer;
