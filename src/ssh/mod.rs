// ABOUTME: SSH client module for target environment connections.
// ABOUTME: Agent or key authentication with known_hosts verification.

mod auth;
mod client;
mod error;
mod host_key;

pub use client::{CommandOutput, Session, SessionConfig};
pub use error::{Error, Result};
pub use host_key::HostKeyPolicy;
