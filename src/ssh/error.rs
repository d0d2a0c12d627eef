// ABOUTME: SSH-specific error types.
// ABOUTME: Connection, credential, and channel failures for one target host.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not connect to {host}:{port}: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("{user}@{host} rejected every offered key")]
    Rejected { user: String, host: String },

    #[error("no SSH credentials: {0}")]
    NoCredentials(String),

    #[error("failed to load key from {path}: {reason}")]
    KeyLoad { path: PathBuf, reason: String },

    #[error("channel error: {0}")]
    Channel(String),

    #[error("remote command still running after {0:?}")]
    Timeout(Duration),

    #[error("channel closed before the command reported an exit status")]
    NoExitStatus,

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
