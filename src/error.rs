// ABOUTME: Application-wide error types for harbormaster.
// ABOUTME: Uses thiserror; module errors convert into the deployment taxonomy here.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::http::ApiError;
use crate::remote::ShellError;
use crate::types::{GitRefError, NotificationId, TargetName, TargetNameError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidTarget(#[from] TargetNameError),

    #[error(transparent)]
    InvalidGitRef(#[from] GitRefError),

    #[error("aborted: production deployment was not confirmed")]
    UserAborted,

    /// A non-2xx status or an unusable body from an external API.
    #[error(transparent)]
    RemoteApi(ApiError),

    #[error("{description} - notification {id} failed")]
    TaskFailed {
        id: NotificationId,
        description: String,
    },

    #[error("notification {id} did not complete after {attempts} checks ({waited:?})")]
    Timeout {
        id: NotificationId,
        attempts: u32,
        waited: Duration,
    },

    #[error("no usable backups were found")]
    NoUsableBackup,

    #[error("backup URL {0} is not hosted on the cloud API")]
    UntrustedBackupHost(String),

    #[error(transparent)]
    ProcessExecution(#[from] ShellError),

    #[error("refusing to refresh the database of {0}")]
    ProductionRefresh(TargetName),

    #[error("deploy to {target} is locked by {holder} (pid {pid}) since {started_at}")]
    LockHeld {
        target: TargetName,
        holder: String,
        pid: u32,
        started_at: chrono::DateTime<chrono::Utc>,
    },

    #[error("deploy lock error: {0}")]
    Lock(String),

    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("no site configured for target {0}")]
    UnknownSite(TargetName),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("SSH error: {0}")]
    Ssh(#[from] crate::ssh::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidTarget,
    UserAborted,
    RemoteApi,
    TaskFailed,
    Timeout,
    NoUsableBackup,
    UntrustedBackupHost,
    ProcessExecution,
    ProductionRefresh,
    LockHeld,
    Configuration,
    Transport,
}

impl Error {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidTarget(_) => ErrorKind::InvalidTarget,
            Error::UserAborted => ErrorKind::UserAborted,
            Error::RemoteApi(_) => ErrorKind::RemoteApi,
            Error::TaskFailed { .. } => ErrorKind::TaskFailed,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::NoUsableBackup => ErrorKind::NoUsableBackup,
            Error::UntrustedBackupHost(_) => ErrorKind::UntrustedBackupHost,
            Error::ProcessExecution(_) => ErrorKind::ProcessExecution,
            Error::ProductionRefresh(_) => ErrorKind::ProductionRefresh,
            Error::LockHeld { .. } => ErrorKind::LockHeld,
            Error::MissingCredential(_)
            | Error::AlreadyExists(_)
            | Error::ConfigNotFound(_)
            | Error::UnknownSite(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::InvalidGitRef(_)
            | Error::Yaml(_) => ErrorKind::Configuration,
            Error::Lock(_) | Error::Prompt(_) | Error::Http(_) | Error::Ssh(_) | Error::Io(_) => {
                ErrorKind::Transport
            }
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(e) => Error::Http(e.to_string()),
            other => Error::RemoteApi(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
