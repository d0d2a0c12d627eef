// ABOUTME: Cloud hosting API: environments, code switch, backups, and notifications.
// ABOUTME: The CloudApi trait is the seam the deploy workflow talks through.

mod client;
mod types;

pub use client::AcquiaClient;
pub use types::{
    BackupRecord, BackupType, EnvironmentInfo, Link, Notification, NotificationStatus,
    OperationResponse,
};

use crate::http::Result;
use crate::types::{EnvironmentId, GitRef, NotificationId};
use async_trait::async_trait;

/// Operations the deploy workflow needs from the hosting platform.
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Base URL every API link must live under.
    fn base_url(&self) -> &str;

    /// Fetch the current state of a long-running task.
    async fn notification(&self, id: &NotificationId) -> Result<Notification>;

    /// Deploy a branch or tag to an environment.
    async fn switch_code(&self, env: &EnvironmentId, git_ref: &GitRef)
    -> Result<OperationResponse>;

    async fn environment(&self, env: &EnvironmentId) -> Result<EnvironmentInfo>;

    /// Change the environment's PHP version.
    async fn set_runtime_version(
        &self,
        env: &EnvironmentId,
        version: &str,
    ) -> Result<OperationResponse>;

    /// List database backups, most recent first.
    async fn backups(&self, env: &EnvironmentId, database: &str) -> Result<Vec<BackupRecord>>;

    /// Start an on-demand database backup.
    async fn create_backup(&self, env: &EnvironmentId, database: &str)
    -> Result<OperationResponse>;

    /// Request an API link without following redirects; returns the `Location` target.
    async fn redirect_location(&self, href: &str) -> Result<String>;
}
