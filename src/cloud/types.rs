// ABOUTME: Wire types for the cloud hosting API.
// ABOUTME: Notifications, environments, backups, and HAL-style operation responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::types::{BackupId, NotificationId};

/// State of a long-running task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    pub uuid: NotificationId,
    pub status: NotificationStatus,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationLinks {
    #[serde(default)]
    pub notification: Option<Link>,
}

/// Response to a mutating request.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationResponse {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "_links", default)]
    pub links: OperationLinks,
}

impl OperationResponse {
    /// The task handle to wait on, if the operation runs asynchronously.
    pub fn notification(&self) -> Option<NotificationId> {
        self.links
            .notification
            .as_ref()
            .map(|link| NotificationId::from_href(&link.href))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub configuration: EnvironmentConfiguration,
}

impl EnvironmentInfo {
    pub fn runtime_version(&self) -> &str {
        &self.configuration.php.version
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfiguration {
    pub php: PhpConfiguration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhpConfiguration {
    pub version: String,
}

/// How a backup was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupType {
    Ondemand,
    Daily,
    #[serde(other)]
    Other,
}

impl BackupType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ondemand" => Some(BackupType::Ondemand),
            "daily" => Some(BackupType::Daily),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackupLinks {
    pub download: Link,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackupRecord {
    #[serde(deserialize_with = "deserialize_backup_id")]
    pub id: BackupId,
    #[serde(rename = "type")]
    pub kind: BackupType,
    /// Unset while the backup is still running.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(rename = "_links")]
    pub links: BackupLinks,
}

impl BackupRecord {
    pub fn download_href(&self) -> &str {
        &self.links.download.href
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Embedded<T> {
    #[serde(rename = "_embedded")]
    pub embedded: Items<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Items<T> {
    pub items: Vec<T>,
}

// Backup IDs are numeric on the wire.
fn deserialize_backup_id<'de, D>(deserializer: D) -> Result<BackupId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => BackupId::new(n.to_string()),
        Raw::Text(s) => BackupId::new(s),
    })
}
