// ABOUTME: Finds the newest completed database backup and its signed download URL.
// ABOUTME: Also starts on-demand backups.

use reqwest::Url;

use crate::cloud::{BackupRecord, BackupType, CloudApi, OperationResponse};
use crate::config::HostRewrite;
use crate::error::{Error, Result};
use crate::http::ApiError;
use crate::types::EnvironmentId;

/// Reply the API gives when it accepts a backup request.
pub const BACKUP_STARTED: &str = "Creating the backup.";

/// Pick the completed backup with the latest completion time.
pub fn select_latest(
    records: impl IntoIterator<Item = BackupRecord>,
    kind: Option<BackupType>,
) -> Option<BackupRecord> {
    records
        .into_iter()
        .filter(|record| record.completed_at.is_some())
        .filter(|record| kind.is_none_or(|kind| record.kind == kind))
        .max_by_key(|record| record.completed_at)
}

/// Check that `href` lives under the API base URL.
pub fn ensure_trusted(base_url: &str, href: &str) -> Result<()> {
    let untrusted = || Error::UntrustedBackupHost(href.to_string());
    let base = Url::parse(base_url).map_err(|_| untrusted())?;
    let link = Url::parse(href).map_err(|_| untrusted())?;

    let same_origin = base.scheme() == link.scheme()
        && base.host_str() == link.host_str()
        && base.port_or_known_default() == link.port_or_known_default();
    if same_origin && under_path(base.path(), link.path()) {
        Ok(())
    } else {
        Err(untrusted())
    }
}

// `/api` covers `/api` and `/api/...` but not `/apiary`.
fn under_path(base: &str, path: &str) -> bool {
    let base = base.trim_end_matches('/');
    path == base
        || path
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub struct BackupLocator<'a> {
    api: &'a dyn CloudApi,
    database: &'a str,
    rewrite: Option<&'a HostRewrite>,
}

impl<'a> BackupLocator<'a> {
    pub fn new(api: &'a dyn CloudApi, database: &'a str, rewrite: Option<&'a HostRewrite>) -> Self {
        Self {
            api,
            database,
            rewrite,
        }
    }

    pub async fn latest_backup(
        &self,
        env: &EnvironmentId,
        kind: Option<BackupType>,
    ) -> Result<BackupRecord> {
        let records = self.api.backups(env, self.database).await?;
        tracing::debug!(environment = %env, count = records.len(), "Listed backups");
        select_latest(records, kind).ok_or(Error::NoUsableBackup)
    }

    /// Signed URL of the newest matching backup.
    pub async fn latest_backup_url(
        &self,
        env: &EnvironmentId,
        kind: Option<BackupType>,
    ) -> Result<String> {
        let backup = self.latest_backup(env, kind).await?;
        let href = backup.download_href();
        ensure_trusted(self.api.base_url(), href)?;

        let location = self.api.redirect_location(href).await?;
        Ok(match self.rewrite {
            Some(rewrite) => location.replace(&rewrite.from, &rewrite.to),
            None => location,
        })
    }

    /// Start an on-demand backup.
    pub async fn create_backup(&self, env: &EnvironmentId) -> Result<OperationResponse> {
        let response = self.api.create_backup(env, self.database).await?;
        if response.message != BACKUP_STARTED {
            return Err(Error::RemoteApi(ApiError::UnexpectedResponse {
                service: "Acquia Cloud",
                message: format!("failed to create a backup: {}", response.message),
            }));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trusted_link_shares_base_prefix() {
        assert!(
            ensure_trusted(
                "https://cloud.acquia.com/api",
                "https://cloud.acquia.com/api/environments/e/databases/db/backups/1/actions/download"
            )
            .is_ok()
        );
    }

    #[test]
    fn foreign_host_is_untrusted() {
        let err = ensure_trusted("https://cloud.acquia.com/api", "https://evil.example.com/api/x")
            .unwrap_err();
        assert!(matches!(err, Error::UntrustedBackupHost(_)));
    }

    #[test]
    fn lookalike_host_is_untrusted() {
        let err = ensure_trusted(
            "https://cloud.acquia.com/api",
            "https://cloud.acquia.com.evil.example/api/x",
        )
        .unwrap_err();
        assert!(matches!(err, Error::UntrustedBackupHost(_)));
    }

    #[test]
    fn other_path_or_scheme_is_untrusted() {
        assert!(ensure_trusted("https://cloud.acquia.com/api", "https://cloud.acquia.com/other").is_err());
        assert!(ensure_trusted("https://cloud.acquia.com/api", "http://cloud.acquia.com/api/x").is_err());
        assert!(
            ensure_trusted("https://cloud.acquia.com/api", "https://cloud.acquia.com/apiary/backups/1")
                .is_err()
        );
        assert!(ensure_trusted("https://cloud.acquia.com/api/", "https://cloud.acquia.com/api/x").is_ok());
    }
}
