// ABOUTME: Database backup commands.
// ABOUTME: Starts on-demand backups and prints the newest backup's download URL.

use super::load_config;
use harbormaster::cloud::{AcquiaClient, BackupType};
use harbormaster::deploy::BackupLocator;
use harbormaster::error::{Error, Result};
use harbormaster::output::Output;
use harbormaster::types::TargetName;
use std::path::Path;

pub async fn backup(config_path: Option<&Path>, target: &str, output: &Output) -> Result<()> {
    let target = TargetName::parse(target)?;
    let config = load_config(config_path)?;
    let site = config.site(target)?;
    let api = AcquiaClient::from_settings(&config.cloud)?;

    BackupLocator::new(&api, &config.application, None)
        .create_backup(&site.id)
        .await?;

    output.success("Backup initiated.");
    Ok(())
}

pub async fn latest_backup_url(
    config_path: Option<&Path>,
    target: &str,
    kind: Option<&str>,
    output: &Output,
) -> Result<()> {
    let target = TargetName::parse(target)?;
    let kind = kind
        .map(|kind| {
            BackupType::parse(kind).ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown backup type \"{}\"; expected ondemand or daily",
                    kind
                ))
            })
        })
        .transpose()?;
    let config = load_config(config_path)?;
    let site = config.site(target)?;
    let api = AcquiaClient::from_settings(&config.cloud)?;

    let locator = BackupLocator::new(
        &api,
        &config.application,
        config.backup.download_host_rewrite.as_ref(),
    );
    let url = locator.latest_backup_url(&site.id, kind).await?;

    output.value(&url);
    Ok(())
}
