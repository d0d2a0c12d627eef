// ABOUTME: Replaces a non-production database with the latest production backup.
// ABOUTME: The downloaded dump is removed on every path once the download was attempted.

use chrono::Utc;

use crate::config::{BackupSettings, TargetEnvironment};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::remote::{Drush, RemoteShell, ShellError, shell_line};

/// Where a refresh downloads the dump to.
pub fn download_path(temp_dir: &str, unix_time: i64) -> String {
    format!("{}/{}-db-backup.sql.gz", temp_dir.trim_end_matches('/'), unix_time)
}

/// Load the backup at `backup_url` into `target`.
///
/// Downloads the dump on the target host, drops the schema, imports the
/// dump and removes it again. Refuses to touch production.
pub async fn refresh_database(
    shell: &dyn RemoteShell,
    drush: &Drush,
    target: &TargetEnvironment,
    settings: &BackupSettings,
    backup_url: &str,
    diag: &mut Diagnostics,
) -> Result<()> {
    if target.is_production() {
        return Err(Error::ProductionRefresh(target.name));
    }

    let tmp = download_path(&settings.temp_dir, Utc::now().timestamp());
    let result = import(shell, drush, settings, backup_url, &tmp).await;

    let cleanup = shell.must_run(&shell_line(["rm", "-f", &tmp])).await;
    match (result, cleanup) {
        (Ok(()), Ok(_)) => {
            tracing::info!(environment = %target.name, "Database refreshed");
            Ok(())
        }
        (Ok(()), Err(e)) => Err(e.into()),
        (Err(e), Err(cleanup_err)) => {
            diag.warn(Warning::temp_cleanup(format!(
                "could not remove {}: {}",
                tmp, cleanup_err
            )));
            Err(e.into())
        }
        (Err(e), Ok(_)) => Err(e.into()),
    }
}

async fn import(
    shell: &dyn RemoteShell,
    drush: &Drush,
    settings: &BackupSettings,
    backup_url: &str,
    tmp: &str,
) -> std::result::Result<(), ShellError> {
    let output_document = format!("--output-document={}", tmp);
    shell
        .must_run(&shell_line([
            "wget",
            "-q",
            "--continue",
            backup_url.trim(),
            &output_document,
        ]))
        .await?;
    tracing::info!("Database backup downloaded");

    shell
        .must_run(&drush.command("sql:drop").yes().render())
        .await?;
    tracing::info!("Database dropped");

    shell
        .must_run(&drush.in_root([settings.import_script.as_str(), tmp]))
        .await?;
    tracing::info!("Database imported from backup");
    Ok(())
}
