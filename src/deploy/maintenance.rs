// ABOUTME: Scoped maintenance-mode window around the disruptive deploy steps.
// ABOUTME: Restores the pre-deploy maintenance state whether the window succeeds or fails.

use std::future::Future;

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Result;
use crate::remote::{Drush, RemoteShell, ShellError};

const STATE_KEY: &str = "system.maintenance_mode";

/// Read the current maintenance flag. Anything but `1` counts as off.
pub async fn maintenance_mode(shell: &dyn RemoteShell, drush: &Drush) -> Result<bool> {
    let output = shell
        .must_run(&drush.command("state:get").arg(STATE_KEY).render())
        .await?;
    Ok(output.stdout.trim() == "1")
}

pub async fn set_maintenance_mode(
    shell: &dyn RemoteShell,
    drush: &Drush,
    on: bool,
) -> std::result::Result<(), ShellError> {
    let value = if on { "1" } else { "0" };
    shell
        .must_run(
            &drush
                .command("state:set")
                .arg(STATE_KEY)
                .arg(value)
                .option("input-format", "integer")
                .render(),
        )
        .await?;
    tracing::info!("Maintenance mode {}", if on { "enabled" } else { "disabled" });
    Ok(())
}

/// Run `window` with maintenance mode on.
///
/// With `enabled` false the window runs untouched. Otherwise the previous
/// flag is read, maintenance is switched on, and the previous flag is put
/// back afterwards. A failed restore after a failed window is recorded as a
/// warning and the window's error is returned.
pub async fn with_maintenance<F, T>(
    shell: &dyn RemoteShell,
    drush: &Drush,
    enabled: bool,
    diag: &mut Diagnostics,
    window: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if !enabled {
        return window.await;
    }

    let previous = maintenance_mode(shell, drush).await?;
    set_maintenance_mode(shell, drush, true).await?;

    let result = window.await;
    let restore = set_maintenance_mode(shell, drush, previous).await;

    match (result, restore) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), Err(restore_err)) => {
            diag.warn(Warning::maintenance_restore(format!(
                "maintenance mode left on: {}",
                restore_err
            )));
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
    }
}
