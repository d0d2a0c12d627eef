// ABOUTME: Drives a deployment through every state under the deploy lock.
// ABOUTME: Wraps the disruptive steps in a maintenance window.

use chrono::Local;

use crate::cloud::CloudApi;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Result;
use crate::output::Output;
use crate::remote::RemoteShell;
use crate::tracking::DeploymentTracker;

use super::deployment::Deployment;
use super::lock::DeployLock;
use super::maintenance::with_maintenance;
use super::state::{Completed, Confirmed};

/// External systems a deploy talks to.
pub struct DeployServices<'a> {
    pub api: &'a dyn CloudApi,
    pub shell: &'a dyn RemoteShell,
    pub tracker: Option<&'a dyn DeploymentTracker>,
}

/// Wall-clock time for operator-facing messages.
pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %-I:%M:%S %p").to_string()
}

/// Run a confirmed deployment through to the purge-queue worker.
///
/// Confirmation happens before this point so that production is never
/// contacted without the operator's approval.
pub async fn run_deploy(
    deployment: Deployment<Confirmed>,
    services: &DeployServices<'_>,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<Deployment<Completed>> {
    output.progress(&format!(
        "Starting deployment of {} to {} at {}",
        deployment.git_ref(),
        deployment.target().name,
        timestamp()
    ));

    output.progress("  → Acquiring deploy lock...");
    let lock = DeployLock::acquire(
        services.shell,
        deployment.target().name,
        deployment.git_ref().as_str(),
        deployment.options().force_unlock,
    )
    .await?;

    let result = run_locked(deployment, services, output, diag).await;

    if let Err(e) = lock.release().await {
        diag.warn(Warning::lock_release(e.to_string()));
    }

    let deployment = result?;
    output.progress(&format!("Deployment completed at {}", timestamp()));
    Ok(deployment)
}

async fn run_locked(
    deployment: Deployment<Confirmed>,
    services: &DeployServices<'_>,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<Deployment<Completed>> {
    if deployment.options().refresh_db && !deployment.is_production() {
        output.progress("  → Refreshing database from production...");
    }
    let deployment = deployment
        .prepare_database(services.api, services.shell, diag)
        .await?;
    if deployment.database_refreshed() {
        output.progress("  → Database replaced with the latest production backup");
    }

    let drush = deployment.drush();
    let maintenance = !deployment.options().skip_maintenance;
    let deployment = with_maintenance(services.shell, &drush, maintenance, diag, async {
        output.progress("  → Checking PHP version...");
        let deployment = deployment.set_runtime_version(services.api).await?;

        output.progress(&format!("  → Switching code to {}...", deployment.git_ref()));
        let deployment = deployment.switch_code(services.api).await?;

        output.progress("  → Running post-deploy tasks...");
        let deployment = deployment.run_post_deploy(services.shell).await?;

        output.progress("  → Purging caches...");
        let deployment = deployment.purge(services.shell).await?;
        deployment.rebuild_cache(services.shell).await
    })
    .await?;

    let deployment = deployment.finish(services.tracker, diag).await;
    deployment.drain_purge_queue(services.shell).await?;
    Ok(deployment)
}
