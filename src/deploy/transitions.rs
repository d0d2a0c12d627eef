// ABOUTME: State transition methods for deployment orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use crate::cloud::CloudApi;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Result;
use crate::remote::RemoteShell;
use crate::tracking::DeploymentTracker;
use crate::types::TargetName;

use super::backup::BackupLocator;
use super::deployment::Deployment;
use super::prompt::{Prompter, confirm_production};
use super::purge::selective_purge;
use super::refresh::refresh_database;
use super::runtime_version::ensure_runtime_version;
use super::state::{
    CodeSwitched, Completed, Confirmed, DatabaseReady, PostDeployed, Purged, Requested,
    RuntimeReady,
};
use super::waiter::NotificationWaiter;

// =============================================================================
// Internal Helpers
// =============================================================================

impl<S> Deployment<S> {
    /// Internal helper to transition to a new state.
    fn transition<T>(self, state: T) -> Deployment<T> {
        Deployment {
            config: self.config,
            target: self.target,
            git_ref: self.git_ref,
            options: self.options,
            state,
        }
    }

    fn waiter<'a>(&self, api: &'a dyn CloudApi) -> NotificationWaiter<'a> {
        NotificationWaiter::new(api, self.config.polling)
    }
}

// =============================================================================
// Requested -> Confirmed
// =============================================================================

impl Deployment<Requested> {
    /// Ask for confirmation on production; other targets pass straight through.
    ///
    /// # Errors
    ///
    /// Returns `Error::UserAborted` when the operator declines or cannot be asked.
    pub fn confirm(self, prompter: &dyn Prompter) -> Result<Deployment<Confirmed>> {
        confirm_production(prompter, self.is_production())?;
        Ok(self.transition(Confirmed))
    }
}

// =============================================================================
// Confirmed -> DatabaseReady
// =============================================================================

impl Deployment<Confirmed> {
    /// Refresh the database from the latest production backup when requested.
    ///
    /// Production is never refreshed, whatever the options say.
    #[must_use = "deployment state must be used"]
    pub async fn prepare_database(
        self,
        api: &dyn CloudApi,
        shell: &dyn RemoteShell,
        diag: &mut Diagnostics,
    ) -> Result<Deployment<DatabaseReady>> {
        if !self.options.refresh_db {
            return Ok(self.transition(DatabaseReady { refreshed: false }));
        }
        if self.is_production() {
            tracing::info!("Ignoring database refresh for a production deploy");
            return Ok(self.transition(DatabaseReady { refreshed: false }));
        }

        let source = self.config.site(TargetName::Prod)?;
        let locator = BackupLocator::new(
            api,
            &self.config.application,
            self.config.backup.download_host_rewrite.as_ref(),
        );
        let url = locator.latest_backup_url(&source.id, None).await?;
        tracing::info!("Backup URL retrieved");

        refresh_database(
            shell,
            &self.drush(),
            &self.target,
            &self.config.backup,
            &url,
            diag,
        )
        .await?;
        Ok(self.transition(DatabaseReady { refreshed: true }))
    }
}

// =============================================================================
// DatabaseReady -> RuntimeReady
// =============================================================================

impl Deployment<DatabaseReady> {
    #[must_use = "deployment state must be used"]
    pub async fn set_runtime_version(
        self,
        api: &dyn CloudApi,
    ) -> Result<Deployment<RuntimeReady>> {
        let waiter = self.waiter(api);
        ensure_runtime_version(api, &waiter, &self.target.id, &self.config.runtime_version)
            .await?;
        Ok(self.transition(RuntimeReady))
    }
}

// =============================================================================
// RuntimeReady -> CodeSwitched
// =============================================================================

impl Deployment<RuntimeReady> {
    /// Switch the environment to the requested ref and wait for the task.
    #[must_use = "deployment state must be used"]
    pub async fn switch_code(self, api: &dyn CloudApi) -> Result<Deployment<CodeSwitched>> {
        let response = api.switch_code(&self.target.id, &self.git_ref).await?;
        self.waiter(api).wait_on(&response).await?;
        tracing::info!(git_ref = %self.git_ref, "Code switched");
        Ok(self.transition(CodeSwitched))
    }
}

// =============================================================================
// CodeSwitched -> PostDeployed
// =============================================================================

impl Deployment<CodeSwitched> {
    /// Run database updates, config import and deploy hooks.
    #[must_use = "deployment state must be used"]
    pub async fn run_post_deploy(
        self,
        shell: &dyn RemoteShell,
    ) -> Result<Deployment<PostDeployed>> {
        shell
            .must_run(&self.drush().command("deploy").verbose().render())
            .await?;
        Ok(self.transition(PostDeployed))
    }
}

// =============================================================================
// PostDeployed -> Purged
// =============================================================================

impl Deployment<PostDeployed> {
    #[must_use = "deployment state must be used"]
    pub async fn purge(self, shell: &dyn RemoteShell) -> Result<Deployment<Purged>> {
        let report = selective_purge(shell, &self.drush(), &self.config.purge).await?;
        Ok(self.transition(Purged { report }))
    }
}

// =============================================================================
// Purged -> Completed
// =============================================================================

impl Deployment<Purged> {
    /// Rebuild every cache when the options ask for it.
    #[must_use = "deployment state must be used"]
    pub async fn rebuild_cache(self, shell: &dyn RemoteShell) -> Result<Deployment<Purged>> {
        if self.options.cache_rebuild {
            shell
                .must_run(&self.drush().command("cache:rebuild").render())
                .await?;
            tracing::info!("Caches rebuilt");
        }
        Ok(self)
    }

    /// Record production deployments with the tracking service.
    ///
    /// Tracking failures never fail the deploy; they become warnings.
    pub async fn finish(
        self,
        tracker: Option<&dyn DeploymentTracker>,
        diag: &mut Diagnostics,
    ) -> Deployment<Completed> {
        let mut tracked = false;
        if self.is_production() {
            match tracker {
                Some(tracker) => match tracker.record_deployment(&self.git_ref).await {
                    Ok(()) => tracked = true,
                    Err(e) => diag.warn(Warning::external_notification(format!(
                        "failed to record deployment: {}",
                        e
                    ))),
                },
                None => tracing::debug!("No deployment tracker configured"),
            }
        }
        let report = self.state.report.clone();
        self.transition(Completed { report, tracked })
    }
}

impl Deployment<Completed> {
    /// Work through the purge queue filled by the deploy.
    pub async fn drain_purge_queue(&self, shell: &dyn RemoteShell) -> Result<()> {
        shell
            .must_run(
                &self
                    .drush()
                    .command("p:queue-work")
                    .flag("finish")
                    .verbose()
                    .render(),
            )
            .await?;
        Ok(())
    }
}
