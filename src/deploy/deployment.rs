// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: Holds the resolved request; state types carry per-step results.

use crate::config::{Config, TargetEnvironment};
use crate::error::Result;
use crate::remote::Drush;
use crate::types::{GitRef, TargetName};

use super::purge::PurgeReport;
use super::state::{Completed, DatabaseReady, Purged, Requested};

/// Switches that change how a deploy runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeployOptions {
    /// Leave maintenance mode alone.
    pub skip_maintenance: bool,
    /// Copy the production database first (never applies to production).
    pub refresh_db: bool,
    /// Run a full cache rebuild after the purge.
    pub cache_rebuild: bool,
    /// Break an existing deploy lock.
    pub force_unlock: bool,
}

/// What to deploy where.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub target: TargetName,
    pub git_ref: GitRef,
    pub options: DeployOptions,
}

impl DeployRequest {
    /// Validate raw command-line input.
    pub fn parse(target: &str, git_ref: &str, options: DeployOptions) -> Result<Self> {
        Ok(Self {
            target: TargetName::parse(target)?,
            git_ref: GitRef::new(git_ref)?,
            options,
        })
    }
}

/// A deployment in progress, parameterized by its current state.
///
/// Transitions consume the deployment and return it in the next state, so
/// steps cannot be skipped or reordered. Switching code on an unconfirmed
/// deployment does not compile:
///
/// ```compile_fail
/// use harbormaster::cloud::CloudApi;
/// use harbormaster::deploy::{Deployment, Requested};
///
/// async fn skip_ahead(deployment: Deployment<Requested>, api: &dyn CloudApi) {
///     let _ = deployment.switch_code(api).await;
/// }
/// ```
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) config: Config,
    pub(crate) target: TargetEnvironment,
    pub(crate) git_ref: GitRef,
    pub(crate) options: DeployOptions,
    pub(crate) state: S,
}

impl Deployment<Requested> {
    /// Start a deployment; fails when the target has no site configured.
    pub fn new(config: Config, request: DeployRequest) -> Result<Self> {
        let target = config.site(request.target)?;
        Ok(Deployment {
            config,
            target,
            git_ref: request.git_ref,
            options: request.options,
            state: Requested,
        })
    }
}

impl<S> Deployment<S> {
    pub fn target(&self) -> &TargetEnvironment {
        &self.target
    }

    pub fn git_ref(&self) -> &GitRef {
        &self.git_ref
    }

    pub fn options(&self) -> DeployOptions {
        self.options
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_production(&self) -> bool {
        self.target.is_production()
    }

    /// Drush on the target docroot.
    pub fn drush(&self) -> Drush {
        Drush::new(&self.target.root, &self.config.drush.path)
    }
}

impl Deployment<DatabaseReady> {
    /// Whether the database was replaced with a production copy.
    pub fn database_refreshed(&self) -> bool {
        self.state.refreshed
    }
}

impl Deployment<Purged> {
    pub fn purge_report(&self) -> &PurgeReport {
        &self.state.report
    }
}

impl Deployment<Completed> {
    pub fn purge_report(&self) -> &PurgeReport {
        &self.state.report
    }

    /// Whether the deployment was recorded with the tracking service.
    pub fn tracked(&self) -> bool {
        self.state.tracked
    }
}
