// ABOUTME: Deployment state marker types for the type state pattern.
// ABOUTME: Each state names the steps already done; later states carry their results.

use super::purge::PurgeReport;

/// Requested: target and ref resolved, nothing touched yet.
/// Available actions: `confirm()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Requested;

/// Confirmed: production deploys were approved by the operator.
/// Available actions: `prepare_database()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Confirmed;

/// Database ready: refreshed from production when requested.
/// Available actions: `set_runtime_version()`
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseReady {
    pub(crate) refreshed: bool,
}

/// Runtime ready: the environment runs the configured PHP version.
/// Available actions: `switch_code()`
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeReady;

/// Code switched: the environment serves the requested git ref.
/// Available actions: `run_post_deploy()`
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeSwitched;

/// Post-deployed: database updates and config import ran.
/// Available actions: `purge()`
#[derive(Debug, Clone, Copy, Default)]
pub struct PostDeployed;

/// Purged: stale pages were queued for invalidation.
/// Available actions: `rebuild_cache()`, `finish()`
#[derive(Debug, Clone, Default)]
pub struct Purged {
    pub(crate) report: PurgeReport,
}

/// Completed: deployment finished and recorded.
/// Available actions: `drain_purge_queue()`
#[derive(Debug, Clone, Default)]
pub struct Completed {
    pub(crate) report: PurgeReport,
    pub(crate) tracked: bool,
}
