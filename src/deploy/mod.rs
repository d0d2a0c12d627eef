// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Exports the workflow steps, state markers, and the Deployment struct.

mod backup;
mod deployment;
mod lock;
mod maintenance;
mod prompt;
mod purge;
mod refresh;
mod runtime_version;
mod state;
mod transitions;
mod waiter;
mod workflow;

pub use backup::{BACKUP_STARTED, BackupLocator, ensure_trusted, select_latest};
pub use deployment::{DeployOptions, DeployRequest, Deployment};
pub use lock::{DeployLock, LockInfo};
pub use maintenance::{maintenance_mode, set_maintenance_mode, with_maintenance};
pub use prompt::{PRODUCTION_PROMPT, Prompter, TerminalPrompter, confirm_production};
pub use purge::{PurgeReport, PurgeTargets, parse_node_ids, purge_path_snippet, selective_purge};
pub use refresh::{download_path, refresh_database};
pub use runtime_version::ensure_runtime_version;
pub use state::{
    CodeSwitched, Completed, Confirmed, DatabaseReady, PostDeployed, Purged, Requested,
    RuntimeReady,
};
pub use waiter::NotificationWaiter;
pub use workflow::{DeployServices, run_deploy, timestamp};
