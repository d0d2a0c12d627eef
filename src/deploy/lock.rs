// ABOUTME: Deploy lock to prevent concurrent deployments to the same target.
// ABOUTME: Uses atomic file creation on the target host with lock info in ~/.local/state/harbormaster/.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::remote::RemoteShell;
use crate::types::TargetName;

/// Base directory for harbormaster state files (XDG Base Directory compliant).
const STATE_DIR: &str = ".local/state/harbormaster";

/// Information about who holds a deploy lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Target being deployed.
    pub target: TargetName,
    /// Git ref being deployed.
    #[serde(default)]
    pub git_ref: String,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new(target: TargetName, git_ref: &str) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            target,
            git_ref: git_ref.to_string(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }

    /// Path to the lock file for a target.
    /// Uses $HOME for shell expansion compatibility.
    pub fn lock_path(target: TargetName) -> String {
        format!("$HOME/{}/{}.lock", STATE_DIR, target)
    }
}

/// A held deploy lock. Release it explicitly with [`DeployLock::release`].
pub struct DeployLock<'a> {
    shell: &'a dyn RemoteShell,
    target: TargetName,
}

impl std::fmt::Debug for DeployLock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployLock")
            .field("target", &self.target)
            .finish()
    }
}

impl<'a> DeployLock<'a> {
    /// Acquire the deploy lock for `target`.
    ///
    /// Uses shell noclobber mode for atomic lock acquisition. Fails with
    /// `LockHeld` when another run holds a fresh lock; stale locks (older
    /// than one hour) and, with `force`, any lock are broken.
    pub async fn acquire(
        shell: &'a dyn RemoteShell,
        target: TargetName,
        git_ref: &str,
        force: bool,
    ) -> Result<Self> {
        let lock_path = LockInfo::lock_path(target);
        Self::ensure_state_dir(shell).await?;

        let lock_json = serde_json::to_string(&LockInfo::new(target, git_ref))
            .map_err(|e| Error::Lock(format!("failed to serialize lock: {}", e)))?;
        let escaped_json = lock_json.replace('\'', "'\\''");

        // set -C makes > fail if the file already exists.
        let acquire_cmd = format!(
            "(set -C; echo '{}' > \"{}\") 2>/dev/null",
            escaped_json, lock_path
        );

        if Self::try_create(shell, &acquire_cmd).await? {
            tracing::debug!(environment = %target, "Acquired deploy lock");
            return Ok(Self { shell, target });
        }

        match Self::read_existing(shell, &lock_path).await? {
            Some(existing) if !force && !existing.is_stale() => {
                return Err(Error::LockHeld {
                    target,
                    holder: existing.holder,
                    pid: existing.pid,
                    started_at: existing.started_at,
                });
            }
            Some(existing) => tracing::warn!(
                "Breaking lock on {} held by {} (pid {}) since {}",
                target,
                existing.holder,
                existing.pid,
                existing.started_at
            ),
            None => tracing::warn!("Lock info for {} unreadable, breaking lock", target),
        }

        shell
            .run(&format!("rm -f \"{}\"", lock_path))
            .await
            .map_err(|e| Error::Lock(format!("failed to break lock: {}", e)))?;

        if !Self::try_create(shell, &acquire_cmd).await? {
            return Err(Error::Lock(
                "lock acquired by another process during break".to_string(),
            ));
        }
        Ok(Self { shell, target })
    }

    async fn try_create(shell: &dyn RemoteShell, acquire_cmd: &str) -> Result<bool> {
        let output = shell
            .run(acquire_cmd)
            .await
            .map_err(|e| Error::Lock(format!("failed to acquire lock: {}", e)))?;
        Ok(output.success())
    }

    /// Ensure the state directory exists on the target host.
    async fn ensure_state_dir(shell: &dyn RemoteShell) -> Result<()> {
        shell
            .must_run(&format!("mkdir -p ~/{}", STATE_DIR))
            .await
            .map_err(|e| Error::Lock(format!("failed to create state directory: {}", e)))?;
        Ok(())
    }

    /// Current lock info; `None` when missing or corrupted.
    async fn read_existing(shell: &dyn RemoteShell, lock_path: &str) -> Result<Option<LockInfo>> {
        let output = shell
            .run(&format!("cat \"{}\"", lock_path))
            .await
            .map_err(|e| Error::Lock(format!("failed to read lock info: {}", e)))?;
        if !output.success() {
            return Ok(None);
        }
        Ok(serde_json::from_str(output.stdout.trim()).ok())
    }

    /// Release the lock.
    pub async fn release(self) -> Result<()> {
        let lock_path = LockInfo::lock_path(self.target);
        self.shell
            .must_run(&format!("rm -f \"{}\"", lock_path))
            .await
            .map_err(|e| Error::Lock(format!("failed to release lock: {}", e)))?;
        tracing::debug!(environment = %self.target, "Released deploy lock");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_info_creates_with_current_host_and_pid() {
        let info = LockInfo::new(TargetName::Test, "tags/build-1");

        assert_eq!(info.target, TargetName::Test);
        assert_eq!(info.git_ref, "tags/build-1");
        assert_eq!(info.pid, std::process::id());
        assert!(!info.holder.is_empty());
    }

    #[test]
    fn lock_path_uses_state_dir() {
        assert_eq!(
            LockInfo::lock_path(TargetName::Feature3),
            "$HOME/.local/state/harbormaster/feature3.lock"
        );
    }

    #[test]
    fn old_lock_is_stale() {
        let mut info = LockInfo::new(TargetName::Prod, "main");
        assert!(!info.is_stale());
        info.started_at = Utc::now() - chrono::Duration::hours(2);
        assert!(info.is_stale());
    }
}
