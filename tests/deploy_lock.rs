// ABOUTME: Integration tests for deploy lock functionality.
// ABOUTME: Tests lock acquisition, stale detection, and force breaking against a scripted shell.

mod support;

use chrono::Utc;
use harbormaster::deploy::{DeployLock, LockInfo};
use harbormaster::error::{Error, ErrorKind};
use harbormaster::types::TargetName;
use support::FakeShell;

fn held_lock(age_minutes: i64) -> String {
    let mut info = LockInfo::new(TargetName::Test, "tags/build-1");
    info.holder = "ci-runner".to_string();
    info.pid = 4242;
    info.started_at = Utc::now() - chrono::Duration::minutes(age_minutes);
    serde_json::to_string(&info).unwrap()
}

#[tokio::test]
async fn free_lock_is_acquired_and_released() {
    let shell = FakeShell::new();

    let lock = DeployLock::acquire(&shell, TargetName::Test, "main", false)
        .await
        .unwrap();
    lock.release().await.unwrap();

    let commands = shell.commands();
    assert_eq!(commands.len(), 3);
    assert!(commands[1].starts_with("(set -C; echo '"));
    assert!(commands[1].contains("$HOME/.local/state/harbormaster/test.lock"));
    assert_eq!(
        commands[2],
        "rm -f \"$HOME/.local/state/harbormaster/test.lock\""
    );
}

#[tokio::test]
async fn fresh_lock_blocks_second_deploy() {
    let shell = FakeShell::new()
        .fail_when(|cmd| cmd.contains("set -C"))
        .respond("cat ", &held_lock(5));

    let err = DeployLock::acquire(&shell, TargetName::Test, "main", false)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LockHeld);
    match err {
        Error::LockHeld { holder, pid, .. } => {
            assert_eq!(holder, "ci-runner");
            assert_eq!(pid, 4242);
        }
        other => panic!("expected LockHeld, got {other}"),
    }
    assert!(!shell.ran("rm -f"));
}

#[tokio::test]
async fn stale_lock_is_broken() {
    // The retry after breaking the lock also hits the failing rule, so only
    // the break itself is observable here.
    let shell = FakeShell::new()
        .fail_when(|cmd| cmd.contains("set -C"))
        .respond("cat ", &held_lock(120));

    let err = DeployLock::acquire(&shell, TargetName::Test, "main", false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Lock(_)));
    assert!(shell.ran("rm -f \"$HOME/.local/state/harbormaster/test.lock\""));
    assert_eq!(shell.commands().iter().filter(|c| c.contains("set -C")).count(), 2);
}

#[tokio::test]
async fn force_breaks_a_fresh_lock() {
    let shell = FakeShell::new()
        .fail_when(|cmd| cmd.contains("set -C"))
        .respond("cat ", &held_lock(1));

    let _ = DeployLock::acquire(&shell, TargetName::Test, "main", true).await;

    assert!(shell.ran("rm -f"));
}

#[tokio::test]
async fn corrupted_lock_is_broken() {
    let shell = FakeShell::new()
        .fail_when(|cmd| cmd.contains("set -C"))
        .respond("cat ", "not json");

    let _ = DeployLock::acquire(&shell, TargetName::Prod, "main", false).await;

    assert!(shell.ran("rm -f \"$HOME/.local/state/harbormaster/prod.lock\""));
}
