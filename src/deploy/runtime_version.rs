// ABOUTME: Reads and conditionally updates an environment's PHP version.
// ABOUTME: Only issues an update when the current version differs.

use crate::cloud::CloudApi;
use crate::error::Result;
use crate::types::EnvironmentId;

use super::NotificationWaiter;

/// Make sure `env` runs `desired`. Returns whether an update was made.
pub async fn ensure_runtime_version(
    api: &dyn CloudApi,
    waiter: &NotificationWaiter<'_>,
    env: &EnvironmentId,
    desired: &str,
) -> Result<bool> {
    let info = api.environment(env).await?;
    let current = info.runtime_version();
    tracing::info!(environment = %env, "PHP version is currently {}", current);

    if current == desired {
        return Ok(false);
    }

    tracing::info!(environment = %env, "Updating PHP version from {} to {}", current, desired);
    let response = api.set_runtime_version(env, desired).await?;
    waiter.wait_on(&response).await?;
    Ok(true)
}
