// ABOUTME: Polls a long-running cloud task until it completes or fails.
// ABOUTME: Bounded by a maximum number of polls with a fixed interval between them.

use std::time::Instant;

use crate::cloud::{CloudApi, Notification, NotificationStatus, OperationResponse};
use crate::config::PollingConfig;
use crate::error::{Error, Result};
use crate::http::ApiError;
use crate::types::NotificationId;

/// Waits on cloud notifications.
pub struct NotificationWaiter<'a> {
    api: &'a dyn CloudApi,
    polling: PollingConfig,
}

impl<'a> NotificationWaiter<'a> {
    pub fn new(api: &'a dyn CloudApi, polling: PollingConfig) -> Self {
        Self { api, polling }
    }

    /// Poll until the task reaches a terminal state.
    ///
    /// Returns the completed notification, `TaskFailed` when the task failed,
    /// or `Timeout` after `max_attempts` polls that were all still running.
    pub async fn wait(&self, id: &NotificationId) -> Result<Notification> {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            let notification = self.api.notification(id).await?;
            attempts += 1;

            match notification.status {
                NotificationStatus::Completed => {
                    tracing::info!(%id, attempts, "{}", notification.description);
                    return Ok(notification);
                }
                NotificationStatus::Failed => {
                    return Err(Error::TaskFailed {
                        id: id.clone(),
                        description: notification.description,
                    });
                }
                ref status => {
                    tracing::debug!(%id, attempts, ?status, "Task still running");
                }
            }

            if attempts >= self.polling.max_attempts {
                return Err(Error::Timeout {
                    id: id.clone(),
                    attempts,
                    waited: started.elapsed(),
                });
            }
            tokio::time::sleep(self.polling.interval).await;
        }
    }

    /// Wait on the task started by a mutating request.
    pub async fn wait_on(&self, response: &OperationResponse) -> Result<Notification> {
        let id = response.notification().ok_or_else(|| {
            Error::RemoteApi(ApiError::UnexpectedResponse {
                service: "Acquia Cloud",
                message: format!("no notification link in response: {}", response.message),
            })
        })?;
        self.wait(&id).await
    }
}
