// ABOUTME: Deployment-tracking webhook for production deploys.
// ABOUTME: Records a deployment marker; callers treat failures as warnings.

use async_trait::async_trait;
use serde_json::json;

use crate::config::TrackingSettings;
use crate::http::{self, Result};
use crate::types::GitRef;

const SERVICE: &str = "New Relic";

/// Records that a revision was deployed.
#[async_trait]
pub trait DeploymentTracker: Send + Sync {
    async fn record_deployment(&self, revision: &GitRef) -> Result<()>;
}

pub struct NewRelicNotifier {
    client: reqwest::Client,
    api_url: String,
    application: String,
    api_key: String,
    user: String,
}

impl NewRelicNotifier {
    pub fn from_settings(settings: &TrackingSettings) -> crate::error::Result<Self> {
        Ok(Self {
            client: http::client(true)?,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            application: settings.application.resolve()?,
            api_key: settings.api_key.resolve()?,
            user: settings.user.resolve()?,
        })
    }
}

#[async_trait]
impl DeploymentTracker for NewRelicNotifier {
    async fn record_deployment(&self, revision: &GitRef) -> Result<()> {
        let url = format!(
            "{}/v2/applications/{}/deployments.json",
            self.api_url, self.application
        );
        let body = json!({
            "deployment": {
                "revision": revision.as_str(),
                "changelog": "",
                "description": "",
                "user": self.user,
            }
        });
        let resp = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        http::ensure_success(SERVICE, resp).await?;
        tracing::info!(revision = %revision, "Recorded deployment at {}", SERVICE);
        Ok(())
    }
}
