// ABOUTME: CI pipeline trigger client.
// ABOUTME: Starts visual-regression and release pipelines with typed parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::config::CiSettings;
use crate::http::{self, Result};
use crate::types::{GitRef, TargetName};

const SERVICE: &str = "CircleCI";

/// Body of a pipeline trigger request.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRequest {
    pub branch: String,
    pub parameters: Map<String, Value>,
}

/// Options shared by the visual-regression workflows.
#[derive(Debug, Clone)]
pub struct BackstopRun {
    /// Environment name, or `tugboat` for a branch preview.
    pub target: String,
    pub list: String,
    pub viewport: String,
    /// Preview URL when `target` is `tugboat`.
    pub tugboat: Option<String>,
    pub cachebuster: bool,
}

impl PipelineRequest {
    fn new(branch: &str, workflow: &str, run: &BackstopRun) -> Self {
        let mut parameters = Map::new();
        parameters.insert("webhook".to_string(), json!(false));
        parameters.insert("trigger_workflow".to_string(), json!(workflow));
        parameters.insert("target".to_string(), json!(run.target));
        parameters.insert("list".to_string(), json!(run.list));
        parameters.insert("viewport".to_string(), json!(run.viewport));
        parameters.insert(
            "tugboat".to_string(),
            json!(run.tugboat.as_deref().unwrap_or("")),
        );
        parameters.insert("cachebuster".to_string(), json!(run.cachebuster));
        Self {
            branch: branch.to_string(),
            parameters,
        }
    }

    /// Take reference screenshots.
    pub fn backstop_snapshot(branch: &str, run: &BackstopRun) -> Self {
        Self::new(branch, "backstop_snapshot", run)
    }

    /// Compare a target against reference screenshots.
    pub fn backstop_compare(
        branch: &str,
        run: &BackstopRun,
        reference: &str,
        force_reference: bool,
    ) -> Self {
        let mut request = Self::new(branch, "backstop_compare", run);
        request
            .parameters
            .insert("reference".to_string(), json!(reference));
        request
            .parameters
            .insert("force-reference".to_string(), json!(force_reference));
        request
    }

    /// Run the deploy command inside CI.
    pub fn release(
        branch: &str,
        target: TargetName,
        git_ref: &GitRef,
        skip_maintenance: bool,
        refresh_db: bool,
    ) -> Self {
        // The CI config splices these straight into the deploy command line.
        let flag = |on: bool, name: &str| if on { format!("--{}", name) } else { String::new() };

        let mut parameters = Map::new();
        parameters.insert("webhook".to_string(), json!(false));
        parameters.insert("ma-release".to_string(), json!(true));
        parameters.insert("target".to_string(), json!(target.as_str()));
        parameters.insert("git-ref".to_string(), json!(git_ref.as_str()));
        parameters.insert(
            "skip-maint".to_string(),
            json!(flag(skip_maintenance, "skip-maint")),
        );
        parameters.insert("refresh-db".to_string(), json!(flag(refresh_db, "refresh-db")));
        Self {
            branch: branch.to_string(),
            parameters,
        }
    }
}

/// A triggered pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
    pub number: u64,
    #[serde(default)]
    pub id: String,
}

pub struct CircleCiClient {
    client: reqwest::Client,
    pipeline_url: String,
    dashboard_url: String,
    token: String,
}

impl CircleCiClient {
    /// Build a client; fails before any request when the token is missing.
    pub fn from_settings(settings: &CiSettings) -> crate::error::Result<Self> {
        let token = settings.token.resolve()?;
        Ok(Self {
            client: http::client(true)?,
            pipeline_url: settings.pipeline_url.clone(),
            dashboard_url: settings.dashboard_url.clone(),
            token,
        })
    }

    pub async fn trigger(&self, request: &PipelineRequest) -> Result<Pipeline> {
        tracing::info!(branch = %request.branch, "Triggering {} pipeline", SERVICE);
        let resp = self
            .client
            .post(&self.pipeline_url)
            .basic_auth(&self.token, Some(""))
            .json(request)
            .send()
            .await?;
        Ok(http::ensure_success(SERVICE, resp).await?.json().await?)
    }

    /// Human-readable pointer to a triggered pipeline.
    pub fn describe(&self, pipeline: &Pipeline) -> String {
        format!(
            "Pipeline {} is viewable at {}.",
            pipeline.number, self.dashboard_url
        )
    }
}
