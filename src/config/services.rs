// ABOUTME: Endpoints and credentials for the external APIs.
// ABOUTME: Covers the cloud hosting API, CI trigger, preview hosting, and deployment tracking.

use serde::Deserialize;

use super::EnvValue;

#[derive(Debug, Clone, Deserialize)]
pub struct CloudSettings {
    #[serde(default = "default_cloud_base_url")]
    pub base_url: String,
    #[serde(default = "default_cloud_token_url")]
    pub token_url: String,
    #[serde(default = "default_cloud_key")]
    pub key: EnvValue,
    #[serde(default = "default_cloud_secret")]
    pub secret: EnvValue,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            base_url: default_cloud_base_url(),
            token_url: default_cloud_token_url(),
            key: default_cloud_key(),
            secret: default_cloud_secret(),
        }
    }
}

fn default_cloud_base_url() -> String {
    "https://cloud.acquia.com/api".to_string()
}

fn default_cloud_token_url() -> String {
    "https://accounts.acquia.com/api/auth/oauth/token".to_string()
}

fn default_cloud_key() -> EnvValue {
    EnvValue::env("AC_API2_KEY")
}

fn default_cloud_secret() -> EnvValue {
    EnvValue::env("AC_API2_SECRET")
}

#[derive(Debug, Clone, Deserialize)]
pub struct CiSettings {
    #[serde(default = "default_pipeline_url")]
    pub pipeline_url: String,
    /// Where humans can follow triggered pipelines.
    #[serde(default = "default_dashboard_url")]
    pub dashboard_url: String,
    #[serde(default = "default_ci_token")]
    pub token: EnvValue,
}

impl Default for CiSettings {
    fn default() -> Self {
        Self {
            pipeline_url: default_pipeline_url(),
            dashboard_url: default_dashboard_url(),
            token: default_ci_token(),
        }
    }
}

fn default_pipeline_url() -> String {
    "https://circleci.com/api/v2/project/github/massgov/openmass/pipeline".to_string()
}

fn default_dashboard_url() -> String {
    "https://circleci.com/gh/massgov/openmass".to_string()
}

fn default_ci_token() -> EnvValue {
    EnvValue::env("CIRCLECI_PERSONAL_API_TOKEN")
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewSettings {
    #[serde(default = "default_preview_api_url")]
    pub api_url: String,
    #[serde(default = "default_preview_repository")]
    pub repository: String,
    #[serde(default = "default_preview_token")]
    pub token: EnvValue,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            api_url: default_preview_api_url(),
            repository: default_preview_repository(),
            token: default_preview_token(),
        }
    }
}

fn default_preview_api_url() -> String {
    "https://api.tugboat.qa/v3".to_string()
}

fn default_preview_repository() -> String {
    "612e50fcbaa70da92493eef8".to_string()
}

fn default_preview_token() -> EnvValue {
    EnvValue::env("TUGBOAT_ACCESS_TOKEN")
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingSettings {
    #[serde(default = "default_tracking_api_url")]
    pub api_url: String,
    #[serde(default = "default_tracking_application")]
    pub application: EnvValue,
    #[serde(default = "default_tracking_api_key")]
    pub api_key: EnvValue,
    #[serde(default = "default_tracking_user")]
    pub user: EnvValue,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            api_url: default_tracking_api_url(),
            application: default_tracking_application(),
            api_key: default_tracking_api_key(),
            user: default_tracking_user(),
        }
    }
}

fn default_tracking_api_url() -> String {
    "https://api.newrelic.com".to_string()
}

fn default_tracking_application() -> EnvValue {
    EnvValue::env("MASS_NEWRELIC_APPLICATION")
}

fn default_tracking_api_key() -> EnvValue {
    EnvValue::env("MASS_NEWRELIC_KEY")
}

fn default_tracking_user() -> EnvValue {
    EnvValue::FromEnv {
        var: "AC_API_USER".to_string(),
        default: Some(String::new()),
    }
}
