// ABOUTME: Settings for the deploy workflow steps.
// ABOUTME: Polling bounds, backup download/import, selective purge, and drush location.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub interval: Duration,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

// One hour at the default interval.
fn default_max_attempts() -> u32 {
    720
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackupSettings {
    /// Directory on the target host that receives the downloaded dump.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,
    /// Import script, relative to the docroot.
    #[serde(default = "default_import_script")]
    pub import_script: String,
    #[serde(default)]
    pub download_host_rewrite: Option<HostRewrite>,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            import_script: default_import_script(),
            download_host_rewrite: None,
        }
    }
}

fn default_temp_dir() -> String {
    "/mnt/tmp".to_string()
}

fn default_import_script() -> String {
    "../scripts/ma-import-backup".to_string()
}

/// Replace one hostname with another in resolved download URLs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostRewrite {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurgeSettings {
    /// SQL returning one content ID per line.
    #[serde(default = "default_content_query")]
    pub content_query: String,
    /// Paths purged directly rather than by tag. The empty path is the homepage.
    #[serde(default = "default_paths")]
    pub paths: Vec<String>,
}

impl Default for PurgeSettings {
    fn default() -> Self {
        Self {
            content_query: default_content_query(),
            paths: default_paths(),
        }
    }
}

fn default_content_query() -> String {
    "SELECT nid FROM node_field_data WHERE title LIKE '%_QAG%'".to_string()
}

fn default_paths() -> Vec<String> {
    vec![
        String::new(),
        "/orgs/office-of-the-governor".to_string(),
        "/media/1268726".to_string(),
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct DrushConfig {
    /// Drush executable, relative to the docroot.
    #[serde(default = "default_drush_path")]
    pub path: String,
}

impl Default for DrushConfig {
    fn default() -> Self {
        Self {
            path: default_drush_path(),
        }
    }
}

fn default_drush_path() -> String {
    "../vendor/bin/drush".to_string()
}
