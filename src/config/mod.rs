// ABOUTME: Configuration types and parsing for harbormaster.yml.
// ABOUTME: Handles YAML parsing, env var secrets, and target site lookup.

mod deserialize;
mod env_value;
mod init;
mod server;
mod services;
mod site;
mod workflow;

pub use env_value::EnvValue;
pub use init::init_config;
pub use server::ServerConfig;
pub use services::{CiSettings, CloudSettings, PreviewSettings, TrackingSettings};
pub use site::{SiteConfig, TargetEnvironment};
pub use workflow::{BackupSettings, DrushConfig, HostRewrite, PollingConfig, PurgeSettings};

use crate::error::{Error, Result};
use crate::types::TargetName;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "harbormaster.yml";
pub const CONFIG_FILENAME_ALT: &str = "harbormaster.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".harbormaster/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application (database) name on the hosting platform.
    pub application: String,

    pub sites: HashMap<TargetName, SiteConfig>,

    /// Runtime version every environment must run before new code lands.
    #[serde(default = "default_runtime_version")]
    pub runtime_version: String,

    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,

    #[serde(default)]
    pub drush: DrushConfig,

    #[serde(default)]
    pub cloud: CloudSettings,

    #[serde(default)]
    pub ci: CiSettings,

    #[serde(default)]
    pub preview: PreviewSettings,

    #[serde(default)]
    pub tracking: TrackingSettings,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub backup: BackupSettings,

    #[serde(default)]
    pub purge: PurgeSettings,
}

fn default_runtime_version() -> String {
    "8.2".to_string()
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(30 * 60)
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("Loading configuration from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn validate(&self) -> Result<()> {
        if self.application.trim().is_empty() {
            return Err(Error::InvalidConfig("application cannot be empty".to_string()));
        }
        if self.polling.max_attempts == 0 {
            return Err(Error::InvalidConfig(
                "polling.max_attempts must be at least 1".to_string(),
            ));
        }
        for (name, site) in &self.sites {
            if site.root.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("sites.{}.root cannot be empty", name)));
            }
        }
        Ok(())
    }

    /// Resolve the site alias for a target.
    pub fn site(&self, target: TargetName) -> Result<TargetEnvironment> {
        self.sites
            .get(&target)
            .map(|site| TargetEnvironment::new(target, site))
            .ok_or(Error::UnknownSite(target))
    }

    pub fn template() -> Self {
        let mut sites = HashMap::new();
        for (name, user, host) in [
            (TargetName::Test, "massgov.test", "massgovstg.ssh.prod.acquia-sites.com"),
            (TargetName::Prod, "massgov.prod", "massgov.ssh.prod.acquia-sites.com"),
        ] {
            sites.insert(
                name,
                SiteConfig {
                    uuid: crate::types::EnvironmentId::new("00000000-0000-0000-0000-000000000000"),
                    server: ServerConfig {
                        host: host.to_string(),
                        port: 22,
                        user: Some(user.to_string()),
                        key_path: None,
                        trust_first_connection: false,
                    },
                    root: format!("/var/www/html/{}/docroot", user),
                },
            );
        }

        Config {
            application: "massgov".to_string(),
            sites,
            runtime_version: default_runtime_version(),
            command_timeout: default_command_timeout(),
            drush: DrushConfig::default(),
            cloud: CloudSettings::default(),
            ci: CiSettings::default(),
            preview: PreviewSettings::default(),
            tracking: TrackingSettings::default(),
            polling: PollingConfig::default(),
            backup: BackupSettings::default(),
            purge: PurgeSettings::default(),
        }
    }
}
