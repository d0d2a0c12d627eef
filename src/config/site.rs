// ABOUTME: Per-target site aliases and the resolved target environment.
// ABOUTME: Maps each target name to its cloud environment ID, SSH server, and docroot.

use serde::Deserialize;

use super::ServerConfig;
use super::deserialize::deserialize_server;
use crate::types::{EnvironmentId, TargetName};

/// A site alias as written in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Cloud API environment UUID.
    pub uuid: EnvironmentId,
    /// SSH endpoint of the environment.
    #[serde(deserialize_with = "deserialize_server")]
    pub server: ServerConfig,
    /// CMS docroot on the remote host.
    pub root: String,
}

/// A deployment destination, resolved once per run.
#[derive(Debug, Clone)]
pub struct TargetEnvironment {
    pub name: TargetName,
    pub id: EnvironmentId,
    pub root: String,
    pub server: ServerConfig,
}

impl TargetEnvironment {
    pub fn new(name: TargetName, site: &SiteConfig) -> Self {
        Self {
            name,
            id: site.uuid.clone(),
            root: site.root.clone(),
            server: site.server.clone(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.name.is_production()
    }
}
