// ABOUTME: Server configuration for SSH connections to a target environment.
// ABOUTME: Parses formats like "host", "user@host", "host:port", "user@host:port".

use crate::ssh::SessionConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    #[serde(default = "default_trust_first_connection")]
    pub trust_first_connection: bool,
}

fn default_port() -> u16 {
    22
}

fn default_trust_first_connection() -> bool {
    false
}

impl ServerConfig {
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("server address cannot be empty".to_string());
        }

        // Parse format: [user@]host[:port]
        let (user_part, rest) = match s.rsplit_once('@') {
            Some((user, rest)) => (Some(user), rest),
            None => (None, s),
        };

        let (host, port) = if let Some((host, port_str)) = rest.rsplit_once(':') {
            let port = port_str
                .parse::<u16>()
                .map_err(|_| format!("invalid port: {}", port_str))?;
            (host, port)
        } else {
            (rest, 22)
        };

        if host.is_empty() {
            return Err("hostname cannot be empty".to_string());
        }

        if user_part.is_some_and(str::is_empty) {
            return Err("username cannot be empty".to_string());
        }

        Ok(ServerConfig {
            host: host.to_string(),
            port,
            user: user_part.map(|s| s.to_string()),
            key_path: None,
            trust_first_connection: default_trust_first_connection(),
        })
    }

    /// Build the SSH session configuration for this server.
    pub fn ssh_session_config(&self, command_timeout: Duration) -> SessionConfig {
        let user = self
            .user
            .clone()
            .unwrap_or_else(|| std::env::var("USER").unwrap_or_else(|_| "root".to_string()));

        let config = SessionConfig::new(&self.host, user)
            .port(self.port)
            .trust_on_first_use(self.trust_first_connection)
            .command_timeout(command_timeout);

        match &self.key_path {
            Some(path) => config.key_path(path),
            None => config,
        }
    }
}
