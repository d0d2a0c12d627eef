// ABOUTME: SSH session to a target environment using russh.
// ABOUTME: One session per deploy; every command runs on its own channel with a time limit.

use russh::client::{self, Handle};
use russh::{ChannelMsg, Disconnect};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::auth::Credentials;
use super::error::{Error, Result};
use super::host_key::{HostKeyPolicy, HostKeyVerifier};

/// Where and how to connect.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Private key to use instead of the agent and the default key files.
    pub key_path: Option<PathBuf>,
    pub host_key_policy: HostKeyPolicy,
    /// known_hosts file; `None` means ~/.ssh/known_hosts.
    pub known_hosts: Option<PathBuf>,
    /// Limit for a single remote command. Database imports take minutes.
    pub command_timeout: Duration,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            key_path: None,
            host_key_policy: HostKeyPolicy::Strict,
            known_hosts: None,
            command_timeout: Duration::from_secs(30 * 60),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_path = Some(path.into());
        self
    }

    pub fn trust_on_first_use(mut self, trust: bool) -> Self {
        self.host_key_policy = if trust {
            HostKeyPolicy::TrustFirstUse
        } else {
            HostKeyPolicy::Strict
        };
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    fn verifier(&self) -> HostKeyVerifier {
        HostKeyVerifier {
            host: self.host.clone(),
            port: self.port,
            policy: self.host_key_policy,
            known_hosts: self.known_hosts.clone(),
        }
    }
}

/// Exit status and captured streams of a remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: u32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Accumulates channel messages until the command has both exited and sent EOF.
#[derive(Debug, Default)]
struct OutputCollector {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_code: Option<u32>,
    eof: bool,
}

impl OutputCollector {
    fn stdout(&mut self, data: &[u8]) {
        self.stdout.extend_from_slice(data);
    }

    fn stderr(&mut self, data: &[u8]) {
        self.stderr.extend_from_slice(data);
    }

    fn exit(&mut self, code: u32) {
        self.exit_code = Some(code);
    }

    fn eof(&mut self) {
        self.eof = true;
    }

    fn done(&self) -> bool {
        self.eof && self.exit_code.is_some()
    }

    fn finish(self) -> Result<CommandOutput> {
        let exit_code = self.exit_code.ok_or(Error::NoExitStatus)?;
        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
        })
    }
}

/// An authenticated SSH connection.
pub struct Session {
    config: SessionConfig,
    handle: Handle<HostKeyVerifier>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.config.host)
            .field("user", &self.config.user)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        tracing::debug!("Connecting to {}@{}:{}", config.user, config.host, config.port);
        let credentials = Credentials::discover(config.key_path.as_deref()).await?;

        // Long silent commands must not trip an inactivity timeout; keepalives catch dead links.
        let russh_config = client::Config {
            inactivity_timeout: None,
            keepalive_interval: Some(Duration::from_secs(15)),
            keepalive_max: 4,
            ..Default::default()
        };

        let mut handle = client::connect(
            Arc::new(russh_config),
            (config.host.as_str(), config.port),
            config.verifier(),
        )
        .await
        .map_err(|e| Error::Connect {
            host: config.host.clone(),
            port: config.port,
            reason: e.to_string(),
        })?;

        if !credentials.offer(&mut handle, &config.user).await? {
            return Err(Error::Rejected {
                user: config.user.clone(),
                host: config.host.clone(),
            });
        }

        Ok(Self { config, handle })
    }

    /// Run a command line, bounded by the configured command timeout.
    pub async fn exec(&self, command: &str) -> Result<CommandOutput> {
        let limit = self.config.command_timeout;
        tokio::time::timeout(limit, self.exec_unbounded(command))
            .await
            .map_err(|_| Error::Timeout(limit))?
    }

    async fn exec_unbounded(&self, command: &str) -> Result<CommandOutput> {
        tracing::debug!(host = %self.config.host, "exec: {}", command);

        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::Channel(format!("open: {}", e)))?;
        channel
            .exec(true, command)
            .await
            .map_err(|e| Error::Channel(format!("exec: {}", e)))?;

        let mut collector = OutputCollector::default();
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { data } => collector.stdout(&data),
                ChannelMsg::ExtendedData { data, ext: 1 } => collector.stderr(&data),
                ChannelMsg::ExitStatus { exit_status } => collector.exit(exit_status),
                ChannelMsg::Eof => collector.eof(),
                ChannelMsg::Close => break,
                _ => {}
            }
            if collector.done() {
                break;
            }
        }
        collector.finish()
    }

    pub async fn disconnect(self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_waits_for_exit_and_eof() {
        let mut collector = OutputCollector::default();
        collector.stdout(b"12\n");
        collector.eof();
        assert!(!collector.done());
        collector.exit(0);
        assert!(collector.done());

        let output = collector.finish().unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "12\n");
    }

    #[test]
    fn collector_without_exit_status_is_an_error() {
        let mut collector = OutputCollector::default();
        collector.stderr(b"Connection reset");
        assert!(matches!(collector.finish(), Err(Error::NoExitStatus)));
    }

    #[test]
    fn config_defaults_to_strict_host_keys() {
        let config = SessionConfig::new("test.example.com", "massgov.test");
        assert_eq!(config.host_key_policy, HostKeyPolicy::Strict);
        assert_eq!(config.port, 22);
        let config = config.trust_on_first_use(true).port(2222);
        assert_eq!(config.host_key_policy, HostKeyPolicy::TrustFirstUse);
        assert_eq!(config.port, 2222);
    }
}
