// ABOUTME: Picks SSH credentials for a session.
// ABOUTME: An explicit key wins, then the SSH agent, then the usual key files in ~/.ssh.

use russh::client::Handle;
use russh::keys::agent::client::AgentClient;
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key, ssh_key};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::UnixStream;

use super::error::{Error, Result};
use super::host_key::HostKeyVerifier;

const DEFAULT_KEYS: [&str; 3] = ["id_ed25519", "id_rsa", "id_ecdsa"];

pub(crate) enum Credentials {
    Agent(AgentClient<UnixStream>),
    Key(Arc<ssh_key::PrivateKey>),
}

/// Candidate key files under `home`, most preferred first.
pub(crate) fn default_key_paths(home: &Path) -> Vec<PathBuf> {
    DEFAULT_KEYS
        .iter()
        .map(|name| home.join(".ssh").join(name))
        .collect()
}

fn load_key(path: &Path) -> Result<Credentials> {
    let key = load_secret_key(path, None).map_err(|e| Error::KeyLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(Credentials::Key(Arc::new(key)))
}

impl Credentials {
    pub(crate) async fn discover(key_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = key_path {
            return load_key(path);
        }

        if let Ok(agent) = AgentClient::connect_env().await {
            tracing::debug!("Using SSH agent");
            return Ok(Credentials::Agent(agent));
        }

        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| Error::NoCredentials("no agent and HOME is not set".to_string()))?;
        default_key_paths(&home)
            .iter()
            .find_map(|path| load_key(path).ok())
            .ok_or_else(|| Error::NoCredentials("no agent and no key in ~/.ssh".to_string()))
    }

    /// Offer the credentials; `Ok(false)` when the server refused all of them.
    pub(crate) async fn offer(
        self,
        handle: &mut Handle<HostKeyVerifier>,
        user: &str,
    ) -> Result<bool> {
        match self {
            Credentials::Agent(mut agent) => {
                let identities = agent
                    .request_identities()
                    .await
                    .map_err(|e| Error::NoCredentials(format!("agent: {}", e)))?;
                for identity in identities {
                    let accepted = handle
                        .authenticate_publickey_with(user, identity, None, &mut agent)
                        .await
                        .is_ok_and(|result| result.success());
                    if accepted {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Credentials::Key(key) => {
                let hash = handle.best_supported_rsa_hash().await?.flatten();
                let result = handle
                    .authenticate_publickey(user, PrivateKeyWithHashAlg::new(key, hash))
                    .await?;
                Ok(result.success())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keys_prefer_ed25519() {
        let paths = default_key_paths(Path::new("/home/deploy"));
        assert_eq!(paths[0], PathBuf::from("/home/deploy/.ssh/id_ed25519"));
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn missing_key_file_is_reported_with_path() {
        match load_key(Path::new("/nonexistent/key")) {
            Err(Error::KeyLoad { path, .. }) => assert_eq!(path, PathBuf::from("/nonexistent/key")),
            _ => panic!("expected a key load error"),
        }
    }
}
