// ABOUTME: Server host key verification against known_hosts.
// ABOUTME: Strict by default; trust-on-first-use records unseen hosts.

use russh::client;
use russh::keys::known_hosts::{
    check_known_hosts, check_known_hosts_path, learn_known_hosts, learn_known_hosts_path,
};
use russh::keys::ssh_key::PublicKey;
use std::path::PathBuf;

/// What to do with a host that is not in known_hosts yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostKeyPolicy {
    #[default]
    Strict,
    TrustFirstUse,
}

/// Outcome of looking a key up in known_hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KnownHostLookup {
    Match,
    Unknown,
    Changed,
}

impl HostKeyPolicy {
    /// Whether a lookup result lets the connection proceed.
    pub(crate) fn accepts(self, lookup: KnownHostLookup) -> bool {
        match lookup {
            KnownHostLookup::Match => true,
            KnownHostLookup::Unknown => self == HostKeyPolicy::TrustFirstUse,
            KnownHostLookup::Changed => false,
        }
    }
}

/// russh handler that verifies the server key for one endpoint.
pub(crate) struct HostKeyVerifier {
    pub host: String,
    pub port: u16,
    pub policy: HostKeyPolicy,
    pub known_hosts: Option<PathBuf>,
}

impl HostKeyVerifier {
    fn lookup(&self, key: &PublicKey) -> KnownHostLookup {
        let result = match &self.known_hosts {
            Some(path) => check_known_hosts_path(&self.host, self.port, key, path),
            None => check_known_hosts(&self.host, self.port, key),
        };
        match result {
            Ok(true) => KnownHostLookup::Match,
            Err(russh::keys::Error::KeyChanged { .. }) => KnownHostLookup::Changed,
            // An unreadable or missing known_hosts file means the host is unseen.
            Ok(false) | Err(_) => KnownHostLookup::Unknown,
        }
    }

    fn remember(&self, key: &PublicKey) {
        let result = match &self.known_hosts {
            Some(path) => learn_known_hosts_path(&self.host, self.port, key, path),
            None => learn_known_hosts(&self.host, self.port, key),
        };
        if let Err(e) = result {
            tracing::warn!("Could not record host key for {}: {}", self.host, e);
        }
    }
}

impl client::Handler for HostKeyVerifier {
    type Error = russh::Error;

    async fn check_server_key(&mut self, key: &PublicKey) -> Result<bool, Self::Error> {
        let lookup = self.lookup(key);
        let accepted = self.policy.accepts(lookup);
        match (lookup, accepted) {
            (KnownHostLookup::Unknown, true) => {
                tracing::warn!("Trusting new host key for {}:{}", self.host, self.port);
                self.remember(key);
            }
            (KnownHostLookup::Changed, _) => {
                tracing::error!("Host key for {}:{} has changed", self.host, self.port);
            }
            _ => {}
        }
        Ok(accepted)
    }
}
