pub mod local;
pub mod remote;

use crate::keystore::{KeySource, KeyStore};
use crate::models::repository::{RepoKind, Repository};
use crate::models::usage::Usage;
use local::{SysVolumes, VolumeStats};
use remote::{RemoteShell, SshShell};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything that can go wrong inside a probe. None of it crosses
/// the `probe()` boundary; callers only ever see `Option<Usage>`.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("unsupported repository kind")]
    UnsupportedKind,
    #[error("missing connection field {0}")]
    MissingField(&'static str),
    #[error("ssh key {0:?} not found")]
    KeyNotFound(String),
    #[error("ssh key decryption failed")]
    KeyDecrypt,
    #[error("volume statistics unavailable: {0}")]
    Stat(#[source] anyhow::Error),
    #[error("remote channel failed: {0}")]
    Shell(#[source] anyhow::Error),
    #[error("remote command timed out after {0:?}")]
    Timeout(Duration),
    #[error("remote command exited with status {0}")]
    ExitStatus(i32),
    #[error("unparseable df output: {0}")]
    Parse(String),
}

/// Measures the storage behind a repository, wherever it lives.
///
/// Collaborators are injected: volume statistics for local paths, a
/// remote shell for SSH paths, and a key source for the latter's
/// credentials. A prober holds no mutable state and may be shared
/// across tasks.
pub struct Prober<V, S, K> {
    volumes:        V,
    shell:          S,
    keys:           K,
    remote_timeout: Duration,
}

impl Prober<SysVolumes, SshShell, KeyStore> {
    pub fn new(keys: KeyStore, remote_timeout: Duration) -> Self {
        Self { volumes: SysVolumes, shell: SshShell, keys, remote_timeout }
    }
}

impl<V: VolumeStats, S: RemoteShell, K: KeySource> Prober<V, S, K> {
    /// Best-effort usage for one repository. Any failure — unknown
    /// kind, missing path, unreachable host, absent credential,
    /// timeout, garbled output — comes back as `None`; the repository
    /// is skipped for this cycle.
    pub async fn probe(&self, repo: &Repository) -> Option<Usage> {
        match self.try_probe(repo).await {
            Ok(usage) => Some(usage),
            Err(err) => {
                debug!(repo = %repo.name, error = %err, "usage probe came up empty");
                None
            }
        }
    }

    async fn try_probe(&self, repo: &Repository) -> Result<Usage, ProbeError> {
        match repo.kind {
            RepoKind::Local => local::local_usage(&self.volumes, repo),
            RepoKind::Ssh => {
                remote::remote_usage(&self.shell, &self.keys, repo, self.remote_timeout).await
            }
            RepoKind::Unknown => Err(ProbeError::UnsupportedKind),
        }
    }
}
