//! Per-account IP-limit and quota files.
//!
//! One file per (protocol, username) holds the concurrent-IP ceiling as an
//! ASCII integer; another holds the byte quota. An external enforcer reads
//! these files; the panel only writes and removes them.

use panel_config::PathsConfig;
use panel_core::{Account, Protocol};

use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct LimitStore {
    paths: PathsConfig,
}

impl LimitStore {
    pub fn new(paths: PathsConfig) -> Self {
        LimitStore { paths }
    }

    /// Write the limit files for an account.
    ///
    /// A zero value means unlimited and writes no file, matching what the
    /// enforcer expects (absence = no ceiling).
    pub async fn write(&self, account: &Account) -> Result<(), StoreError> {
        if account.ip_limit > 0 {
            let path = self
                .paths
                .ip_limit_file(account.protocol, &account.username);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, account.ip_limit.to_string()).await?;
        }
        if account.quota_gb > 0 && !account.protocol.is_ssh() {
            let path = self.paths.quota_file(account.protocol, &account.username);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, account.quota_bytes().to_string()).await?;
        }
        Ok(())
    }

    /// Remove both limit files; files already absent are not an error.
    pub async fn remove(&self, protocol: Protocol, username: &str) -> Result<(), StoreError> {
        remove_if_present(&self.paths.ip_limit_file(protocol, username)).await?;
        if !protocol.is_ssh() {
            remove_if_present(&self.paths.quota_file(protocol, username)).await?;
        }
        Ok(())
    }
}

async fn remove_if_present(path: &std::path::Path) -> Result<(), StoreError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
