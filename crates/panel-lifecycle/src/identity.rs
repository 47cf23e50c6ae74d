//! OS identity store backends.

use std::collections::HashSet;
use std::process::Stdio;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::LifecycleError;

/// Creates and removes OS-level principals for ssh accounts.
///
/// Principals are created with an expiry date, a disabled shell and no home
/// directory; removal of an already-absent principal is a no-op.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn exists(&self, username: &str) -> Result<bool, LifecycleError>;

    async fn create(
        &self,
        username: &str,
        password: &str,
        expire_date: &str,
    ) -> Result<(), LifecycleError>;

    async fn remove(&self, username: &str) -> Result<(), LifecycleError>;
}

/// Shells out to the system user tools.
#[derive(Debug, Default)]
pub struct SystemIdentity;

#[async_trait]
impl IdentityService for SystemIdentity {
    async fn exists(&self, username: &str) -> Result<bool, LifecycleError> {
        let status = Command::new("id")
            .arg(username)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| LifecycleError::Identity(format!("id: {}", e)))?;
        Ok(status.success())
    }

    async fn create(
        &self,
        username: &str,
        password: &str,
        expire_date: &str,
    ) -> Result<(), LifecycleError> {
        let status = Command::new("useradd")
            .args(["-e", expire_date, "-s", "/bin/false", "-M", username])
            .status()
            .await
            .map_err(|e| LifecycleError::Identity(format!("useradd: {}", e)))?;
        if !status.success() {
            return Err(LifecycleError::Identity(format!(
                "useradd exited with {}",
                status
            )));
        }

        let mut child = Command::new("chpasswd")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LifecycleError::Identity(format!("chpasswd: {}", e)))?;
        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(format!("{}:{}\n", username, password).as_bytes())
                .await
                .map_err(|e| LifecycleError::Identity(format!("chpasswd stdin: {}", e)))?;
        }
        let status = child
            .wait()
            .await
            .map_err(|e| LifecycleError::Identity(format!("chpasswd: {}", e)))?;
        if !status.success() {
            return Err(LifecycleError::Identity(format!(
                "chpasswd exited with {}",
                status
            )));
        }
        debug!(username, expire_date, "system identity created");
        Ok(())
    }

    async fn remove(&self, username: &str) -> Result<(), LifecycleError> {
        if !self.exists(username).await? {
            return Ok(());
        }
        let status = Command::new("userdel")
            .arg(username)
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| LifecycleError::Identity(format!("userdel: {}", e)))?;
        if !status.success() {
            return Err(LifecycleError::Identity(format!(
                "userdel exited with {}",
                status
            )));
        }
        Ok(())
    }
}

/// In-memory identity backend for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    users: RwLock<HashSet<String>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MemoryIdentity {
            users: RwLock::new(users.into_iter().map(Into::into).collect()),
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.read().contains(username)
    }
}

#[async_trait]
impl IdentityService for MemoryIdentity {
    async fn exists(&self, username: &str) -> Result<bool, LifecycleError> {
        Ok(self.users.read().contains(username))
    }

    async fn create(
        &self,
        username: &str,
        _password: &str,
        _expire_date: &str,
    ) -> Result<(), LifecycleError> {
        if !self.users.write().insert(username.to_string()) {
            return Err(LifecycleError::Identity(format!(
                "user '{}' already exists",
                username
            )));
        }
        Ok(())
    }

    async fn remove(&self, username: &str) -> Result<(), LifecycleError> {
        self.users.write().remove(username);
        Ok(())
    }
}
