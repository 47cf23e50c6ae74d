//! Daemon reload triggers.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use panel_config::ReloadConfig;

use crate::error::LifecycleError;

/// Asks the proxy daemon to pick up a mutated configuration.
///
/// Fire-and-forget from the coordinator's perspective: a reload failure is
/// logged but never rolls back the already-committed store mutations.
#[async_trait]
pub trait ReloadTrigger: Send + Sync {
    async fn reload(&self) -> Result<(), LifecycleError>;
}

/// Restarts a systemd unit.
#[derive(Debug, Clone)]
pub struct SystemctlReload {
    service: String,
}

impl SystemctlReload {
    pub fn new(service: impl Into<String>) -> Self {
        SystemctlReload {
            service: service.into(),
        }
    }
}

#[async_trait]
impl ReloadTrigger for SystemctlReload {
    async fn reload(&self) -> Result<(), LifecycleError> {
        let status = Command::new("systemctl")
            .args(["restart", &self.service])
            .status()
            .await
            .map_err(|e| LifecycleError::Reload(format!("systemctl: {}", e)))?;
        if !status.success() {
            return Err(LifecycleError::Reload(format!(
                "systemctl restart {} exited with {}",
                self.service, status
            )));
        }
        debug!(service = %self.service, "daemon restarted");
        Ok(())
    }
}

/// Reload trigger that does nothing (tests, dry runs).
#[derive(Debug, Default)]
pub struct NoopReload;

#[async_trait]
impl ReloadTrigger for NoopReload {
    async fn reload(&self) -> Result<(), LifecycleError> {
        Ok(())
    }
}

/// Build the trigger described by the configuration.
pub fn reload_from_config(config: &ReloadConfig) -> Arc<dyn ReloadTrigger> {
    match config.mode.as_str() {
        "none" => Arc::new(NoopReload),
        _ => Arc::new(SystemctlReload::new(config.service.clone())),
    }
}
