//! File-backed store for the daemon configuration.

use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::debug;

use panel_core::{Protocol, Transport};

use crate::document::XrayDoc;
use crate::error::PatchError;

/// Owns the daemon configuration file and serializes all mutations.
///
/// The config is a single shared file with concurrent create/delete callers,
/// so every read-modify-write cycle holds the store's lock; there is exactly
/// one writer per configuration file.
#[derive(Debug)]
pub struct XrayStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl XrayStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        XrayStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Insert one account block into the zone for `(protocol, transport)`.
    pub async fn insert(
        &self,
        protocol: Protocol,
        transport: Transport,
        username: &str,
        expire_date: &str,
        secret: &str,
    ) -> Result<(), PatchError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        doc.insert_block(protocol, transport, username, expire_date, secret)?;
        self.save(&doc).await?;
        debug!(%protocol, %transport, username, "config block inserted");
        Ok(())
    }

    /// Delete one account block; `BlockNotFound` when already absent.
    pub async fn delete(
        &self,
        protocol: Protocol,
        transport: Transport,
        username: &str,
        expire_date: &str,
    ) -> Result<(), PatchError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        doc.delete_block(protocol, transport, username, expire_date)?;
        self.save(&doc).await?;
        debug!(%protocol, %transport, username, "config block removed");
        Ok(())
    }

    /// Uniqueness probe across the whole configuration text.
    pub async fn contains_user(&self, username: &str) -> Result<bool, PatchError> {
        let _guard = self.lock.lock().await;
        let doc = self.load().await?;
        Ok(doc.contains_user(username))
    }

    async fn load(&self) -> Result<XrayDoc, PatchError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        Ok(XrayDoc::parse(&text))
    }

    async fn save(&self, doc: &XrayDoc) -> Result<(), PatchError> {
        tokio::fs::write(&self.path, doc.to_text()).await?;
        Ok(())
    }
}
