//! API key registry.
//!
//! A JSON file maps key ids to key material and permissions. The registry is
//! an injected service with an explicit load/save lifecycle rather than a
//! process-wide singleton, so tokens can be reissued and reloaded without
//! restarting the coordinator.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use parking_lot::RwLock;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::StoreError;

/// One registered API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyData {
    pub key: String,
    pub name: String,
    pub permissions: Vec<String>,
    pub created: String,
}

impl ApiKeyData {
    /// Whether this key may manage other keys.
    pub fn is_admin(&self) -> bool {
        self.permissions
            .iter()
            .any(|p| p == "admin" || p == "all")
    }
}

/// Masked key info safe to return from list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct KeySummary {
    pub name: String,
    pub permissions: Vec<String>,
    pub created: String,
    pub key_preview: String,
}

#[derive(Debug)]
pub struct ApiKeyStore {
    path: PathBuf,
    keys: RwLock<HashMap<String, ApiKeyData>>,
}

impl ApiKeyStore {
    /// Load the registry from disk.
    ///
    /// A missing file is bootstrapped with a freshly minted admin key, which
    /// is persisted immediately so the operator can read it back.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let (keys, bootstrapped) = match std::fs::read_to_string(&path) {
            Ok(text) => (serde_json::from_str(&text)?, false),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut keys = HashMap::new();
                keys.insert(
                    "default".to_string(),
                    ApiKeyData {
                        key: generate_token(32),
                        name: "Default Admin".to_string(),
                        permissions: vec!["all".to_string()],
                        created: chrono::Local::now().to_rfc3339(),
                    },
                );
                info!(path = %path.display(), "key registry missing, minted default admin key");
                (keys, true)
            }
            Err(e) => return Err(e.into()),
        };
        let store = ApiKeyStore {
            path,
            keys: RwLock::new(keys),
        };
        if bootstrapped {
            store.save()?;
        }
        Ok(store)
    }

    /// Persist the registry to its file.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let keys = self.keys.read();
        let text = serde_json::to_string_pretty(&*keys)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    /// Re-read the registry from disk, replacing the in-memory table.
    pub fn reload(&self) -> Result<(), StoreError> {
        let text = std::fs::read_to_string(&self.path)?;
        let fresh: HashMap<String, ApiKeyData> = serde_json::from_str(&text)?;
        *self.keys.write() = fresh;
        Ok(())
    }

    /// Fetch a key by its registry id.
    pub fn get(&self, key_id: &str) -> Option<ApiKeyData> {
        self.keys.read().get(key_id).cloned()
    }

    /// Look up a presented token. Returns the key data when valid.
    pub fn verify(&self, token: &str) -> Option<ApiKeyData> {
        self.keys
            .read()
            .values()
            .find(|data| data.key == token)
            .cloned()
    }

    /// Mint and persist a new key. Returns `(key_id, data)`.
    pub fn mint(&self, name: &str, permissions: Vec<String>) -> Result<(String, ApiKeyData), StoreError> {
        let key_id = generate_token(8);
        let data = ApiKeyData {
            key: generate_token(32),
            name: name.to_string(),
            permissions,
            created: chrono::Local::now().to_rfc3339(),
        };
        self.keys.write().insert(key_id.clone(), data.clone());
        self.save()?;
        Ok((key_id, data))
    }

    /// Masked listing for admin endpoints.
    pub fn list(&self) -> HashMap<String, KeySummary> {
        self.keys
            .read()
            .iter()
            .map(|(id, data)| {
                let preview = format!("{}...", &data.key[..data.key.len().min(8)]);
                (
                    id.clone(),
                    KeySummary {
                        name: data.name.clone(),
                        permissions: data.permissions.clone(),
                        created: data.created.clone(),
                        key_preview: preview,
                    },
                )
            })
            .collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// URL-safe random token of `bytes` random bytes.
fn generate_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}
