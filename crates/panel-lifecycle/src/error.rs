//! Lifecycle error taxonomy.

use panel_catalog::CatalogError;
use panel_core::ValidationError;
use panel_store::StoreError;
use panel_xray::PatchError;

/// Failure surfaced by the lifecycle coordinator.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Bad input; no store was touched.
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    /// The username is already held by some store; no store was touched.
    #[error("account already exists: {0}")]
    Duplicate(String),

    /// Delete target is absent from the catalog.
    #[error("account not found: {0}")]
    NotFound(String),

    /// The OS identity tool failed.
    #[error("identity service: {0}")]
    Identity(String),

    /// The daemon reload command failed.
    #[error("daemon reload: {0}")]
    Reload(String),

    /// No free trial username within the bounded attempt count.
    #[error("trial username space exhausted after {0} attempts")]
    TrialExhausted(u32),

    /// Daemon config patching failed; `AnchorNotFound` inside means the
    /// daemon configuration has drifted and is fatal.
    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
