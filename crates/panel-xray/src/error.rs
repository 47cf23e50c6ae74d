//! Patch error types.

use panel_core::Protocol;

/// Failure while patching the daemon configuration.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// The sentinel for a protocol/transport zone is missing. Fatal: the
    /// daemon configuration has drifted out of the expected shape and no
    /// automated edit is safe.
    #[error("anchor '{sentinel}' not found in daemon config")]
    AnchorNotFound { sentinel: &'static str },

    /// No block matches the requested marker. Non-fatal on delete paths:
    /// the entry is already absent.
    #[error("no config block for user '{username}' expiring {expire_date}")]
    BlockNotFound {
        username: String,
        expire_date: String,
    },

    /// The protocol has no daemon config zone (ssh).
    #[error("{0} accounts have no daemon config zone")]
    NoZone(Protocol),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
