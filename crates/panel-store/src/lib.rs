//! Flat-file stores owned by the panel.
//!
//! Three independent stores live here: per-account limit/quota files, the
//! per-protocol flat ledgers consumed by tooling that cannot query the
//! catalog, and the JSON API-key registry. All are best-effort file stores:
//! missing directories are created on demand and removals tolerate files
//! that are already gone.

mod error;
mod keys;
mod ledger;
mod limits;

pub mod cli;

pub use error::StoreError;
pub use keys::{ApiKeyData, ApiKeyStore, KeySummary};
pub use ledger::FlatLedger;
pub use limits::LimitStore;
