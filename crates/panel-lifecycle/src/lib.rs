//! Account lifecycle coordination.
//!
//! The coordinator is the only entry point other layers should call for
//! create and delete. It walks the stores in a fixed order, holding a
//! per-username lock, and compensates completed steps in reverse order when
//! a later step fails. Compensation is best-effort, not a transaction:
//! failures during compensation are logged for manual reconciliation and
//! the original error is returned.

mod cards;
mod coordinator;
mod error;
mod identity;
mod info;
mod links;
mod locks;
mod reload;
mod saga;

#[cfg(test)]
mod tests;

pub use cards::CardWriter;
pub use coordinator::{CreatedAccount, LifecycleCoordinator};
pub use error::LifecycleError;
pub use identity::{IdentityService, MemoryIdentity, SystemIdentity};
pub use info::ServerInfo;
pub use links::{build_links, AccountLinks};
pub use locks::NameLocks;
pub use reload::{reload_from_config, NoopReload, ReloadTrigger, SystemctlReload};
pub use saga::Saga;
