//! Per-username serialization.
//!
//! Two concurrent creates for the same username could both pass the
//! uniqueness probe before either writes. All lifecycle operations for a
//! username therefore run under that username's lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct NameLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl NameLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a username, creating it on first use.
    pub async fn acquire(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock();
            map.entry(name.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}
