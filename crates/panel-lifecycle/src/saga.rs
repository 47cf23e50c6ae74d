//! Generic compensation runner.
//!
//! Create and delete are ordered side effects across stores that offer no
//! cross-store transactions. Each forward action that completes registers a
//! compensating action here; on a later failure the saga unwinds them in
//! reverse order. A compensation that itself fails is logged as needing
//! manual reconciliation and swallowed, so the caller always gets the
//! original error as its terminal answer.

use std::future::Future;
use std::pin::Pin;

use tracing::{error, warn};

use crate::error::LifecycleError;

type UndoFuture = Pin<Box<dyn Future<Output = Result<(), LifecycleError>> + Send>>;

#[derive(Default)]
pub struct Saga {
    completed: Vec<(&'static str, UndoFuture)>,
}

impl Saga {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the compensation for a forward action that just completed.
    pub fn push<F>(&mut self, step: &'static str, undo: F)
    where
        F: Future<Output = Result<(), LifecycleError>> + Send + 'static,
    {
        self.completed.push((step, Box::pin(undo)));
    }

    /// Number of completed forward actions.
    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// All forward actions succeeded; drop the registered compensations.
    pub fn commit(mut self) {
        self.completed.clear();
    }

    /// Run compensations in reverse registration order.
    ///
    /// Returns how many compensations failed (each already logged at error
    /// with enough context for manual reconciliation).
    pub async fn unwind(self, cause: &LifecycleError) -> usize {
        warn!(
            %cause,
            steps = self.completed.len(),
            "operation failed, compensating completed steps"
        );
        let mut failures = 0;
        for (step, undo) in self.completed.into_iter().rev() {
            match undo.await {
                Ok(()) => warn!(step, "compensated"),
                Err(e) => {
                    failures += 1;
                    error!(step, error = %e, "compensation failed, manual reconciliation needed");
                }
            }
        }
        failures
    }
}

impl std::fmt::Debug for Saga {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Saga")
            .field("completed", &self.completed.len())
            .finish()
    }
}
