//! Cross-run change tracking
//!
//! Persists the set of keys already processed by previous runs and
//! computes the delta for the current one. The key domain is selected by
//! [`TrackingMode`](crate::types::TrackingMode): submitter identities or
//! destination entity names share this exact engine.
//!
//! State accumulates monotonically: `save` persists the union of prior
//! and current keys, and nothing is ever removed except by an external
//! reset. That makes an accidental double-run idempotent: at worst it
//! re-emits notifications, it never corrupts state.

use crate::store::StateStore;
use indexmap::IndexSet;
use std::collections::BTreeSet;

/// Tracks which keys have been processed across runs
pub struct ChangeTracker<'a> {
    store: &'a mut dyn StateStore,
}

impl<'a> ChangeTracker<'a> {
    /// Create a tracker over the given state store
    #[inline]
    pub fn new(store: &'a mut dyn StateStore) -> Self {
        Self { store }
    }

    /// Load the prior key set
    ///
    /// Never fails: a missing or corrupt blob yields an empty set with a
    /// logged warning, so a lost state file degrades to re-notifying,
    /// not to aborting the run.
    #[must_use]
    pub fn load(&self) -> BTreeSet<String> {
        match self.store.load() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "run state unreadable; treating prior state as empty");
                BTreeSet::new()
            }
        }
    }

    /// Keys present in `current` but absent from `prior`, preserving
    /// the order of `current`
    #[must_use]
    pub fn delta(current: &IndexSet<String>, prior: &BTreeSet<String>) -> Vec<String> {
        current
            .iter()
            .filter(|k| !prior.contains(*k))
            .cloned()
            .collect()
    }

    /// Persist `prior ∪ current`
    ///
    /// Called only after a run that had eligible submissions, so state
    /// is never falsely advanced by an empty run. A save failure is
    /// logged and swallowed: destination writes are already applied and
    /// must not be rolled back (the two side effects are deliberately
    /// non-transactional; monotonic accumulation keeps re-runs safe).
    pub fn save(&mut self, current: &IndexSet<String>, prior: &BTreeSet<String>) {
        let union: BTreeSet<String> = prior
            .iter()
            .cloned()
            .chain(current.iter().cloned())
            .collect();
        if let Err(e) = self.store.save(&union) {
            tracing::error!(error = %e, "failed to persist run state; next run may re-notify");
        }
    }
}
