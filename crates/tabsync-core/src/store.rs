//! Collaborator interfaces consumed by the engine
//!
//! The engine never talks to a concrete backend; it is handed these
//! traits by the caller. All calls are blocking and sequential: the run
//! is a linear pipeline with no concurrency inside it.

use crate::error::{StateError, StoreError};
use crate::types::{CellWrite, EntityName, Submission};
use std::collections::BTreeSet;

/// Source of raw form submissions
///
/// One full snapshot per call; no pagination contract is assumed.
pub trait SubmissionSource {
    /// Fetch every submission currently known to the source
    fn fetch_all(&self) -> Result<Vec<Submission>, StoreError>;
}

/// Per-entity destination store (label column + value column)
///
/// The schema is read fresh per entity per run; the engine never caches
/// it across runs and never creates or deletes entities.
pub trait DestinationStore {
    /// Read the entity's label column as ordered `(position, label)`
    /// pairs; positions are 1-based
    fn read_label_column(&self, entity: &EntityName) -> Result<Vec<(u32, String)>, StoreError>;

    /// Clear the entity's value column across `1..=rows`
    fn clear_value_range(&mut self, entity: &EntityName, rows: u32) -> Result<(), StoreError>;

    /// Apply all staged writes in one batched call
    fn write_values(&mut self, entity: &EntityName, writes: &[CellWrite])
        -> Result<(), StoreError>;
}

/// Persistence for the cross-run processed-key set
pub trait StateStore {
    /// Load the persisted key set
    fn load(&self) -> Result<BTreeSet<String>, StateError>;

    /// Persist the key set, replacing any previous blob
    fn save(&mut self, keys: &BTreeSet<String>) -> Result<(), StateError>;
}
