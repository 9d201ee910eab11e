//! Label projection
//!
//! Maps a canonical submission's labeled fields onto positions in an
//! entity's destination record. The destination schema is authoritative:
//! labels the schema does not know are dropped, and the value column is
//! cleared before writing so stale values never linger. Projection is
//! idempotent for a fixed submission and schema.

use crate::error::StoreError;
use crate::store::DestinationStore;
use crate::types::{EntityName, FieldValue, WriteSet};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Projects submission fields onto a destination value column
#[derive(Debug, Clone, Copy)]
pub struct LabelProjector {
    clear_rows: u32,
}

impl LabelProjector {
    /// Create a projector that clears `clear_rows` positions per entity
    #[inline]
    #[must_use]
    pub fn new(clear_rows: u32) -> Self {
        Self { clear_rows }
    }

    /// Build the label → position lookup from a freshly read label column
    ///
    /// The first occurrence of each non-empty trimmed label wins; blank
    /// labels are skipped.
    #[must_use]
    pub fn label_positions(schema: &[(u32, String)]) -> HashMap<String, u32> {
        let mut positions = HashMap::new();
        for (position, label) in schema {
            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            positions.entry(label.to_owned()).or_insert(*position);
        }
        positions
    }

    /// Stage the writes for one submission against one schema
    ///
    /// Labels absent from the schema are dropped; missing values are
    /// staged as empty strings, never as a literal null token.
    #[must_use]
    pub fn stage(
        &self,
        fields: &IndexMap<String, FieldValue>,
        positions: &HashMap<String, u32>,
    ) -> WriteSet {
        let mut writes = WriteSet::new();
        let mut unknown = 0usize;
        for (label, value) in fields {
            match positions.get(label.trim()) {
                Some(position) => writes.stage(*position, value.as_cell()),
                None => unknown += 1,
            }
        }
        if unknown > 0 {
            tracing::debug!(unknown, "submission labels absent from destination schema");
        }
        writes
    }

    /// Project one submission onto one entity's value column
    ///
    /// Reads the schema fresh, clears the full addressable range, then
    /// applies all staged writes in a single batched call. Any store
    /// failure leaves the entity not-updated for this run; the caller
    /// continues with the remaining entities.
    pub fn project(
        &self,
        entity: &EntityName,
        fields: &IndexMap<String, FieldValue>,
        destination: &mut dyn DestinationStore,
    ) -> Result<(), StoreError> {
        let schema = destination.read_label_column(entity)?;
        let positions = Self::label_positions(&schema);
        let writes = self.stage(fields, &positions);

        // Clear first: values from a previous run whose label is absent
        // from the current submission must not survive.
        destination.clear_value_range(entity, self.clear_rows)?;

        if writes.is_empty() {
            tracing::debug!(entity = %entity, "no schema labels matched; column cleared only");
            return Ok(());
        }

        destination.write_values(entity, writes.writes())?;
        tracing::debug!(entity = %entity, cells = writes.len(), "projected submission");
        Ok(())
    }
}
