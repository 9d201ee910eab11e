//! JSON workbook destination store
//!
//! One JSON document holding every entity tab:
//!
//! ```json
//! {
//!   "Branch A": {
//!     "labels": ["Name", "Phone"],
//!     "values": { "1": "Ana", "2": "555" }
//!   }
//! }
//! ```
//!
//! Labels are positional (index 0 is position 1); values are a sparse
//! map keyed by 1-based position. The document is re-read per call so
//! schema edits between runs are always honored, and persisted back to
//! disk after each mutation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tabsync_core::{CellWrite, DestinationStore, EntityName, StoreError};

/// One entity tab
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TabDoc {
    /// Label column, position 1 first
    #[serde(default)]
    labels: Vec<String>,
    /// Sparse value column keyed by 1-based position
    #[serde(default)]
    values: BTreeMap<String, String>,
}

type WorkbookDoc = IndexMap<String, TabDoc>;

/// Destination store backed by a single JSON workbook file
#[derive(Debug, Clone)]
pub struct JsonWorkbook {
    path: PathBuf,
}

impl JsonWorkbook {
    /// Open a workbook at `path` (the file must already exist; the
    /// store never creates entities)
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_doc(&self) -> Result<WorkbookDoc, StoreError> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_doc(&self, doc: &WorkbookDoc) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(doc)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn with_tab<F>(&self, entity: &EntityName, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut TabDoc),
    {
        let mut doc = self.read_doc()?;
        let tab = doc
            .get_mut(entity.as_str())
            .ok_or_else(|| StoreError::EntityNotFound(entity.as_str().to_owned()))?;
        mutate(tab);
        self.write_doc(&doc)
    }
}

impl DestinationStore for JsonWorkbook {
    fn read_label_column(&self, entity: &EntityName) -> Result<Vec<(u32, String)>, StoreError> {
        let doc = self.read_doc()?;
        let tab = doc
            .get(entity.as_str())
            .ok_or_else(|| StoreError::EntityNotFound(entity.as_str().to_owned()))?;
        Ok(tab
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| (i as u32 + 1, label.clone()))
            .collect())
    }

    fn clear_value_range(&mut self, entity: &EntityName, rows: u32) -> Result<(), StoreError> {
        self.with_tab(entity, |tab| {
            tab.values
                .retain(|position, _| position.parse::<u32>().map_or(false, |p| p > rows));
        })
    }

    fn write_values(
        &mut self,
        entity: &EntityName,
        writes: &[CellWrite],
    ) -> Result<(), StoreError> {
        self.with_tab(entity, |tab| {
            for write in writes {
                tab.values
                    .insert(write.position.to_string(), write.value.clone());
            }
        })
    }
}
