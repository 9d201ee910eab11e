//! Run-state persistence file
//!
//! One small JSON blob with a single array field:
//!
//! ```json
//! { "processed": ["ana@x.com", "bob@x.com"] }
//! ```
//!
//! A missing file loads as the empty set (first run); a corrupt file is
//! reported as a parse error and the tracker degrades it to empty with
//! a warning. Saves write the full sorted set, replacing the blob.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tabsync_core::{StateError, StateStore};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDoc {
    #[serde(default)]
    processed: Vec<String>,
}

/// State store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonStateFile {
    path: PathBuf,
}

impl JsonStateFile {
    /// Create a state store at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for JsonStateFile {
    fn load(&self) -> Result<BTreeSet<String>, StateError> {
        if !self.path.exists() {
            return Ok(BTreeSet::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let doc: StateDoc = serde_json::from_str(&raw)?;
        Ok(doc.processed.into_iter().collect())
    }

    fn save(&mut self, keys: &BTreeSet<String>) -> Result<(), StateError> {
        let doc = StateDoc {
            processed: keys.iter().cloned().collect(),
        };
        let raw = serde_json::to_string_pretty(&doc)?;
        std::fs::write(&self.path, raw)?;
        tracing::debug!(path = %self.path.display(), keys = keys.len(), "persisted run state");
        Ok(())
    }
}
