//! Core types for TabSync
//!
//! Defines the fundamental types for the reconciliation engine:
//! - Submissions and their field values
//! - Normalized identities and entity names
//! - Staged destination writes
//! - Run reports and tracking modes

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Normalized submitter key (trimmed, lower-cased)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    /// Normalize a raw identity string
    #[inline]
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// Whether the identity is blank after normalization
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The normalized key
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named destination record (e.g. a branch tab); compared verbatim
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityName(String);

impl EntityName {
    /// Create a new entity name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The entity name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Raw value of one labeled submission field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Textual value
    Text(String),
    /// Numeric value
    Number(f64),
    /// Missing value; rendered as an empty cell, never a "null" token
    Empty,
}

impl FieldValue {
    /// Render the value as it is written to a destination cell
    #[must_use]
    pub fn as_cell(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => {
                // Integral numbers render without a trailing ".0"
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            FieldValue::Empty => String::new(),
        }
    }
}

/// One ingested form submission
///
/// Read fresh from the source every run, never mutated or persisted by
/// the core. Duplicate labels collapse through map semantics (last value
/// for a label wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Submission instant; `None` when the source value was missing or
    /// unparseable (such rows are excluded by the period filter)
    pub timestamp: Option<DateTime<Utc>>,
    /// Raw submitter identity as delivered by the source
    pub identity: String,
    /// Labeled values, in source order
    pub fields: IndexMap<String, FieldValue>,
}

impl Submission {
    /// Create a new submission
    #[inline]
    #[must_use]
    pub fn new(timestamp: Option<DateTime<Utc>>, identity: impl Into<String>) -> Self {
        Self {
            timestamp,
            identity: identity.into(),
            fields: IndexMap::new(),
        }
    }

    /// Add a labeled field value
    #[inline]
    #[must_use]
    pub fn with_field(mut self, label: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(label.into(), value);
        self
    }

    /// The normalized identity for this submission
    #[inline]
    #[must_use]
    pub fn normalized_identity(&self) -> Identity {
        Identity::normalize(&self.identity)
    }
}

/// One staged cell write: 1-based position plus rendered value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellWrite {
    /// 1-based position in the destination value column
    pub position: u32,
    /// Rendered cell value
    pub value: String,
}

impl CellWrite {
    /// Create a new cell write
    #[inline]
    #[must_use]
    pub fn new(position: u32, value: impl Into<String>) -> Self {
        Self {
            position,
            value: value.into(),
        }
    }
}

/// Staged cell writes for one entity, applied as a single batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSet {
    writes: Vec<CellWrite>,
}

impl WriteSet {
    /// Create an empty write set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage one write
    #[inline]
    pub fn stage(&mut self, position: u32, value: impl Into<String>) {
        self.writes.push(CellWrite::new(position, value));
    }

    /// Whether nothing was staged
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Number of staged writes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// The staged writes, in staging order
    #[inline]
    #[must_use]
    pub fn writes(&self) -> &[CellWrite] {
        &self.writes
    }
}

/// Granularity of cross-run change tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingMode {
    /// Track by normalized submitter identity
    ByIdentity,
    /// Track by resolved destination entity name
    ByEntity,
}

impl Default for TrackingMode {
    fn default() -> Self {
        TrackingMode::ByIdentity
    }
}

/// Result of one reconciliation run
///
/// The three vectors are the automation outputs: they serialize as JSON
/// arrays even when empty, and preserve deterministic first-seen order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Entities whose destination records were written this run,
    /// deduplicated, first-occurrence order
    pub updated: Vec<EntityName>,
    /// Keys (identities or entity names, per tracking mode) newly seen
    /// this run relative to persisted state
    pub delta_keys: Vec<String>,
    /// Entity names corresponding to the delta keys; equals `delta_keys`
    /// under entity tracking
    pub delta_entities: Vec<EntityName>,
    /// Rows dropped for a missing/unparseable timestamp or blank identity
    pub skipped_invalid: usize,
    /// Canonical submissions skipped because their identity was unmapped
    pub skipped_unmapped: usize,
    /// Entities whose projection failed at the destination this run
    pub failed_entities: Vec<EntityName>,
}

impl RunReport {
    /// Whether the run had nothing eligible to process
    #[inline]
    #[must_use]
    pub fn is_empty_run(&self) -> bool {
        self.updated.is_empty() && self.failed_entities.is_empty() && self.skipped_unmapped == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_normalizes_trim_and_case() {
        let id = Identity::normalize("  User@X.Com ");
        assert_eq!(id.as_str(), "user@x.com");
    }

    #[test]
    fn identity_blank_after_trim_is_empty() {
        assert!(Identity::normalize("   ").is_empty());
        assert!(!Identity::normalize("a").is_empty());
    }

    #[test]
    fn field_value_rendering() {
        assert_eq!(FieldValue::Text("abc".into()).as_cell(), "abc");
        assert_eq!(FieldValue::Number(42.0).as_cell(), "42");
        assert_eq!(FieldValue::Number(1.5).as_cell(), "1.5");
        assert_eq!(FieldValue::Empty.as_cell(), "");
    }

    #[test]
    fn submission_duplicate_label_last_wins() {
        let sub = Submission::new(None, "a@b.c")
            .with_field("Phone", FieldValue::Text("1".into()))
            .with_field("Phone", FieldValue::Text("2".into()));
        assert_eq!(sub.fields.len(), 1);
        assert_eq!(sub.fields["Phone"], FieldValue::Text("2".into()));
    }

    #[test]
    fn write_set_staging_order() {
        let mut ws = WriteSet::new();
        assert!(ws.is_empty());
        ws.stage(7, "a");
        ws.stage(3, "b");
        ws.stage(5, "c");
        assert_eq!(ws.len(), 3);
        let positions: Vec<u32> = ws.writes().iter().map(|w| w.position).collect();
        assert_eq!(positions, vec![7, 3, 5]);
    }

    #[test]
    fn run_report_serializes_empty_arrays() {
        let report = RunReport::default();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["updated"], serde_json::json!([]));
        assert_eq!(json["delta_keys"], serde_json::json!([]));
        assert_eq!(json["delta_entities"], serde_json::json!([]));
    }
}
