//! JSON submission snapshot source
//!
//! Reads a full snapshot of form submissions from a JSON array of row
//! objects. Two row fields are special, selected by their configured
//! labels: the timestamp column and the identity column. Every other
//! field becomes a labeled value.
//!
//! Timestamps arrive in the day-first form used by the form backend
//! (`31/05/2024 14:30:00`) or as RFC 3339; anything else parses to
//! `None` and the row is later excluded by the period filter rather
//! than failing the fetch.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::PathBuf;
use tabsync_core::{FieldValue, StoreError, Submission, SubmissionSource};

/// Day-first timestamp layouts accepted from the form backend
const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];

/// Submission source backed by a JSON snapshot file
#[derive(Debug, Clone)]
pub struct JsonSnapshotSource {
    path: PathBuf,
    timestamp_label: String,
    identity_label: String,
}

impl JsonSnapshotSource {
    /// Create a source over `path` with the given timestamp and
    /// identity column labels
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        timestamp_label: impl Into<String>,
        identity_label: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            timestamp_label: timestamp_label.into(),
            identity_label: identity_label.into(),
        }
    }

    fn row_to_submission(&self, row: &serde_json::Map<String, Value>) -> Submission {
        let timestamp = row
            .get(&self.timestamp_label)
            .and_then(Value::as_str)
            .and_then(parse_timestamp);
        let identity = row
            .get(&self.identity_label)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        let mut fields: IndexMap<String, FieldValue> = IndexMap::new();
        for (label, value) in row {
            if label == &self.timestamp_label || label == &self.identity_label {
                continue;
            }
            fields.insert(label.clone(), json_to_field(value));
        }

        let mut submission = Submission::new(timestamp, identity);
        submission.fields = fields;
        submission
    }
}

impl SubmissionSource for JsonSnapshotSource {
    fn fetch_all(&self) -> Result<Vec<Submission>, StoreError> {
        let raw = std::fs::read_to_string(&self.path)?;
        let rows: Vec<serde_json::Map<String, Value>> = serde_json::from_str(&raw)?;
        tracing::debug!(path = %self.path.display(), rows = rows.len(), "read snapshot");
        Ok(rows.iter().map(|row| self.row_to_submission(row)).collect())
    }
}

/// Parse a snapshot timestamp, day-first layouts before RFC 3339
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in DAY_FIRST_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn json_to_field(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Empty,
        Value::Number(n) => n.as_f64().map_or(FieldValue::Empty, FieldValue::Number),
        Value::String(s) if s.is_empty() => FieldValue::Empty,
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Bool(b) => FieldValue::Text(b.to_string()),
        other => FieldValue::Text(other.to_string()),
    }
}
