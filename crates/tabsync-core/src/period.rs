//! Period filtering
//!
//! Reduces the raw submission snapshot to the single canonical (latest)
//! submission per identity within the reporting period containing the
//! reference instant. Pure and total: invalid rows are excluded with a
//! diagnostic, never raised as errors.

use crate::types::Submission;
use chrono::{DateTime, Datelike, Utc};
use indexmap::IndexMap;

/// Outcome of one filtering pass
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Canonical submissions, one per identity, in group-first-seen order
    pub canonical: Vec<Submission>,
    /// Rows dropped for a missing/unparseable timestamp or blank identity
    pub skipped_invalid: usize,
}

/// Selects the canonical submission per identity for one period
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodFilter;

impl PeriodFilter {
    /// Create a new filter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Select the latest submission per identity within the calendar
    /// month of `reference`
    ///
    /// Rows lacking a valid timestamp or identity are dropped and
    /// counted. Within an identity group, submissions are ordered by
    /// timestamp ascending with a stable sort, so identical timestamps
    /// resolve to source order and the last one wins. Empty input or an
    /// empty period match yields an empty result.
    #[must_use]
    pub fn select(&self, submissions: &[Submission], reference: DateTime<Utc>) -> FilterOutcome {
        let mut skipped_invalid = 0usize;
        let mut groups: IndexMap<String, Vec<&Submission>> = IndexMap::new();

        for sub in submissions {
            let Some(ts) = sub.timestamp else {
                skipped_invalid += 1;
                continue;
            };
            let identity = sub.normalized_identity();
            if identity.is_empty() {
                skipped_invalid += 1;
                continue;
            }
            if ts.year() != reference.year() || ts.month() != reference.month() {
                continue;
            }
            groups.entry(identity.as_str().to_owned()).or_default().push(sub);
        }

        if skipped_invalid > 0 {
            tracing::debug!(skipped_invalid, "dropped rows without timestamp or identity");
        }

        let canonical = groups
            .into_values()
            .filter_map(|mut group| {
                // Stable sort: ties keep source order, so the last entry
                // is the latest-by-timestamp, last-by-source submission.
                group.sort_by_key(|s| s.timestamp);
                group.pop().cloned()
            })
            .collect();

        FilterOutcome {
            canonical,
            skipped_invalid,
        }
    }
}
