//! Reconciliation run orchestrator
//!
//! One linear pass per invocation:
//! FETCH → FILTER → RESOLVE+PROJECT (per entity) → TRACK → EMIT.
//!
//! Per-row and per-entity defects are skipped with diagnostics; only a
//! failed fetch or missing configuration aborts the run. No state is
//! retained between steps beyond the report being assembled.

use crate::config::RunConfig;
use crate::error::ReconError;
use crate::period::PeriodFilter;
use crate::project::LabelProjector;
use crate::store::{DestinationStore, StateStore, SubmissionSource};
use crate::tracker::ChangeTracker;
use crate::types::{EntityName, RunReport, TrackingMode};
use chrono::{DateTime, Utc};
use indexmap::IndexSet;

/// Orchestrates one reconciliation pass over all eligible submissions
#[derive(Debug)]
pub struct ReconciliationRun<'a> {
    config: &'a RunConfig,
    filter: PeriodFilter,
    projector: LabelProjector,
}

impl<'a> ReconciliationRun<'a> {
    /// Create a run over the given configuration
    #[inline]
    #[must_use]
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            filter: PeriodFilter::new(),
            projector: LabelProjector::new(config.clear_rows),
        }
    }

    /// Execute one reconciliation pass with `reference = now`
    ///
    /// # Errors
    /// Fatal only when the submission fetch fails; everything else is
    /// skip-and-continue.
    pub fn execute(
        &self,
        source: &dyn SubmissionSource,
        destination: &mut dyn DestinationStore,
        state: &mut dyn StateStore,
    ) -> Result<RunReport, ReconError> {
        self.execute_at(source, destination, state, Utc::now())
    }

    /// Execute one reconciliation pass against an explicit reference
    /// instant (injectable for tests and replays)
    pub fn execute_at(
        &self,
        source: &dyn SubmissionSource,
        destination: &mut dyn DestinationStore,
        state: &mut dyn StateStore,
        reference: DateTime<Utc>,
    ) -> Result<RunReport, ReconError> {
        // FETCH: the one fatal external call; without data there is
        // nothing to reconcile.
        let submissions = source.fetch_all().map_err(ReconError::Fetch)?;
        tracing::info!(rows = submissions.len(), "fetched submission snapshot");

        // FILTER
        let outcome = self.filter.select(&submissions, reference);
        tracing::info!(
            canonical = outcome.canonical.len(),
            skipped_invalid = outcome.skipped_invalid,
            "selected canonical submissions for period"
        );

        let mut report = RunReport {
            skipped_invalid: outcome.skipped_invalid,
            ..RunReport::default()
        };

        if outcome.canonical.is_empty() {
            // A zero-eligible run is a successful no-op: empty arrays
            // are still emitted and state is not advanced.
            tracing::info!("no submissions for current period");
            return Ok(report);
        }

        // RESOLVE + PROJECT, in period-filter output order.
        let mut updated: IndexSet<EntityName> = IndexSet::new();
        let mut current_keys: IndexSet<String> = IndexSet::new();
        let mut failed: IndexSet<EntityName> = IndexSet::new();

        for submission in &outcome.canonical {
            let identity = submission.normalized_identity();
            let Some(entity) = self.config.mapping.resolve(&submission.identity) else {
                tracing::warn!(identity = %identity, "skipping: identity not mapped");
                report.skipped_unmapped += 1;
                continue;
            };

            match self
                .projector
                .project(entity, &submission.fields, destination)
            {
                Ok(()) => {
                    tracing::info!(
                        entity = %entity,
                        identity = %identity,
                        timestamp = ?submission.timestamp,
                        "updated entity from submission"
                    );
                    updated.insert(entity.clone());
                    let key = match self.config.tracking {
                        TrackingMode::ByIdentity => identity.as_str().to_owned(),
                        TrackingMode::ByEntity => entity.as_str().to_owned(),
                    };
                    current_keys.insert(key);
                }
                Err(e) => {
                    tracing::warn!(entity = %entity, error = %e, "projection failed; entity not updated");
                    failed.insert(entity.clone());
                }
            }
        }

        // TRACK: delta against prior state, then persist the union.
        let mut tracker = ChangeTracker::new(state);
        let prior = tracker.load();
        let delta_keys = ChangeTracker::delta(&current_keys, &prior);
        tracker.save(&current_keys, &prior);

        report.delta_entities = self.delta_entities(&delta_keys);
        report.updated = updated.into_iter().collect();
        report.delta_keys = delta_keys;
        report.failed_entities = failed.into_iter().collect();

        tracing::info!(
            updated = report.updated.len(),
            delta = report.delta_keys.len(),
            failed = report.failed_entities.len(),
            "reconciliation complete"
        );
        Ok(report)
    }

    /// Entity names corresponding to the delta keys, deduplicated in
    /// delta order
    fn delta_entities(&self, delta_keys: &[String]) -> Vec<EntityName> {
        match self.config.tracking {
            TrackingMode::ByEntity => delta_keys
                .iter()
                .map(|k| EntityName::new(k.clone()))
                .collect(),
            TrackingMode::ByIdentity => {
                let mut entities: IndexSet<EntityName> = IndexSet::new();
                for key in delta_keys {
                    if let Some(entity) = self.config.mapping.resolve(key) {
                        entities.insert(entity.clone());
                    }
                }
                entities.into_iter().collect()
            }
        }
    }
}
