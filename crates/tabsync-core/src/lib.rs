//! TabSync Core - Submission reconciliation engine
//!
//! The central engine that:
//! - Selects the canonical (latest) submission per identity for the
//!   current reporting period
//! - Resolves submitter identities to destination entities
//! - Projects labeled submission fields onto per-entity records
//! - Tracks which keys changed since the last run to drive downstream
//!   export and notification
//!
//! # Example
//!
//! ```rust,ignore
//! use tabsync_core::{IdentityMap, ReconciliationRun, RunConfig};
//!
//! let mapping = IdentityMap::from_pairs([("ana@x.com", "Branch A")]);
//! let config = RunConfig::new(mapping)?;
//! let run = ReconciliationRun::new(&config);
//!
//! let report = run.execute(&source, &mut destination, &mut state)?;
//! println!("updated {} entities", report.updated.len());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod period;
pub mod project;
pub mod run;
pub mod store;
pub mod tracker;
pub mod types;

// Re-exports for convenience
pub use config::{IdentityMap, RunConfig, DEFAULT_CLEAR_ROWS};
pub use error::{ConfigError, ReconError, StateError, StoreError};
pub use period::{FilterOutcome, PeriodFilter};
pub use project::LabelProjector;
pub use run::ReconciliationRun;
pub use store::{DestinationStore, StateStore, SubmissionSource};
pub use tracker::ChangeTracker;
pub use types::{
    CellWrite, EntityName, FieldValue, Identity, RunReport, Submission, TrackingMode, WriteSet,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with TabSync Core
    pub use crate::{
        DestinationStore, EntityName, FieldValue, Identity, IdentityMap, ReconciliationRun,
        RunConfig, RunReport, StateStore, Submission, SubmissionSource, TrackingMode,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
