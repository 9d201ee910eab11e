//! TabSync Store - File-backed collaborator implementations
//!
//! Concrete stores for local and CI use:
//! - [`JsonSnapshotSource`]: submission snapshot read from a JSON array
//! - [`JsonWorkbook`]: per-entity label/value tabs in one JSON document
//! - [`JsonStateFile`]: the persisted processed-key set

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod snapshot;
pub mod state_file;
pub mod workbook;

pub use snapshot::JsonSnapshotSource;
pub use state_file::JsonStateFile;
pub use workbook::JsonWorkbook;
