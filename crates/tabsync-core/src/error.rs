//! Error types for TabSync Core
//!
//! Provides the run-level error taxonomy:
//! - Configuration defects (fatal, pre-write)
//! - Source fetch failures (fatal)
//! - Destination store failures (recoverable per entity)
//! - State persistence failures (recoverable)

/// Main reconciliation error type
///
/// Only the fatal cases surface here; per-entity and per-row defects are
/// handled inside the run with diagnostics and never abort it.
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    /// Submission fetch failed; nothing to reconcile
    #[error("submission fetch failed: {0}")]
    Fetch(#[source] StoreError),

    /// Required configuration missing or invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration defects, raised before any side effect occurs
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Identity mapping absent or empty
    #[error("identity mapping is missing or empty")]
    EmptyMapping,

    /// Identity mapping could not be parsed
    #[error("invalid identity mapping: {0}")]
    InvalidMapping(String),

    /// Config file could not be read or parsed
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failures from an external tabular store (source or destination)
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O failure talking to the store
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Store payload could not be parsed
    #[error("store parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Addressed entity does not exist in the destination
    #[error("entity not found in destination: {0}")]
    EntityNotFound(String),

    /// Backend-specific failure
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Failures from run-state persistence
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// I/O failure reading or writing the state blob
    #[error("state i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// State blob could not be parsed
    #[error("state parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
