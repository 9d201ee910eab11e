//! Run configuration
//!
//! An explicit configuration struct built once at process start and
//! passed by reference into the run. No component reads ambient global
//! state (environment variables, process-wide singletons) directly.

use crate::error::ConfigError;
use crate::types::{EntityName, Identity, TrackingMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Static identity → entity mapping, fixed for the duration of a run
///
/// Keys are normalized at construction; several identities may map to
/// the same entity. Identities absent from the mapping are inert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityMap {
    entries: HashMap<Identity, EntityName>,
}

impl IdentityMap {
    /// Create an empty mapping
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `(identity, entity)` pairs, normalizing each key
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (Identity::normalize(k.as_ref()), EntityName::new(v)))
            .collect();
        Self { entries }
    }

    /// Parse from a JSON object of `{"identity": "entity"}` pairs
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| ConfigError::InvalidMapping(e.to_string()))?;
        Ok(Self::from_pairs(raw))
    }

    /// Resolve a raw identity to its entity name
    ///
    /// Normalizes before lookup; `None` means "skip with diagnostic",
    /// never a run failure. Pure lookup, no side effects.
    #[inline]
    #[must_use]
    pub fn resolve(&self, identity: &str) -> Option<&EntityName> {
        self.entries.get(&Identity::normalize(identity))
    }

    /// Whether the mapping has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of mapped identities
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Configuration for one reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Identity → entity mapping
    pub mapping: IdentityMap,
    /// Change-tracking granularity
    pub tracking: TrackingMode,
    /// Full addressable value-column range cleared before writes
    pub clear_rows: u32,
}

impl RunConfig {
    /// Create a configuration with the given mapping
    ///
    /// # Errors
    /// Returns [`ConfigError::EmptyMapping`] when the mapping has no
    /// entries: a run without a mapping can never resolve anything and
    /// must abort before any side effect.
    pub fn new(mapping: IdentityMap) -> Result<Self, ConfigError> {
        if mapping.is_empty() {
            return Err(ConfigError::EmptyMapping);
        }
        Ok(Self {
            mapping,
            tracking: TrackingMode::default(),
            clear_rows: DEFAULT_CLEAR_ROWS,
        })
    }

    /// With tracking mode
    #[inline]
    #[must_use]
    pub fn with_tracking(mut self, tracking: TrackingMode) -> Self {
        self.tracking = tracking;
        self
    }

    /// With a custom clear range
    #[inline]
    #[must_use]
    pub fn with_clear_rows(mut self, rows: u32) -> Self {
        self.clear_rows = rows;
        self
    }
}

/// Default value-column range cleared per entity
pub const DEFAULT_CLEAR_ROWS: u32 = 200;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_map_normalizes_keys() {
        let map = IdentityMap::from_pairs([(" User@X.Com ", "Branch North")]);
        assert_eq!(
            map.resolve("user@x.com"),
            Some(&EntityName::new("Branch North"))
        );
    }

    #[test]
    fn identity_map_resolve_normalizes_input() {
        let map = IdentityMap::from_pairs([("user@x.com", "Branch North")]);
        assert_eq!(
            map.resolve("  USER@x.com "),
            Some(&EntityName::new("Branch North"))
        );
        assert_eq!(map.resolve("other@x.com"), None);
    }

    #[test]
    fn identity_map_many_to_one() {
        let map = IdentityMap::from_pairs([("a@x.com", "Shared"), ("b@x.com", "Shared")]);
        assert_eq!(map.resolve("a@x.com"), map.resolve("b@x.com"));
    }

    #[test]
    fn identity_map_from_json() {
        let map = IdentityMap::from_json(r#"{"a@x.com": "Branch A"}"#).unwrap();
        assert_eq!(map.len(), 1);
        assert!(IdentityMap::from_json("not json").is_err());
    }

    #[test]
    fn run_config_rejects_empty_mapping() {
        assert!(matches!(
            RunConfig::new(IdentityMap::new()),
            Err(ConfigError::EmptyMapping)
        ));
    }

    #[test]
    fn run_config_builder() {
        let config = RunConfig::new(IdentityMap::from_pairs([("a@x.com", "A")]))
            .unwrap()
            .with_tracking(TrackingMode::ByEntity)
            .with_clear_rows(50);
        assert_eq!(config.tracking, TrackingMode::ByEntity);
        assert_eq!(config.clear_rows, 50);
    }
}
