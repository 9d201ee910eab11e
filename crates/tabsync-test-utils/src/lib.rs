//! Testing utilities for TabSync workspace
//!
//! Shared in-memory collaborator fakes and fixture builders.

#![allow(missing_docs)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeSet;
use std::collections::HashMap;
use tabsync_core::{
    CellWrite, DestinationStore, EntityName, StateError, StateStore, StoreError, Submission,
    SubmissionSource,
};

/// Fixed submission snapshot, optionally failing on fetch
#[derive(Debug, Default)]
pub struct StaticSource {
    submissions: Vec<Submission>,
    fail: bool,
}

impl StaticSource {
    pub fn new(submissions: Vec<Submission>) -> Self {
        Self {
            submissions,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            submissions: Vec::new(),
            fail: true,
        }
    }
}

impl SubmissionSource for StaticSource {
    fn fetch_all(&self) -> Result<Vec<Submission>, StoreError> {
        if self.fail {
            return Err(StoreError::Backend("source offline".to_string()));
        }
        Ok(self.submissions.clone())
    }
}

/// One in-memory entity tab: label column plus sparse value column
#[derive(Debug, Clone, Default)]
struct Tab {
    labels: Vec<(u32, String)>,
    values: HashMap<u32, String>,
}

/// In-memory destination store with call counters
#[derive(Debug, Default)]
pub struct InMemoryDestination {
    tabs: HashMap<String, Tab>,
    write_calls: usize,
    clear_calls: usize,
}

impl InMemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity with the given label column (positions 1..=n)
    pub fn add_entity(&mut self, entity: &str, labels: &[&str]) {
        let tab = Tab {
            labels: labels
                .iter()
                .enumerate()
                .map(|(i, l)| (i as u32 + 1, (*l).to_owned()))
                .collect(),
            values: HashMap::new(),
        };
        self.tabs.insert(entity.to_owned(), tab);
    }

    /// Pre-populate one value cell (e.g. stale data from a prior run)
    pub fn set_value(&mut self, entity: &str, position: u32, value: &str) {
        if let Some(tab) = self.tabs.get_mut(entity) {
            tab.values.insert(position, value.to_owned());
        }
    }

    pub fn value(&self, entity: &str, position: u32) -> Option<String> {
        self.tabs.get(entity)?.values.get(&position).cloned()
    }

    /// Full value column for equality assertions
    pub fn snapshot(&self, entity: &str) -> Vec<(u32, String)> {
        let Some(tab) = self.tabs.get(entity) else {
            return Vec::new();
        };
        let mut cells: Vec<_> = tab.values.iter().map(|(p, v)| (*p, v.clone())).collect();
        cells.sort_by_key(|(p, _)| *p);
        cells
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls
    }

    pub fn clear_calls(&self) -> usize {
        self.clear_calls
    }

    fn tab_mut(&mut self, entity: &EntityName) -> Result<&mut Tab, StoreError> {
        self.tabs
            .get_mut(entity.as_str())
            .ok_or_else(|| StoreError::EntityNotFound(entity.as_str().to_owned()))
    }
}

impl DestinationStore for InMemoryDestination {
    fn read_label_column(&self, entity: &EntityName) -> Result<Vec<(u32, String)>, StoreError> {
        self.tabs
            .get(entity.as_str())
            .map(|tab| tab.labels.clone())
            .ok_or_else(|| StoreError::EntityNotFound(entity.as_str().to_owned()))
    }

    fn clear_value_range(&mut self, entity: &EntityName, rows: u32) -> Result<(), StoreError> {
        self.clear_calls += 1;
        let tab = self.tab_mut(entity)?;
        tab.values.retain(|position, _| *position > rows);
        Ok(())
    }

    fn write_values(
        &mut self,
        entity: &EntityName,
        writes: &[CellWrite],
    ) -> Result<(), StoreError> {
        self.write_calls += 1;
        let tab = self.tab_mut(entity)?;
        for write in writes {
            tab.values.insert(write.position, write.value.clone());
        }
        Ok(())
    }
}

/// In-memory state store with injectable failures and call counters
#[derive(Debug, Default)]
pub struct InMemoryState {
    keys: BTreeSet<String>,
    fail_load: bool,
    fail_save: bool,
    save_calls: usize,
}

impl InMemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| (*k).to_owned()).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    #[must_use]
    pub fn failing_save(mut self) -> Self {
        self.fail_save = true;
        self
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls
    }

    pub fn keys(&self) -> &BTreeSet<String> {
        &self.keys
    }
}

impl StateStore for InMemoryState {
    fn load(&self) -> Result<BTreeSet<String>, StateError> {
        if self.fail_load {
            return Err(StateError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "state unreadable",
            )));
        }
        Ok(self.keys.clone())
    }

    fn save(&mut self, keys: &BTreeSet<String>) -> Result<(), StateError> {
        self.save_calls += 1;
        if self.fail_save {
            return Err(StateError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "state unwritable",
            )));
        }
        self.keys = keys.clone();
        Ok(())
    }
}

/// Instant in May 2024
pub fn may(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}
