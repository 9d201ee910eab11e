//! Change-tracker tests (run against the public API so the in-memory
//! fakes from `tabsync-test-utils` share the same crate instance)

use indexmap::IndexSet;
use std::collections::BTreeSet;
use tabsync_core::ChangeTracker;
use tabsync_test_utils::InMemoryState;

fn index_set(keys: &[&str]) -> IndexSet<String> {
    keys.iter().map(|k| (*k).to_owned()).collect()
}

#[test]
fn load_from_empty_store_is_empty() {
    let mut store = InMemoryState::new();
    let tracker = ChangeTracker::new(&mut store);
    assert!(tracker.load().is_empty());
}

#[test]
fn load_swallows_store_failure() {
    let mut store = InMemoryState::new().failing_load();
    let tracker = ChangeTracker::new(&mut store);
    assert!(tracker.load().is_empty());
}

#[test]
fn delta_is_set_difference_in_current_order() {
    let prior: BTreeSet<String> = ["a", "b"].iter().map(|s| (*s).to_owned()).collect();
    let current = index_set(&["c", "a", "d"]);
    assert_eq!(ChangeTracker::delta(&current, &prior), vec!["c", "d"]);
}

#[test]
fn delta_empty_when_current_subset_of_prior() {
    let prior: BTreeSet<String> = ["a", "b"].iter().map(|s| (*s).to_owned()).collect();
    let current = index_set(&["a"]);
    assert!(ChangeTracker::delta(&current, &prior).is_empty());
}

#[test]
fn save_then_load_round_trips_union() {
    let mut store = InMemoryState::new();
    let prior: BTreeSet<String> = ["old@x.com"].iter().map(|s| (*s).to_owned()).collect();
    {
        let mut tracker = ChangeTracker::new(&mut store);
        tracker.save(&index_set(&["new@x.com"]), &prior);
    }
    let tracker = ChangeTracker::new(&mut store);
    let loaded = tracker.load();
    assert!(loaded.contains("old@x.com"));
    assert!(loaded.contains("new@x.com"));
    assert_eq!(loaded.len(), 2);
}

#[test]
fn save_failure_does_not_panic() {
    let mut store = InMemoryState::new().failing_save();
    let mut tracker = ChangeTracker::new(&mut store);
    tracker.save(&index_set(&["a"]), &BTreeSet::new());
}
