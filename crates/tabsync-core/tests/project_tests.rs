//! Label-projector tests (run against the public API so the in-memory
//! fakes from `tabsync-test-utils` share the same crate instance)

use indexmap::IndexMap;
use tabsync_core::{CellWrite, EntityName, FieldValue, LabelProjector, StoreError};
use tabsync_test_utils::InMemoryDestination;

fn fields(pairs: &[(&str, FieldValue)]) -> IndexMap<String, FieldValue> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

#[test]
fn label_positions_first_occurrence_wins() {
    let schema = vec![
        (1, "Name".to_owned()),
        (2, "  ".to_owned()),
        (3, "Name".to_owned()),
        (4, " Phone ".to_owned()),
    ];
    let positions = LabelProjector::label_positions(&schema);
    assert_eq!(positions.get("Name"), Some(&1));
    assert_eq!(positions.get("Phone"), Some(&4));
    assert_eq!(positions.len(), 2);
}

#[test]
fn stage_drops_unknown_labels() {
    let projector = LabelProjector::new(200);
    let positions = LabelProjector::label_positions(&[(1, "Telefone".to_owned())]);
    let writes = projector.stage(&fields(&[("Phone", FieldValue::Text("1".into()))]), &positions);
    assert!(writes.is_empty());
}

#[test]
fn stage_trims_submission_labels() {
    let projector = LabelProjector::new(200);
    let positions = LabelProjector::label_positions(&[(2, "Phone".to_owned())]);
    let writes = projector.stage(
        &fields(&[(" Phone ", FieldValue::Text("555".into()))]),
        &positions,
    );
    assert_eq!(writes.writes(), &[CellWrite::new(2, "555")]);
}

#[test]
fn stage_renders_missing_values_as_empty() {
    let projector = LabelProjector::new(200);
    let positions = LabelProjector::label_positions(&[(5, "Notes".to_owned())]);
    let writes = projector.stage(&fields(&[("Notes", FieldValue::Empty)]), &positions);
    assert_eq!(writes.writes()[0].value, "");
}

#[test]
fn project_clears_before_writing() {
    let entity = EntityName::new("Branch A");
    let mut dest = InMemoryDestination::new();
    dest.add_entity("Branch A", &["Name", "Phone"]);
    dest.set_value("Branch A", 2, "stale");

    let projector = LabelProjector::new(10);
    projector
        .project(
            &entity,
            &fields(&[("Name", FieldValue::Text("Ana".into()))]),
            &mut dest,
        )
        .unwrap();

    // Position 2 ("Phone") had a stale value and the new submission
    // lacks that label; clearing must have removed it.
    assert_eq!(dest.value("Branch A", 1), Some("Ana".to_owned()));
    assert_eq!(dest.value("Branch A", 2), None);
}

#[test]
fn project_is_idempotent() {
    let entity = EntityName::new("Branch A");
    let mut dest = InMemoryDestination::new();
    dest.add_entity("Branch A", &["Name", "Phone"]);

    let projector = LabelProjector::new(10);
    let input = fields(&[
        ("Name", FieldValue::Text("Ana".into())),
        ("Phone", FieldValue::Number(555.0)),
    ]);

    projector.project(&entity, &input, &mut dest).unwrap();
    let first = dest.snapshot("Branch A");
    projector.project(&entity, &input, &mut dest).unwrap();
    assert_eq!(dest.snapshot("Branch A"), first);
}

#[test]
fn project_batches_one_write_call() {
    let entity = EntityName::new("Branch A");
    let mut dest = InMemoryDestination::new();
    dest.add_entity("Branch A", &["A", "B", "C"]);

    let projector = LabelProjector::new(10);
    projector
        .project(
            &entity,
            &fields(&[
                ("A", FieldValue::Text("1".into())),
                ("C", FieldValue::Text("3".into())),
            ]),
            &mut dest,
        )
        .unwrap();
    assert_eq!(dest.write_calls(), 1);
}

#[test]
fn project_missing_entity_is_store_error() {
    let mut dest = InMemoryDestination::new();
    let projector = LabelProjector::new(10);
    let result = projector.project(
        &EntityName::new("Nowhere"),
        &fields(&[("Name", FieldValue::Text("x".into()))]),
        &mut dest,
    );
    assert!(matches!(result, Err(StoreError::EntityNotFound(_))));
}
