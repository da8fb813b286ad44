// tests/merge_engine_tests.rs
mod common; // Reference the common module

use accrete::{apply, AccreteError, FieldSchema, FieldUpdate, Route, Schema, StateSnapshot, Update};
use common::*;
use std::sync::Arc;

#[test]
fn test_omitted_fields_keep_the_exact_same_value() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let s0 = StateSnapshot::init(&fixture.schema)
    .apply(&Update::new().set(&fixture.page_contents, strings(&["page one"])))
    .unwrap();

  // The update says nothing about page_contents, so the next state must hold
  // the identical shared value, not a re-built equal one.
  let s1 = s0
    .apply(&Update::new().set(&fixture.post, "draft".to_string()))
    .unwrap();

  let before = s0.raw("page_contents").unwrap();
  let after = s1.raw("page_contents").unwrap();
  assert!(Arc::ptr_eq(before, after));
  assert_eq!(s1.get(&fixture.post), Some(&"draft".to_string()));
}

#[test]
fn test_empty_update_is_a_full_identity() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let s0 = StateSnapshot::init(&fixture.schema);
  let s1 = s0.apply(&Update::new()).unwrap();
  for name in fixture.schema.field_names() {
    match (s0.raw(name), s1.raw(name)) {
      (Some(a), Some(b)) => assert!(Arc::ptr_eq(a, b), "field '{}' was rebuilt", name),
      (None, None) => {}
      _ => panic!("field '{}' changed set-ness under an empty update", name),
    }
  }
}

#[test]
fn test_overwrite_semantics_without_custom_merge() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let state = StateSnapshot::init(&fixture.schema);

  // Unset until a producer writes it; that is "not yet available", not an error.
  assert_eq!(state.get(&fixture.post), None);

  let state = state
    .apply(&Update::new().set(&fixture.post, "first draft".to_string()))
    .unwrap();
  assert_eq!(state.get(&fixture.post), Some(&"first draft".to_string()));

  // Incoming wins whenever present.
  let state = state
    .apply(&Update::new().set(&fixture.post, "second draft".to_string()))
    .unwrap();
  assert_eq!(state.get(&fixture.post), Some(&"second draft".to_string()));
}

#[test]
fn test_explicit_clear_is_distinct_from_omission() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let state = StateSnapshot::init(&fixture.schema)
    .apply(&Update::new().set(&fixture.post, "draft".to_string()))
    .unwrap();

  // Omission: no opinion, value stays.
  let untouched = state.apply(&Update::new().set(&fixture.report, "r".to_string())).unwrap();
  assert_eq!(untouched.get(&fixture.post), Some(&"draft".to_string()));

  // Explicit clear: actively reset.
  let cleared = state.apply(&Update::new().clear(&fixture.post)).unwrap();
  assert_eq!(cleared.get(&fixture.post), None);
  assert!(!cleared.is_set("post"));
}

#[test]
fn test_custom_merge_receives_the_clear_sentinel() {
  setup_tracing();
  // Append propagates a clear: the field resets to unset.
  let fixture = post_state().unwrap();
  let state = StateSnapshot::init(&fixture.schema)
    .apply(&Update::new().set(&fixture.page_contents, strings(&["stale"])))
    .unwrap()
    .apply(&Update::new().clear(&fixture.page_contents))
    .unwrap();
  assert_eq!(state.get(&fixture.page_contents), None);

  // A custom merge may instead ignore the sentinel entirely and still
  // compute a value; it alone decides the outcome.
  let mut b = Schema::builder("stubborn");
  let attempts = b
    .field(
      "attempts",
      FieldSchema::with_merge(|previous: Option<u32>, incoming: Option<u32>| {
        Some(incoming.unwrap_or(0).max(previous.unwrap_or(0)))
      }),
    )
    .unwrap();
  let schema = b.build();
  let state = StateSnapshot::init(&schema)
    .apply(&Update::new().set(&attempts, 5))
    .unwrap()
    .apply(&Update::new().clear(&attempts))
    .unwrap();
  assert_eq!(state.get(&attempts), Some(&5));
}

#[test]
fn test_apply_never_mutates_the_previous_state() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let s0 = StateSnapshot::init(&fixture.schema)
    .apply(&Update::new().set(&fixture.relevant_links, strings(&["x"])))
    .unwrap();

  let s1 = apply(
    &s0,
    &Update::new()
      .set(&fixture.relevant_links, strings(&["y"]))
      .set(&fixture.post, "p".to_string()),
  )
  .unwrap();

  // s0 is still inspectable exactly as it was.
  assert_eq!(s0.get(&fixture.relevant_links), Some(&strings(&["x"])));
  assert_eq!(s0.get(&fixture.post), None);
  assert_eq!(s1.get(&fixture.relevant_links), Some(&strings(&["x", "y"])));
}

#[test]
fn test_routing_field_is_plain_overwrite() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let state = StateSnapshot::init(&fixture.schema)
    .apply(&Update::new().set(&fixture.next, Route::Step(Step::CondensePost)))
    .unwrap();
  assert_eq!(state.get(&fixture.next), Some(&Route::Step(Step::CondensePost)));
  assert_eq!(state.get(&fixture.next).unwrap().step(), Some(&Step::CondensePost));

  let state = state.apply(&Update::new().set(&fixture.next, Route::Done)).unwrap();
  assert!(state.get(&fixture.next).unwrap().is_done());
}

#[test]
fn test_update_for_undeclared_field_propagates_as_error() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let state = StateSnapshot::init(&fixture.schema);
  let err = state
    .apply(&Update::new().set_named("no_such_field", 1u32))
    .unwrap_err();
  assert!(matches!(err, AccreteError::UnknownField { .. }));
}

#[test]
fn test_update_with_wrong_value_type_propagates_as_error() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let state = StateSnapshot::init(&fixture.schema);
  // "post" is a String field.
  let err = state.apply(&Update::new().set_named("post", 42u32)).unwrap_err();
  match err {
    AccreteError::TypeMismatch { field, .. } => assert_eq!(field, "post"),
    other => panic!("Expected TypeMismatch, got {:?}", other),
  }
}

#[test]
fn test_key_from_another_schema_is_rejected() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let (_, foreign_report) = ingest_state().unwrap();
  let state = StateSnapshot::init(&fixture.schema);
  // Same field name and type exist on both schemas; the key still does not
  // cross over.
  let err = state
    .apply(&Update::new().set(&foreign_report, "r".to_string()))
    .unwrap_err();
  assert!(matches!(err, AccreteError::ForeignKey { .. }));
}

#[test]
fn test_later_entry_for_a_field_wins_within_one_update() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let state = StateSnapshot::init(&fixture.schema)
    .apply(
      &Update::new()
        .set(&fixture.post, "first".to_string())
        .set(&fixture.post, "second".to_string()),
    )
    .unwrap();
  assert_eq!(state.get(&fixture.post), Some(&"second".to_string()));
}

#[test]
fn test_put_unset_withdraws_an_entry() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let update = Update::new()
    .set(&fixture.post, "draft".to_string())
    .put(&fixture.post, FieldUpdate::Unset);
  assert!(!update.touches("post"));
  assert!(update.is_empty());

  let state = StateSnapshot::init(&fixture.schema).apply(&update).unwrap();
  assert_eq!(state.get(&fixture.post), None);
}

#[test]
fn test_get_named_matches_typed_access() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let state = StateSnapshot::init(&fixture.schema)
    .apply(&Update::new().set(&fixture.report, "the report".to_string()))
    .unwrap();

  assert_eq!(
    state.get_named::<String>("report").unwrap(),
    Some(&"the report".to_string())
  );
  assert!(matches!(
    state.get_named::<u32>("report"),
    Err(AccreteError::TypeMismatch { .. })
  ));
  assert!(matches!(
    state.get_named::<String>("missing"),
    Err(AccreteError::UnknownField { .. })
  ));
}
