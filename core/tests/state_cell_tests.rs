// tests/state_cell_tests.rs
mod common; // Reference the common module

use accrete::{Route, StateCell, StateSnapshot, Update};
use common::*;

#[test]
fn test_cell_applies_updates_in_sequence() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let cell = StateCell::new(StateSnapshot::init(&fixture.schema));

  cell
    .apply(&Update::new().set(&fixture.page_contents, strings(&["page one"])))
    .unwrap();
  cell
    .apply(&Update::new().set(&fixture.page_contents, strings(&["page two"])))
    .unwrap();

  let current = cell.current();
  assert_eq!(
    current.get(&fixture.page_contents),
    Some(&strings(&["page one", "page two"]))
  );
}

#[test]
fn test_cell_retains_every_intermediate_snapshot() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let cell = StateCell::new(StateSnapshot::init(&fixture.schema));

  cell
    .apply(&Update::new().set(&fixture.condense_count, 1u32))
    .unwrap();
  cell
    .apply(&Update::new().set(&fixture.condense_count, 2u32))
    .unwrap();

  assert_eq!(cell.history_len(), 3); // initial + two merges

  // Replay: each recorded snapshot is the state after that many merges.
  let counts: Vec<u32> = (0..cell.history_len())
    .map(|i| *cell.snapshot_at(i).unwrap().get(&fixture.condense_count).unwrap())
    .collect();
  assert_eq!(counts, vec![0, 1, 2]);
  assert!(cell.snapshot_at(99).is_none());
}

#[test]
fn test_cell_clones_observe_the_same_run() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let producer = StateCell::new(StateSnapshot::init(&fixture.schema));
  let orchestrator = producer.clone();

  producer
    .apply(&Update::new().set(&fixture.next, Route::Step(Step::SchedulePost)))
    .unwrap();

  // The orchestrator reads the routing field the producer just wrote.
  let next = orchestrator.read_current(|state| *state.get(&fixture.next).unwrap());
  assert_eq!(next, Route::Step(Step::SchedulePost));
}

#[test]
fn test_cell_propagates_merge_errors_without_recording() {
  setup_tracing();
  let fixture = post_state().unwrap();
  let cell = StateCell::new(StateSnapshot::init(&fixture.schema));

  let before = cell.history_len();
  assert!(cell.apply(&Update::new().set_named("no_such_field", 1u32)).is_err());
  assert_eq!(cell.history_len(), before); // failed merge leaves no snapshot
}
